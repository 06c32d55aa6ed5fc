//! CLI demo for `rlwe_native`: exercises an FV encrypt/decrypt round trip,
//! a NewHope-Simple handshake, and a Ring-TESLA sign/verify, all against
//! the schemes' default parameters and the platform CSPRNG.

use std::sync::Arc;

use rlwe_native::algorithms::{fv, newhope, tesla};
use rlwe_native::bigint::BigInt;
use rlwe_native::traits::CsprngBytes;

fn run_fv_demo(rng: &mut CsprngBytes) {
    let params = Arc::new(fv::KeyParameters::default_params());

    let priv_key = fv::generate_private_key(&params, rng);
    let pub_key = fv::generate_public_key(&priv_key, rng);

    let value = BigInt::from_i64(1);
    let ptx = fv::encode_integer(&value, 2, &params).expect("valid base");
    let ctx = fv::encrypt(&ptx, &pub_key, rng);
    let recovered_ptx = fv::decrypt(&ctx, &priv_key);
    let recovered = fv::decode_integer(&recovered_ptx, 2).expect("valid base");

    println!("FV: encrypted {value}, decrypted back to {recovered}");
}

fn run_newhope_demo(rng: &mut CsprngBytes) {
    let params = Arc::new(newhope::KeyParameters::default_params());

    let mut server = newhope::initialize_server(&params, rng);
    let mut client = newhope::initialize_client(&params, rng);

    let clientbound = newhope::clientbound_packet(&server);
    let serverbound = newhope::process_clientbound(&mut client, &clientbound, rng);
    newhope::process_serverbound(&mut server, &serverbound);

    let agree = server.shared_key() == client.shared_key();
    println!("NewHope: server and client shared keys agree: {agree}");
}

fn run_tesla_demo(rng: &mut CsprngBytes) {
    let params = Arc::new(tesla::KeyParameters::default_params(rng));

    let signer = tesla::generate_signing_key(&params, rng);
    let verifier = tesla::generate_verification_key(&signer);

    let sig = tesla::sign(b"test", &signer, rng);
    let valid_same = tesla::verify(b"test", &sig, &verifier);
    let valid_other = tesla::verify(b"different", &sig, &verifier);

    println!("Ring-TESLA: verify(\"test\", sig) = {valid_same}, verify(\"different\", sig) = {valid_other}");
}

fn main() {
    tracing_subscriber::fmt::init();

    let mut rng = CsprngBytes::default();

    run_fv_demo(&mut rng);
    run_newhope_demo(&mut rng);
    run_tesla_demo(&mut rng);
}
