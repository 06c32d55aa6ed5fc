use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use rlwe_native::algorithms::fv;
use rlwe_native::bigint::BigInt;
use rlwe_native::traits::XofBytes;

fn bench_fv_encrypt_decrypt(c: &mut Criterion) {
    let params = Arc::new(fv::KeyParameters::default_params());
    let mut setup_rng = XofBytes::new(b"fv-bench-setup-seed");
    let priv_key = fv::generate_private_key(&params, &mut setup_rng);
    let pub_key = fv::generate_public_key(&priv_key, &mut setup_rng);
    let ptx = fv::encode_integer(&BigInt::from_i64(1), 2, &params).expect("valid base");

    c.bench_function("fv_encrypt", |b| {
        let mut rng = XofBytes::new(b"fv-bench-encrypt-seed");
        b.iter(|| {
            let _ = fv::encrypt(&ptx, &pub_key, &mut rng);
        })
    });

    let ctx = fv::encrypt(&ptx, &pub_key, &mut setup_rng);
    c.bench_function("fv_decrypt", |b| {
        b.iter(|| {
            let _ = fv::decrypt(&ctx, &priv_key);
        })
    });
}

fn bench_fv_multiply_and_relinearize(c: &mut Criterion) {
    let params = Arc::new(
        fv::KeyParameters::new(2048, BigInt::from_i64(1152921504606830600), BigInt::from_i64(2))
            .expect("valid FV parameters sized for one multiplication"),
    );
    let mut setup_rng = XofBytes::new(b"fv-bench-mul-setup-seed");
    let priv_key = fv::generate_private_key(&params, &mut setup_rng);
    let pub_key = fv::generate_public_key(&priv_key, &mut setup_rng);
    let evk = fv::generate_evaluation_key(&priv_key, 2, &mut setup_rng);

    let a = fv::encode_integer(&BigInt::from_i64(1), 2, &params).expect("valid base");
    let b = fv::encode_integer(&BigInt::from_i64(1), 2, &params).expect("valid base");
    let ctx_a = fv::encrypt(&a, &pub_key, &mut setup_rng);
    let ctx_b = fv::encrypt(&b, &pub_key, &mut setup_rng);

    c.bench_function("fv_multiply", |bencher| {
        bencher.iter(|| {
            let _ = ctx_a.mul(&ctx_b);
        })
    });

    let product = ctx_a.mul(&ctx_b);
    c.bench_function("fv_relinearize", |bencher| {
        bencher.iter(|| {
            let _ = product.relinearize(&evk);
        })
    });
}

criterion_group!(benches, bench_fv_encrypt_decrypt, bench_fv_multiply_and_relinearize);
criterion_main!(benches);
