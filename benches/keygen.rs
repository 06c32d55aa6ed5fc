use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use rlwe_native::algorithms::{fv, newhope, tesla};
use rlwe_native::traits::XofBytes;

fn bench_fv_keygen(c: &mut Criterion) {
    let params = Arc::new(fv::KeyParameters::default_params());
    c.bench_function("fv_private_and_public_keygen", |b| {
        b.iter(|| {
            let mut rng = XofBytes::new(b"fv-keygen-bench-seed");
            let priv_key = fv::generate_private_key(&params, &mut rng);
            let _ = fv::generate_public_key(&priv_key, &mut rng);
        })
    });
}

fn bench_newhope_server_init(c: &mut Criterion) {
    let params = Arc::new(newhope::KeyParameters::default_params());
    c.bench_function("newhope_server_initialize", |b| {
        b.iter(|| {
            let mut rng = XofBytes::new(b"newhope-keygen-bench-seed");
            let _ = newhope::initialize_server(&params, &mut rng);
        })
    });
}

fn bench_tesla_signing_keygen(c: &mut Criterion) {
    let mut setup_rng = XofBytes::new(b"tesla-params-bench-seed");
    let params = Arc::new(tesla::KeyParameters::default_params(&mut setup_rng));
    c.bench_function("tesla_signing_keygen", |b| {
        b.iter(|| {
            let mut rng = XofBytes::new(b"tesla-keygen-bench-seed");
            let _ = tesla::generate_signing_key(&params, &mut rng);
        })
    });
}

criterion_group!(
    benches,
    bench_fv_keygen,
    bench_newhope_server_init,
    bench_tesla_signing_keygen
);
criterion_main!(benches);
