use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use splitkey::keys::{SecretScalar, ShareSet};
use splitkey::reconstruct::reconstruct_public_key;
use splitkey::sss::{recover_secret, split_secret};

fn bench_split_secret(c: &mut Criterion) {
    c.bench_function("split_secret", |b| {
        let mut rng = StdRng::seed_from_u64(1);
        let secret = SecretScalar::random(&mut rng);
        let threshold = 5;
        let shares = 10;
        b.iter(|| split_secret(black_box(&secret), black_box(threshold), black_box(shares), &mut rng))
    });
}

fn bench_recover_secret(c: &mut Criterion) {
    c.bench_function("recover_secret", |b| {
        let mut rng = StdRng::seed_from_u64(2);
        let secret = SecretScalar::random(&mut rng);
        let threshold = 5;
        let shares = split_secret(&secret, threshold, 10, &mut rng).unwrap();
        b.iter(|| recover_secret(black_box(&shares), black_box(threshold)))
    });
}

fn bench_reconstruct_public_key(c: &mut Criterion) {
    c.bench_function("reconstruct_public_key", |b| {
        let mut rng = StdRng::seed_from_u64(3);
        let secret = SecretScalar::random(&mut rng);
        let threshold = 3;
        let shares = split_secret(&secret, threshold, 10, &mut rng).unwrap();
        let subset: ShareSet = shares.into_iter().take(threshold).collect();
        b.iter(|| reconstruct_public_key(black_box(&subset), black_box(threshold)))
    });
}

criterion_group!(
    benches,
    bench_split_secret,
    bench_recover_secret,
    bench_reconstruct_public_key
);
criterion_main!(benches);
