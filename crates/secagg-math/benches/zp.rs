use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use num_bigint::{BigUint, RandBigInt};
use rand::thread_rng;
use secagg_math::fdh::FullDomainHash;
use secagg_math::modular::mod_inverse;
use secagg_math::zp::{FieldElement, PrimeField};
use std::hint::black_box;

pub fn zp_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("zp");
    let mut rng = thread_rng();

    for bits in [64, 256, 2048] {
        let field = PrimeField::new_arc(bits).unwrap();
        let a = FieldElement::random(&field, &mut rng);
        let b = FieldElement::random(&field, &mut rng);

        group.bench_function(BenchmarkId::new("mul", bits), |bench| {
            bench.iter(|| black_box(&a * &b));
        });

        group.bench_function(BenchmarkId::new("inv", bits), |bench| {
            bench.iter(|| black_box(a.inv()));
        });
    }

    let m = (BigUint::from(1u32) << 2203usize) - 1u32;
    let x = rng.gen_biguint_below(&m);
    group.bench_function("mod_inverse/2203", |bench| {
        bench.iter(|| black_box(mod_inverse(&x, &m)));
    });

    group.finish();
}

pub fn fdh_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("fdh");
    let mut rng = thread_rng();

    for bits in [512u64, 1024] {
        let n = rng.gen_biguint(bits) | BigUint::from(1u32);
        let hash = FullDomainHash::new(&n).unwrap();
        let tag = BigUint::from(17u32);
        group.bench_function(BenchmarkId::new("hash", 2 * bits), |bench| {
            bench.iter(|| black_box(hash.hash(&tag)));
        });
    }

    group.finish();
}

criterion_group!(zp, zp_benchmark, fdh_benchmark);
criterion_main!(zp);
