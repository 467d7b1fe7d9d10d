use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use peelgraph::{BandLimited, HashGen, Hypergraph, Segmented, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

const N: usize = 100_000;
const M: usize = 123_000;

fn build_and_peel<H: HashGen>(c: &mut Criterion, name: &str, strategy: H) {
    let mut group = c.benchmark_group("build_and_peel");
    group.sample_size(20);
    group.bench_function(BenchmarkId::new(name, N), |b| {
        let mut rng = StdRng::seed_from_u64(42);
        b.iter(|| {
            let g = Hypergraph::build(N, M, &mut rng, &strategy).unwrap();
            black_box(g.is_peelable())
        })
    });
    group.finish();
}

fn bench_hash(c: &mut Criterion) {
    let uniform = Uniform::new(M).unwrap();
    c.bench_function("uniform_get", |b| {
        let mut key = 0u64;
        b.iter(|| {
            key = key.wrapping_add(0x9E37_79B9_7F4A_7C15);
            black_box(uniform.get(black_box(key)))
        })
    });
}

fn bench_peel(c: &mut Criterion) {
    build_and_peel(c, "uniform", Uniform::new(M).unwrap());
    // 123_000 = 41 * 3000
    build_and_peel(c, "segmented", Segmented::new(M, 41).unwrap());
    build_and_peel(c, "band", BandLimited::new(M, M / 25).unwrap());
}

criterion_group!(benches, bench_hash, bench_peel);
criterion_main!(benches);
