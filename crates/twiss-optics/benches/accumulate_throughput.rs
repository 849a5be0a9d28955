use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use twiss_optics::{generate, BeamSpec, MomentAccumulator, OpticsCalculator, OpticsOptions};

const PROTON: f64 = 0.938_272_088_16;

fn bench_accumulate(c: &mut Criterion) {
    let spec = BeamSpec {
        particles: 20_000,
        seed: 11,
        relative_momentum_spread: 1e-3,
        ..BeamSpec::default()
    };
    let records = generate(&spec, PROTON).expect("beam");

    let mut group = c.benchmark_group("accumulate");
    group.throughput(Throughput::Elements(records.len() as u64));
    group.bench_function("fill_20k", |b| {
        let mut acc = MomentAccumulator::new(PROTON);
        b.iter(|| {
            acc.reset();
            black_box(acc.fill(&records));
        });
    });
    group.finish();

    let mut acc = MomentAccumulator::new(PROTON);
    acc.fill(&records);
    let calculator = OpticsCalculator::new(PROTON, OpticsOptions::default());
    c.bench_function("finalize", |b| {
        b.iter(|| {
            let moments = acc.central_moments();
            black_box(calculator.calculate(&moments, acc.reference_s()));
        });
    });
}

criterion_group!(benches, bench_accumulate);
criterion_main!(benches);
