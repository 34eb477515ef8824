//! Benchmark for the single-patch Godunov update.
//!
//! Run with: `cargo bench --bench advance`

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use corona2d::config::RunConfig;
use corona2d::database::Field;
use corona2d::hydro::euler::SourceTerms;
use corona2d::setup;
use corona2d::solvers::euler2d_plm::{advance_2d, MeshGeometry};

fn bench_config(nr: usize) -> RunConfig {
    RunConfig {
        num_blocks: 1,
        nr,
        outer_radius: 10.0,
        tfinal: 1.0,
        cpi: 0.0,
        vtki: 0.0,
        rk: 1,
        noise: 0.0,
        heating_rate: 0.1,
        cooling_rate: 0.05,
        num_threads: 1,
        restart: String::new(),
        outdir: ".".into(),
    }
}

fn bench_advance(c: &mut Criterion) {
    let mut group = c.benchmark_group("advance_2d");

    for nr in [32, 64, 128] {
        let cfg = bench_config(nr);
        let database = setup::create_database(&cfg).unwrap();
        let block = (0, 0, 0);
        let u = database.fetch(block, 2, 2, 0, 0, Field::Conserved);
        let geometry = MeshGeometry::for_block(&database, block);
        let source_terms = SourceTerms::new(cfg.heating_rate, cfg.cooling_rate);
        let dt = 1e-3;

        group.bench_function(format!("nr={}", nr), |b| {
            b.iter(|| advance_2d(source_terms, black_box(&u), &geometry, dt).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_advance);
criterion_main!(benches);
