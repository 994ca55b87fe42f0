use std::fs;
use std::path::{Path, PathBuf};

use criterion::{criterion_group, criterion_main, Criterion};
use bagunion_core::budget::MemoryBudget;
use bagunion_core::config::{EngineConfig, StrategyKind};
use bagunion_core::record::RECORD_WIDTH;
use bagunion_core::Record;
use bagunion_exec::Engine;
use bagunion_mem::spill::RunStore;
use bagunion_mem::tracking::IoCostTracker;
use bagunion_operators::{create_initial_runs, RunMerger};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn bench_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("bagunion-bench-{}", name));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_input(path: &Path, rows: usize, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut body = String::with_capacity(rows * (RECORD_WIDTH + 1));
    for _ in 0..rows {
        let id = rng.gen_range(10_000_000..20_000_000u32).to_string();
        let rec = Record::from_fields([
            id.as_str(),
            "Sarah",
            "Clark",
            "555",
            "101",
            "123456789",
            "1455 Guy Street, Montreal, QC",
        ])
        .unwrap();
        body.push_str(rec.encode());
        body.push('\n');
    }
    fs::write(path, body).unwrap();
}

fn bench_external_sort(c: &mut Criterion) {
    let dir = bench_dir("sort");
    let input = dir.join("in.txt");
    write_input(&input, 20_000, 1);
    let budget = MemoryBudget::with_records(1_000);

    for kind in [StrategyKind::Kway, StrategyKind::Pairwise] {
        c.bench_function(&format!("external_sort_{}", kind), |b| {
            b.iter(|| {
                let mut store = RunStore::new(dir.join("runs"), "B").unwrap();
                let mut io = IoCostTracker::new();
                let runs =
                    create_initial_runs(&input, budget.records, &mut store, &mut io).unwrap();
                let mut merger = RunMerger::from_config(kind, &budget);
                merger
                    .merge_runs(runs, dir.join("sorted.txt"), &mut store, &mut io)
                    .unwrap();
            })
        });
    }
}

fn bench_bag_union(c: &mut Criterion) {
    let dir = bench_dir("union");
    let (a, b_path) = (dir.join("T1.txt"), dir.join("T2.txt"));
    write_input(&a, 10_000, 2);
    write_input(&b_path, 10_000, 3);
    let cfg = EngineConfig {
        mem_limit_bytes: 256 * 1024,
        scratch_dir: dir.join("scratch").display().to_string(),
        ..EngineConfig::default()
    };

    c.bench_function("bag_union_end_to_end", |b| {
        b.iter(|| {
            let mut engine = Engine::new(cfg.clone()).unwrap();
            engine.bag_union(&a, &b_path, dir.join("out.txt")).unwrap();
        })
    });
}

criterion_group!(benches, bench_external_sort, bench_bag_union);
criterion_main!(benches);
