//! End-to-end integration tests

mod test_data_gen;

use std::collections::BTreeMap;
use std::fs;

use bagunion_core::config::{EngineConfig, StrategyKind};
use bagunion_core::report::RunReport;
use bagunion_core::{Error, Record};
use bagunion_exec::{Engine, ExecError, Phase};
use bagunion_io::count_records;
use test_data_gen::{
    create_temp_dir, generate_random_records, make_record, read_records, read_union_output,
    write_records,
};

fn config_for(dir: &std::path::Path, mem_limit_bytes: u64) -> EngineConfig {
    EngineConfig {
        mem_limit_bytes,
        scratch_dir: dir.join("scratch").display().to_string(),
        ..EngineConfig::default()
    }
}

fn expected_union(left: &[Record], right: &[Record]) -> Vec<(Record, u64)> {
    let mut m: BTreeMap<Record, u64> = BTreeMap::new();
    for r in left.iter().chain(right) {
        *m.entry(r.clone()).or_insert(0) += 1;
    }
    m.into_iter().collect()
}

#[test]
fn test_end_to_end_small_budget() {
    let dir = create_temp_dir("e2e-small");
    let left = generate_random_records(1_500, 400, 100);
    let right = generate_random_records(900, 400, 200);
    let (a, b, out) = (dir.join("T1.txt"), dir.join("T2.txt"), dir.join("union.txt"));
    write_records(&a, &left);
    write_records(&b, &right);

    // 20_000 bytes -> 12_000 usable -> 121 records per run, fan-in 2.
    let mut engine = Engine::new(config_for(&dir, 20_000)).unwrap();
    assert_eq!(engine.budget().records, 121);
    let report = engine.bag_union(&a, &b, &out).unwrap();

    let got = read_union_output(&out);
    assert_eq!(got, expected_union(&left, &right));
    assert_eq!(report.metrics.distinct_tuples as usize, got.len());

    assert_eq!(report.relations.len(), 2);
    assert_eq!(report.relations[0].records, 1_500);
    assert_eq!(report.relations[0].runs_generated, 13);
    assert_eq!(report.relations[1].runs_generated, 8);
    assert!(report.relations.iter().all(|r| r.merge_passes >= 3));

    // The sorted relations stay in the scratch dir; runs do not.
    let sorted_left = read_records(&dir.join("scratch").join("T1_sorted.txt"));
    assert_eq!(sorted_left.len(), 1_500);
    let leftover_runs = fs::read_dir(dir.join("scratch"))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .count();
    assert_eq!(leftover_runs, 0);

    let counted = count_records(&out).unwrap();
    assert_eq!(counted.records, report.metrics.distinct_tuples);
    assert_eq!(counted.blocks, report.metrics.output_blocks);
}

#[test]
fn test_strategies_and_output_modes_agree() {
    let dir = create_temp_dir("e2e-modes");
    let left = generate_random_records(600, 90, 7);
    let right = generate_random_records(300, 90, 8);
    let (a, b) = (dir.join("T1.txt"), dir.join("T2.txt"));
    write_records(&a, &left);
    write_records(&b, &right);

    let mut outputs = Vec::new();
    let mut reports: Vec<RunReport> = Vec::new();
    for (strategy, buffered) in [
        (StrategyKind::Kway, false),
        (StrategyKind::Kway, true),
        (StrategyKind::Pairwise, false),
        (StrategyKind::Pairwise, true),
    ] {
        let out = dir.join(format!("out-{}-{}.txt", strategy, buffered));
        let mut cfg = config_for(&dir, 60_000);
        cfg.strategy = strategy;
        cfg.buffered_output = buffered;
        let report = Engine::new(cfg)
            .unwrap()
            .bag_union(&a, &b, &out)
            .unwrap();
        assert_eq!(report.strategy, strategy);
        outputs.push(fs::read_to_string(&out).unwrap());
        reports.push(report);
    }

    assert!(outputs.windows(2).all(|w| w[0] == w[1]));
    assert!(reports.windows(2).all(|w| w[0].metrics == w[1].metrics));
}

#[test]
fn test_report_serializes_to_json() {
    let dir = create_temp_dir("e2e-json");
    let (a, b, out) = (dir.join("T1.txt"), dir.join("T2.txt"), dir.join("union.txt"));
    write_records(&a, &[make_record(1), make_record(1)]);
    write_records(&b, &[make_record(2)]);

    let report = Engine::new(config_for(&dir, 1024 * 1024))
        .unwrap()
        .bag_union(&a, &b, &out)
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["metrics"]["distinct_tuples"], 2);
    assert_eq!(json["strategy"], "kway");
    assert_eq!(json["phases"].as_array().unwrap().len(), 3);
    assert_eq!(json["phases"][2]["phase"], "bag-union");

    let back: RunReport = serde_json::from_value(json).unwrap();
    assert_eq!(back.metrics, report.metrics);
}

#[test]
fn test_missing_input_names_phase_and_file() {
    let dir = create_temp_dir("e2e-missing");
    let b = dir.join("T2.txt");
    write_records(&b, &[make_record(1)]);
    let missing = dir.join("nope.txt");

    let mut engine = Engine::new(config_for(&dir, 1024 * 1024)).unwrap();
    let err = engine
        .bag_union(&missing, &b, dir.join("out.txt"))
        .unwrap_err();
    assert_eq!(err.phase(), Some(Phase::SortLeft));
    assert!(matches!(
        err.engine_error(),
        Some(Error::MissingOrUnreadableFile { .. })
    ));
    assert!(err.to_string().contains("nope.txt"));
}

#[test]
fn test_config_from_env_lookup() {
    let cfg = EngineConfig::from_lookup(|key| match key {
        "BAGUNION_MEM_LIMIT_BYTES" => Some("0".into()),
        "BAGUNION_STRATEGY" => Some("pairwise".into()),
        "BAGUNION_BUFFERED_OUTPUT" => Some("true".into()),
        _ => None,
    });
    assert_eq!(cfg.strategy, StrategyKind::Pairwise);
    assert!(cfg.buffered_output);
    assert!(matches!(Engine::new(cfg), Err(ExecError::Config(_))));
}
