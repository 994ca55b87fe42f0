//! Shared helpers for integration tests: scratch dirs and record files.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use bagunion_core::record::RECORD_WIDTH;
use bagunion_core::Record;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const FIRST: &[&str] = &["John", "Mary", "Alice", "Bob", "Sarah"];
const LAST: &[&str] = &["Smith", "Lee", "Garcia", "Clark", "Brown"];

/// Fresh, empty directory under the system temp dir.
pub fn create_temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("bagunion-it-{}", name));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Deterministic record for `key`; equal keys give equal records.
pub fn make_record(key: u64) -> Record {
    let id = format!("{}", 10_000_000 + key);
    let first = FIRST[(key % FIRST.len() as u64) as usize];
    let last = LAST[(key / 7 % LAST.len() as u64) as usize];
    let dept = format!("{}", 444 + (key % 4) * 111);
    let address = format!("{} Guy Street, Montreal, QC", 100 + key % 900);
    Record::from_fields([
        id.as_str(),
        first,
        last,
        dept.as_str(),
        "101",
        "123456789",
        address.as_str(),
    ])
    .unwrap()
}

/// `n` records drawn from `distinct` keys, in random order.
pub fn generate_random_records(n: usize, distinct: u64, seed: u64) -> Vec<Record> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| make_record(rng.gen_range(0..distinct)))
        .collect()
}

pub fn write_records(path: &Path, records: &[Record]) {
    let mut body = String::with_capacity(records.len() * (RECORD_WIDTH + 1));
    for r in records {
        body.push_str(r.encode());
        body.push('\n');
    }
    fs::write(path, body).unwrap();
}

pub fn read_records(path: &Path) -> Vec<Record> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| Record::decode(l).unwrap())
        .collect()
}

/// Parse `record:count` lines.
pub fn read_union_output(path: &Path) -> Vec<(Record, u64)> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| {
            let (key, count) = l.rsplit_once(':').unwrap();
            (Record::decode(key).unwrap(), count.parse().unwrap())
        })
        .collect()
}

pub fn is_sorted(records: &[Record]) -> bool {
    records.windows(2).all(|w| w[0] <= w[1])
}
