use std::fs;
use std::path::{Path, PathBuf};

use bagunion_core::record::Record;
use bagunion_io::buf::{RecordReader, RecordWriter};
use bagunion_mem::spill::{RunMeta, RunStore};
use bagunion_mem::tracking::IoCostTracker;

/// Fresh, empty directory under the system temp dir.
pub fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("bagunion-ops-{name}"));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn rec(id: &str) -> Record {
    Record::from_fields([id, "Sarah", "Clark", "555", "101", "123456789", "Guy Street"])
        .unwrap()
}

pub fn sample_lines(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| rec(id).into_string()).collect()
}

pub fn write_lines(path: &Path, lines: &[String]) {
    let mut body = String::new();
    for l in lines {
        body.push_str(l);
        body.push('\n');
    }
    fs::write(path, body).unwrap();
}

pub fn read_run(path: &Path) -> Vec<Record> {
    let mut io = IoCostTracker::new();
    let mut r = RecordReader::open(path).unwrap();
    let mut out = Vec::new();
    while let Some(rec) = r.next_record(&mut io).unwrap() {
        out.push(rec);
    }
    out
}

/// Write `ids` (sorted) as a registered run in `store`.
pub fn make_run(store: &mut RunStore, ids: &[&str]) -> RunMeta {
    let mut records: Vec<Record> = ids.iter().map(|id| rec(id)).collect();
    records.sort();
    let mut io = IoCostTracker::new();
    let (id, name, path) = store.allocate();
    let mut w = RecordWriter::create(&path).unwrap();
    for r in &records {
        w.write_record(r, &mut io).unwrap();
    }
    let (path, n) = w.finish().unwrap();
    store.register(id, name, path, n)
}
