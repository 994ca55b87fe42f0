//! Synthetic student-record generator for the `generate` subcommand.

use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use bagunion_core::{Record, Result};
use bagunion_io::buf::RecordWriter;
use bagunion_mem::tracking::IoCostTracker;

const FIRST_NAMES: &[&str] = &[
    "John", "Mary", "Alice", "Bob", "David", "Sarah", "Kevin", "Laura", "Emily", "Michael",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Brown", "Lee", "Martin", "Garcia", "Lopez", "Wilson", "Taylor", "Clark",
];

const STREET_NAMES: &[&str] = &[
    "Maisonneuve West",
    "Sherbrooke Street",
    "Saint Catherine",
    "Guy Street",
    "Peel Street",
    "Saint Denis",
    "Saint Laurent",
    "Crescent Street",
    "Park Avenue",
    "Bishop Street",
];

const STREET_TYPES: &[&str] = &["St", "Ave", "Blvd", "Rd"];

const DEPARTMENTS: &[u32] = &[444, 555, 666, 777];

/// `digits` random decimal digits with a non-zero leading digit.
fn numeric(rng: &mut impl Rng, digits: usize) -> String {
    let mut s = String::with_capacity(digits);
    s.push(char::from(b'0' + rng.gen_range(1..=9u8)));
    for _ in 1..digits {
        s.push(char::from(b'0' + rng.gen_range(0..=9u8)));
    }
    s
}

fn pick<'a>(rng: &mut impl Rng, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

/// One well-formed record. The codec pads every field to its width.
pub fn random_record(rng: &mut impl Rng) -> Result<Record> {
    let student_id = numeric(rng, 8);
    let first = pick(rng, FIRST_NAMES);
    let last = pick(rng, LAST_NAMES);
    let dept = DEPARTMENTS.choose(rng).copied().unwrap_or(444).to_string();
    let program = rng.gen_range(100..1000u32).to_string();
    let sin = numeric(rng, 9);
    let address = format!(
        "{} {} {}, Montreal, QC, H3G 1M8",
        rng.gen_range(100..10_000u32),
        pick(rng, STREET_NAMES),
        pick(rng, STREET_TYPES),
    );
    Record::from_fields([
        student_id.as_str(),
        first,
        last,
        dept.as_str(),
        program.as_str(),
        sin.as_str(),
        address.as_str(),
    ])
}

/// Write `count` random records to `path`. A fixed `seed` makes the output
/// reproducible.
pub fn write_records(path: impl AsRef<Path>, count: u64, seed: Option<u64>) -> Result<u64> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    // Generation is not part of any measured phase.
    let mut io = IoCostTracker::new();
    let mut writer = RecordWriter::create(path)?;
    for _ in 0..count {
        writer.write_record(&random_record(&mut rng)?, &mut io)?;
    }
    let (_, written) = writer.finish()?;
    Ok(written)
}
