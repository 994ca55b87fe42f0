//! Fixed-width record codec.
//!
//! A record is seven positional fields laid out back to back:
//!
//! ```text
//! [ id: 8 ][ first: 10 ][ last: 10 ][ dept: 3 ][ prog: 3 ][ sin: 9 ][ address: 56 ]
//! ```
//!
//! Numeric fields are stored zero-left-padded, text fields space-right-padded.
//! The concatenation of the canonical fields is both the on-disk line and the
//! sort key; two records are equal iff their canonical forms are equal, and
//! they order byte-wise over that form.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Spaces removed, zero-left-padded, rightmost digits kept when too long.
    Numeric,
    /// Trailing spaces trimmed, space-right-padded, truncated when too long.
    Text,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub width: usize,
    pub kind: FieldKind,
}

pub const FIELDS: [FieldSpec; 7] = [
    FieldSpec { name: "student_id", width: 8, kind: FieldKind::Numeric },
    FieldSpec { name: "first_name", width: 10, kind: FieldKind::Text },
    FieldSpec { name: "last_name", width: 10, kind: FieldKind::Text },
    FieldSpec { name: "department", width: 3, kind: FieldKind::Numeric },
    FieldSpec { name: "program", width: 3, kind: FieldKind::Numeric },
    FieldSpec { name: "sin", width: 9, kind: FieldKind::Numeric },
    FieldSpec { name: "address", width: 56, kind: FieldKind::Text },
];

/// Total width of a canonical record, in characters.
pub const RECORD_WIDTH: usize = total_width(&FIELDS);

const fn total_width(fields: &[FieldSpec]) -> usize {
    let mut sum = 0;
    let mut i = 0;
    while i < fields.len() {
        sum += fields[i].width;
        i += 1;
    }
    sum
}

/// An immutable record in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    canonical: String,
}

impl Record {
    /// Decode one input line.
    ///
    /// A trailing `\r` (and a stray `\n`) is dropped before the width check;
    /// characters past `RECORD_WIDTH` are ignored.
    pub fn decode(line: &str) -> Result<Self> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let line = line.strip_suffix('\r').unwrap_or(line);

        let len = if line.is_ascii() {
            line.len()
        } else {
            line.chars().count()
        };
        if len < RECORD_WIDTH {
            return Err(Error::MalformedRecord {
                len,
                expected: RECORD_WIDTH,
            });
        }

        let mut raw = [""; FIELDS.len()];
        let mut rest = line;
        for (slot, spec) in raw.iter_mut().zip(FIELDS.iter()) {
            let (head, tail) = split_chars(rest, spec.width);
            *slot = head;
            rest = tail;
        }
        Self::assemble(&raw)
    }

    /// Build a record from raw field values, canonicalizing each one.
    pub fn from_fields(fields: [&str; 7]) -> Result<Self> {
        Self::assemble(&fields)
    }

    fn assemble(raw: &[&str]) -> Result<Self> {
        let mut canonical = String::with_capacity(RECORD_WIDTH);
        for (value, spec) in raw.iter().zip(FIELDS.iter()) {
            match spec.kind {
                FieldKind::Numeric => push_numeric(&mut canonical, value, spec.width),
                FieldKind::Text => push_text(&mut canonical, value, spec.width),
            }
        }

        let width = canonical.chars().count();
        if width != RECORD_WIDTH {
            return Err(Error::Invariant(format!(
                "serialized record width {width} != {RECORD_WIDTH}"
            )));
        }
        Ok(Self { canonical })
    }

    /// The canonical serialized form (exactly `RECORD_WIDTH` characters).
    pub fn encode(&self) -> &str {
        &self.canonical
    }

    pub fn into_string(self) -> String {
        self.canonical
    }

    /// Byte-wise comparison of canonical forms.
    pub fn compare(a: &Record, b: &Record) -> Ordering {
        a.canonical.as_bytes().cmp(b.canonical.as_bytes())
    }

    /// Canonical value of the field at `idx` (see [`FIELDS`]).
    pub fn field(&self, idx: usize) -> Option<&str> {
        let spec = FIELDS.get(idx)?;
        let start: usize = FIELDS[..idx].iter().map(|f| f.width).sum();
        let (_, rest) = split_chars(&self.canonical, start);
        let (value, _) = split_chars(rest, spec.width);
        Some(value)
    }

    pub fn student_id(&self) -> &str {
        self.field(0).unwrap_or_default()
    }

    pub fn first_name(&self) -> &str {
        self.field(1).unwrap_or_default()
    }

    pub fn last_name(&self) -> &str {
        self.field(2).unwrap_or_default()
    }

    pub fn department(&self) -> &str {
        self.field(3).unwrap_or_default()
    }

    pub fn program(&self) -> &str {
        self.field(4).unwrap_or_default()
    }

    pub fn sin(&self) -> &str {
        self.field(5).unwrap_or_default()
    }

    pub fn address(&self) -> &str {
        self.field(6).unwrap_or_default()
    }
}

impl Ord for Record {
    fn cmp(&self, other: &Self) -> Ordering {
        Record::compare(self, other)
    }
}

impl PartialOrd for Record {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl FromStr for Record {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Record::decode(s)
    }
}

impl AsRef<str> for Record {
    fn as_ref(&self) -> &str {
        &self.canonical
    }
}

/// Split `s` after `n` characters. Returns `(s, "")` if `s` is shorter.
fn split_chars(s: &str, n: usize) -> (&str, &str) {
    if s.is_ascii() {
        return s.split_at(n.min(s.len()));
    }
    match s.char_indices().nth(n) {
        Some((idx, _)) => s.split_at(idx),
        None => (s, ""),
    }
}

fn push_numeric(out: &mut String, value: &str, width: usize) {
    let digits: Vec<char> = value.chars().filter(|c| *c != ' ').collect();
    if digits.len() > width {
        out.extend(&digits[digits.len() - width..]);
    } else {
        out.extend(std::iter::repeat('0').take(width - digits.len()));
        out.extend(digits);
    }
}

fn push_text(out: &mut String, value: &str, width: usize) {
    let trimmed = value.trim_end_matches(' ');
    let mut written = 0;
    for c in trimmed.chars().take(width) {
        out.push(c);
        written += 1;
    }
    out.extend(std::iter::repeat(' ').take(width - written));
}
