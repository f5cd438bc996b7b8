use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::schema::{self, CATEGORY_COLUMNS};

// ---------------------------------------------------------------------------
// CellValue – a single cell of the verification sheet
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the source sheet's types.
/// Using `BTreeMap` / `BTreeSet` downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date kept as text; lexicographic order is chronological.
    Date(String),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) | (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) | CellValue::Date(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.2}"),
            CellValue::Bool(b) => write!(f, "{}", if *b { "Sí" } else { "No" }),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => write!(f, "<sin dato>"),
        }
    }
}

impl CellValue {
    /// Interpret the cell as an affirmative/negative answer.
    /// `None` for missing answers so they can be excluded per question.
    pub fn as_answer(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            CellValue::Integer(i) => Some(*i != 0),
            _ => None,
        }
    }

    /// Interpret the cell as a number, if it is one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

// ---------------------------------------------------------------------------
// Record – one verification observation (one sheet row)
// ---------------------------------------------------------------------------

/// A single verification observation.
#[derive(Debug, Clone)]
pub struct Record {
    /// Stable identifier, unique within a snapshot.
    pub id: String,
    /// Validated cells keyed by canonical column name. Only schema-known
    /// columns appear here; the load boundary drops the rest.
    pub fields: BTreeMap<String, CellValue>,
}

impl Record {
    /// The observation date as an ISO-8601 string, when present and valid.
    pub fn date(&self) -> Option<&str> {
        match self.fields.get(schema::DATE_COLUMN) {
            Some(CellValue::Date(d)) => Some(d.as_str()),
            _ => None,
        }
    }

    /// The cell for `column`, with absence flattened to [`CellValue::Null`].
    pub fn value(&self, column: &str) -> &CellValue {
        static NULL: CellValue = CellValue::Null;
        self.fields.get(column).unwrap_or(&NULL)
    }

    /// The answer to an indicator question, `None` when unanswered.
    pub fn answer(&self, column: &str) -> Option<bool> {
        self.fields.get(column).and_then(CellValue::as_answer)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete snapshot of one refresh
// ---------------------------------------------------------------------------

/// An immutable snapshot of all records from one refresh cycle.
///
/// Never mutated after creation: filtering produces an index subset
/// ([`FilteredView`]), and a newer refresh produces a whole new `Dataset`
/// under the next version.
///
/// [`FilteredView`]: crate::filter::FilteredView
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Monotonically increasing per store; 1 is the first successful load.
    pub version: u64,
    /// All records in source order.
    pub records: Vec<Record>,
    /// Rows excluded by load-time validation. Surfaced so the presentation
    /// layer can show a data-quality warning.
    pub skipped_rows: usize,
    /// When the snapshot was fetched.
    pub fetched_at: SystemTime,
    /// For each category column present, the sorted set of unique values.
    /// Drives filter widgets and breakdown groups.
    pub category_values: BTreeMap<String, BTreeSet<CellValue>>,
}

impl Dataset {
    /// Build the category index from freshly normalized records.
    pub fn from_records(version: u64, records: Vec<Record>, skipped_rows: usize) -> Self {
        let mut category_values: BTreeMap<String, BTreeSet<CellValue>> = BTreeMap::new();
        for record in &records {
            for col in CATEGORY_COLUMNS {
                if let Some(val) = record.fields.get(col) {
                    if !val.is_null() {
                        category_values
                            .entry(col.to_string())
                            .or_default()
                            .insert(val.clone());
                    }
                }
            }
        }
        Dataset {
            version,
            records,
            skipped_rows,
            fetched_at: SystemTime::now(),
            category_values,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the snapshot holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
