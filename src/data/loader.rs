use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;

use crate::error::DashboardError;
use crate::schema::{self, FieldKind, CATEGORY_COLUMNS, MONEY_COLUMNS};

use super::model::{CellValue, Dataset, Record};

// ---------------------------------------------------------------------------
// RawTable / RowSource – the spreadsheet collaborator boundary
// ---------------------------------------------------------------------------

/// Untyped tabular data as fetched from the source: one header row naming
/// columns, then one row of string cells per observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// The spreadsheet retrieval collaborator, seen only through this seam.
///
/// Implementations own transport, credentials, and timeouts; any fetch
/// failure (network, auth, timeout) must surface as
/// [`DashboardError::SourceUnavailable`] so the caller can retry with
/// backoff while the store keeps serving the previous snapshot.
pub trait RowSource {
    fn fetch(&self) -> Result<RawTable, DashboardError>;
}

/// A pre-fetched table, handed to the store as-is. Adapter for callers
/// that already hold rows (and for tests).
#[derive(Debug, Clone)]
pub struct MemorySource(pub RawTable);

impl RowSource for MemorySource {
    fn fetch(&self) -> Result<RawTable, DashboardError> {
        Ok(self.0.clone())
    }
}

// ---------------------------------------------------------------------------
// Snapshot file sources – offline exports of the sheet
// ---------------------------------------------------------------------------

/// Open a snapshot file source, dispatching by extension.
///
/// Supported formats:
/// * `.csv`  – header row, one row per observation
/// * `.json` – records-oriented array: `[{ "fecha": "...", ... }, ...]`
pub fn snapshot_source(path: &Path) -> Result<Box<dyn RowSource>, DashboardError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => Ok(Box::new(CsvSource::new(path))),
        "json" => Ok(Box::new(JsonSource::new(path))),
        other => Err(DashboardError::SourceUnavailable {
            reason: format!("unsupported snapshot extension: .{other}"),
        }),
    }
}

/// CSV snapshot of the sheet.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvSource { path: path.into() }
    }
}

impl RowSource for CsvSource {
    fn fetch(&self) -> Result<RawTable, DashboardError> {
        let mut reader = csv::Reader::from_path(&self.path).map_err(|e| {
            DashboardError::SourceUnavailable {
                reason: format!("opening CSV {}: {e}", self.path.display()),
            }
        })?;
        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| DashboardError::SourceUnavailable {
                reason: format!("reading CSV headers: {e}"),
            })?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (row_no, result) in reader.records().enumerate() {
            let record = result.map_err(|e| DashboardError::SourceUnavailable {
                reason: format!("CSV row {row_no}: {e}"),
            })?;
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }

        Ok(RawTable { headers, rows })
    }
}

/// JSON snapshot of the sheet (records-oriented array of objects).
///
/// Cells are stringified before normalization so both loaders feed the
/// same coercion path.
#[derive(Debug, Clone)]
pub struct JsonSource {
    path: PathBuf,
}

impl JsonSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonSource { path: path.into() }
    }
}

impl RowSource for JsonSource {
    fn fetch(&self) -> Result<RawTable, DashboardError> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            DashboardError::SourceUnavailable {
                reason: format!("reading JSON {}: {e}", self.path.display()),
            }
        })?;
        let root: JsonValue =
            serde_json::from_str(&text).map_err(|e| DashboardError::SourceUnavailable {
                reason: format!("parsing JSON: {e}"),
            })?;

        let records = root
            .as_array()
            .ok_or_else(|| DashboardError::SourceUnavailable {
                reason: "expected top-level JSON array".to_string(),
            })?;

        // Header = union of keys across records, in first-seen-then-sorted
        // order so the table is deterministic regardless of object order.
        let mut headers: BTreeSet<String> = BTreeSet::new();
        for rec in records {
            if let Some(obj) = rec.as_object() {
                headers.extend(obj.keys().cloned());
            }
        }
        let headers: Vec<String> = headers.into_iter().collect();

        let mut rows = Vec::with_capacity(records.len());
        for (i, rec) in records.iter().enumerate() {
            let obj = rec
                .as_object()
                .ok_or_else(|| DashboardError::SourceUnavailable {
                    reason: format!("row {i} is not a JSON object"),
                })?;
            let row = headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell_text).unwrap_or_default())
                .collect();
            rows.push(row);
        }

        Ok(RawTable { headers, rows })
    }
}

fn json_to_cell_text(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Normalization – RawTable → Dataset
// ---------------------------------------------------------------------------

/// Validate a fetched table against the sheet schema and coerce it into a
/// typed [`Dataset`].
///
/// * A header missing any required column fails with `SchemaMismatch`.
/// * Unknown columns are dropped, with one warning per column.
/// * A row whose date or indicator cell is unparseable is skipped and
///   counted in `skipped_rows`; blank cells become `Null` (a missing
///   answer, not a "No").
pub fn build_dataset(table: &RawTable, version: u64) -> Result<Dataset, DashboardError> {
    let missing: Vec<String> = schema::required_columns()
        .into_iter()
        .filter(|col| !table.headers.iter().any(|h| h == col))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(DashboardError::SchemaMismatch { missing });
    }

    for header in &table.headers {
        if !schema::is_known_column(header) {
            log::warn!("dropping unknown column '{header}'");
        }
    }

    let mut records = Vec::with_capacity(table.rows.len());
    let mut skipped_rows = 0usize;

    'rows: for (row_no, row) in table.rows.iter().enumerate() {
        let mut fields: BTreeMap<String, CellValue> = BTreeMap::new();
        let mut id: Option<String> = None;

        for (col_idx, header) in table.headers.iter().enumerate() {
            let cell = row.get(col_idx).map(|c| c.trim()).unwrap_or("");

            if header == schema::ID_COLUMN {
                if !cell.is_empty() {
                    id = Some(cell.to_string());
                }
                continue;
            }
            if header == schema::DATE_COLUMN {
                if cell.is_empty() {
                    fields.insert(header.clone(), CellValue::Null);
                } else {
                    match parse_date(cell) {
                        Some(iso) => {
                            fields.insert(header.clone(), CellValue::Date(iso));
                        }
                        None => {
                            log::warn!("row {row_no}: unparseable date '{cell}', row skipped");
                            skipped_rows += 1;
                            continue 'rows;
                        }
                    }
                }
                continue;
            }
            if CATEGORY_COLUMNS.contains(&header.as_str()) {
                let value = if cell.is_empty() {
                    CellValue::Null
                } else {
                    CellValue::String(cell.to_string())
                };
                fields.insert(header.clone(), value);
                continue;
            }
            if MONEY_COLUMNS.contains(&header.as_str()) {
                let value = if cell.is_empty() {
                    CellValue::Null
                } else {
                    match cell.replace(',', ".").parse::<f64>() {
                        Ok(v) => CellValue::Float(v),
                        Err(_) => {
                            log::warn!("row {row_no}: non-numeric {header} '{cell}', kept as missing");
                            CellValue::Null
                        }
                    }
                };
                fields.insert(header.clone(), value);
                continue;
            }
            if let Some((_, field)) = schema::indicator(header) {
                match parse_indicator(cell, field.kind) {
                    Ok(value) => {
                        fields.insert(header.clone(), value);
                    }
                    Err(()) => {
                        log::warn!(
                            "row {row_no}: invalid answer '{cell}' for {header}, row skipped"
                        );
                        skipped_rows += 1;
                        continue 'rows;
                    }
                }
                continue;
            }
            // Unknown column, already warned about above.
        }

        records.push(Record {
            id: id.unwrap_or_else(|| format!("r{}", row_no + 1)),
            fields,
        });
    }

    Ok(Dataset::from_records(version, records, skipped_rows))
}

/// Parse an indicator cell according to its declared kind.
/// Blank cells are missing answers, not refusals.
fn parse_indicator(cell: &str, kind: FieldKind) -> Result<CellValue, ()> {
    if cell.is_empty() {
        return Ok(CellValue::Null);
    }
    match kind {
        FieldKind::Flag => match cell.to_uppercase().as_str() {
            "SI" | "SÍ" | "S" | "TRUE" | "VERDADERO" | "1" => Ok(CellValue::Bool(true)),
            "NO" | "N" | "FALSE" | "FALSO" | "0" => Ok(CellValue::Bool(false)),
            _ => Err(()),
        },
        FieldKind::Likert { max } => {
            let v: i64 = cell.parse().map_err(|_| ())?;
            if (1..=i64::from(max)).contains(&v) {
                Ok(CellValue::Integer(v))
            } else {
                Err(())
            }
        }
    }
}

/// Normalize a date cell to ISO-8601. Accepts `YYYY-MM-DD` and
/// `DD/MM/YYYY`, the two layouts the verification sheet has used.
pub(crate) fn parse_date(cell: &str) -> Option<String> {
    let (year, month, day) = if let Some((y, rest)) = cell.split_once('-') {
        let (m, d) = rest.split_once('-')?;
        (y, m, d)
    } else if let Some((d, rest)) = cell.split_once('/') {
        let (m, y) = rest.split_once('/')?;
        (y, m, d)
    } else {
        return None;
    };

    let year: u32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;
    if !(1000..=9999).contains(&year) || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    Some(format!("{year:04}-{month:02}-{day:02}"))
}
