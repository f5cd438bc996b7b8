use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::data::loader::parse_date;
use crate::data::model::{CellValue, Dataset, Record};
use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// FilterSpec – user-selected predicates
// ---------------------------------------------------------------------------

/// Inclusive date range over ISO-8601 dates. Open bounds are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// A page view's filter selection.
///
/// The empty spec matches every record. Predicates on distinct columns
/// combine conjunctively; the selected values within one column combine
/// disjunctively. A selected value that no record carries simply matches
/// zero records.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FilterSpec {
    pub date: Option<DateRange>,
    /// Per-column selection: column name → set of accepted values.
    /// An explicitly empty set accepts nothing for that column.
    pub categories: BTreeMap<String, BTreeSet<CellValue>>,
}

impl FilterSpec {
    /// Restrict to observations dated within `[start, end]` (inclusive).
    pub fn with_dates(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.date = Some(DateRange {
            start: Some(start.into()),
            end: Some(end.into()),
        });
        self
    }

    /// Restrict `column` to the given accepted values (OR within the set).
    pub fn with_category<I, V>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        self.categories
            .entry(column.to_string())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.categories.is_empty()
    }

    /// Reject self-contradictory specs before any record is inspected, so
    /// a bad range is an error rather than a misleading empty result.
    pub fn validate(&self) -> Result<(), DashboardError> {
        self.date_bounds().map(|_| ())
    }

    /// Normalize the date bounds to ISO once, up front.
    fn date_bounds(&self) -> Result<Option<DateRange>, DashboardError> {
        let Some(range) = &self.date else {
            return Ok(None);
        };
        let normalize = |bound: &Option<String>| -> Result<Option<String>, DashboardError> {
            match bound {
                Some(raw) => parse_date(raw)
                    .map(Some)
                    .ok_or_else(|| DashboardError::InvalidFilter {
                        reason: format!("unparseable date bound '{raw}'"),
                    }),
                None => Ok(None),
            }
        };
        let start = normalize(&range.start)?;
        let end = normalize(&range.end)?;
        if let (Some(start), Some(end)) = (&start, &end) {
            if start > end {
                return Err(DashboardError::InvalidFilter {
                    reason: format!("date range starts {start} after it ends {end}"),
                });
            }
        }
        Ok(Some(DateRange { start, end }))
    }

    fn matches(&self, record: &Record, date_bounds: Option<&DateRange>) -> bool {
        if let Some(range) = date_bounds {
            let Some(date) = record.date() else {
                // Undated observations cannot satisfy a date predicate.
                return false;
            };
            if let Some(start) = range.start.as_deref() {
                if date < start {
                    return false;
                }
            }
            if let Some(end) = range.end.as_deref() {
                if date > end {
                    return false;
                }
            }
        }
        for (column, selected) in &self.categories {
            if !selected.contains(record.value(column)) {
                return false;
            }
        }
        true
    }
}

// ---------------------------------------------------------------------------
// FilteredView – an index subset over an immutable snapshot
// ---------------------------------------------------------------------------

/// The records of one snapshot that pass a filter selection, in dataset
/// order. Holds its own `Arc<Dataset>`, so a view stays valid after the
/// store moves on to a newer version; staleness is the caller's freshness
/// concern, not an engine error.
#[derive(Debug, Clone)]
pub struct FilteredView {
    dataset: Arc<Dataset>,
    indices: Vec<usize>,
}

impl FilteredView {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Matching records in dataset order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.indices.iter().map(|&i| &self.dataset.records[i])
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn dataset_version(&self) -> u64 {
        self.dataset.version
    }

    pub fn fetched_at(&self) -> SystemTime {
        self.dataset.fetched_at
    }

    /// Rows the load boundary excluded; forwarded so presentation can show
    /// a data-quality warning next to any metric built on this view.
    pub fn skipped_rows(&self) -> usize {
        self.dataset.skipped_rows
    }

    /// Derive a narrower view over the same snapshot, keeping only the
    /// records `keep` accepts. Order is preserved.
    pub fn narrow(&self, keep: impl Fn(&Record) -> bool) -> FilteredView {
        FilteredView {
            dataset: Arc::clone(&self.dataset),
            indices: self
                .indices
                .iter()
                .copied()
                .filter(|&i| keep(&self.dataset.records[i]))
                .collect(),
        }
    }
}

/// Apply a filter selection to a snapshot.
///
/// Evaluation is pure; identical inputs yield an identical view (same
/// records, same order).
pub fn apply(dataset: &Arc<Dataset>, spec: &FilterSpec) -> Result<FilteredView, DashboardError> {
    let date_bounds = spec.date_bounds()?;
    let indices = dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, record)| spec.matches(record, date_bounds.as_ref()))
        .map(|(i, _)| i)
        .collect();
    Ok(FilteredView {
        dataset: Arc::clone(dataset),
        indices,
    })
}
