use thiserror::Error;

/// Error type for data loading, filtering, and metric computation failures.
///
/// Per-row validation failures are deliberately *not* represented here:
/// they accumulate as `skipped_rows` on the loaded [`Dataset`] so a refresh
/// survives a few malformed rows while the caller can still surface a
/// data-quality warning.
///
/// [`Dataset`]: crate::data::model::Dataset
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The remote source could not be reached or timed out. Transient;
    /// the caller may retry with backoff.
    #[error("data source unavailable: {reason}")]
    SourceUnavailable { reason: String },

    /// The source's column layout no longer matches the expected schema.
    /// Fatal for this refresh; the previously loaded dataset stays current.
    #[error("source schema mismatch, missing columns: {}", .missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },

    /// No refresh has succeeded yet. Distinct from an empty filtered
    /// result, which is a valid (zero-record) view.
    #[error("no dataset has been loaded yet")]
    NoDataAvailable,

    /// A caller-supplied filter is self-contradictory.
    #[error("invalid filter: {reason}")]
    InvalidFilter { reason: String },

    /// A dimension name that no analysis page defines.
    #[error("unknown dimension '{name}'")]
    UnknownDimension { name: String },
}
