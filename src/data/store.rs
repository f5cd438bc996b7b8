use std::sync::{Arc, Mutex, PoisonError};

use crate::error::DashboardError;

use super::loader::{build_dataset, RowSource};
use super::model::Dataset;

// ---------------------------------------------------------------------------
// RecordStore – owns the current snapshot and its refresh lifecycle
// ---------------------------------------------------------------------------

/// Owns the currently loaded [`Dataset`] and hands out shared read-only
/// snapshots to pages.
///
/// Refreshes are serialized: while one caller is fetching, others block on
/// the refresh gate, and a caller that waited out someone else's refresh
/// receives that refresh's result instead of starting a duplicate fetch.
/// A failed refresh leaves the previous snapshot current.
pub struct RecordStore {
    state: Mutex<State>,
    /// Held for the duration of a fetch; serializes concurrent refreshes.
    refresh_gate: Mutex<()>,
}

#[derive(Default)]
struct State {
    current: Option<Arc<Dataset>>,
    version: u64,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore {
    pub fn new() -> Self {
        RecordStore {
            state: Mutex::new(State::default()),
            refresh_gate: Mutex::new(()),
        }
    }

    /// Fetch from `source`, validate and normalize, and install the result
    /// as the current snapshot under the next version.
    ///
    /// Fails with [`SourceUnavailable`] (transient, retryable) or
    /// [`SchemaMismatch`] (fatal for this refresh); in both cases the
    /// previous snapshot remains current and the version does not advance.
    ///
    /// [`SourceUnavailable`]: DashboardError::SourceUnavailable
    /// [`SchemaMismatch`]: DashboardError::SchemaMismatch
    pub fn refresh(&self, source: &dyn RowSource) -> Result<Arc<Dataset>, DashboardError> {
        let seen = self.version();
        let _fetching = self
            .refresh_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // Someone else completed a refresh while we waited for the gate;
        // their snapshot is our result.
        if self.version() > seen {
            return self.current();
        }

        let table = match source.fetch() {
            Ok(table) => table,
            Err(e) => {
                log::error!("refresh failed, keeping dataset v{}: {e}", self.version());
                return Err(e);
            }
        };

        let next_version = self.version() + 1;
        let dataset = match build_dataset(&table, next_version) {
            Ok(dataset) => Arc::new(dataset),
            Err(e) => {
                log::error!("refresh rejected, keeping dataset v{}: {e}", self.version());
                return Err(e);
            }
        };

        log::info!(
            "loaded dataset v{next_version}: {} records, {} skipped",
            dataset.len(),
            dataset.skipped_rows
        );

        let mut state = self.lock_state();
        state.current = Some(Arc::clone(&dataset));
        state.version = next_version;
        Ok(dataset)
    }

    /// The most recent successfully loaded snapshot.
    pub fn current(&self) -> Result<Arc<Dataset>, DashboardError> {
        self.lock_state()
            .current
            .clone()
            .ok_or(DashboardError::NoDataAvailable)
    }

    /// Version of the current snapshot; 0 before the first successful load.
    pub fn version(&self) -> u64 {
        self.lock_state().version
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
