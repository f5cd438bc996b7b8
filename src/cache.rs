use std::collections::{BTreeMap, HashMap};

use crate::filter::{FilterSpec, FilteredView};
use crate::metrics::{self, Metric};
use crate::schema::Dimension;

// ---------------------------------------------------------------------------
// MetricsCache – avoid recomputation across reruns of the same view
// ---------------------------------------------------------------------------

/// Memoizes [`metrics::compute`] results for one dataset version.
///
/// Keys are (filter selection, dimension); the dataset version is tracked
/// on the side, and all entries are dropped wholesale the moment a view
/// from a different version shows up. Metrics are pure over their inputs,
/// so a hit is exactly the value a recomputation would produce.
#[derive(Default)]
pub struct MetricsCache {
    version: u64,
    entries: HashMap<(FilterSpec, Dimension), BTreeMap<String, Metric>>,
}

impl MetricsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached metrics for (`view`, `dimension`), computing on a miss.
    ///
    /// `spec` must be the selection that produced `view`; it is the cache
    /// key standing in for the view's record subset.
    pub fn get_or_compute(
        &mut self,
        view: &FilteredView,
        spec: &FilterSpec,
        dimension: Dimension,
    ) -> &BTreeMap<String, Metric> {
        if view.dataset_version() != self.version {
            self.entries.clear();
            self.version = view.dataset_version();
        }
        self.entries
            .entry((spec.clone(), dimension))
            .or_insert_with(|| metrics::compute(view, dimension))
    }

    /// Number of cached (filter, dimension) results.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
