//! Data layer: core types, loading, and the snapshot store.
//!
//! Architecture:
//! ```text
//!  RowSource (sheet fetch / .csv / .json snapshot)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  validate header, coerce cells → Dataset
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  model    │  CellValue, Record, versioned Dataset
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  store    │  refresh lifecycle, shared Arc snapshots
//!   └──────────┘
//! ```

pub mod loader;
pub mod model;
pub mod store;
