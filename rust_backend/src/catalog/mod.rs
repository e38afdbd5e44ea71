//! Candidate catalog sources and target-list construction.
//!
//! The scheduler does not care where raw target records come from. A
//! [`CatalogSource`] hands over an ordered sequence of raw records and a
//! checksum of the content it read; [`load_targets`] turns those into
//! [`Target`](crate::models::Target)s under a [`LoadPolicy`].
//!
//! # Example
//!
//! ```
//! use merit_scheduler::catalog::{load_targets, InMemoryCatalog, LoadPolicy};
//! use serde_json::json;
//!
//! let source = InMemoryCatalog::new(vec![
//!     json!({"name": "A", "visit": [{"master_exptime": 60}]}),
//!     json!({"visit": [{}]}),
//! ]);
//! let loaded = load_targets(&source, LoadPolicy::SkipInvalid).unwrap();
//! assert_eq!(loaded.targets.len(), 1);
//! assert_eq!(loaded.report.rejected.len(), 1);
//! ```

pub mod checksum;
pub mod loader;
pub mod sources;


use crate::error::SchedulerResult;
use crate::models::RawRecord;

pub use checksum::calculate_checksum;
pub use loader::{load_targets, LoadPolicy, LoadReport, LoadedCatalog, RejectedRecord};
pub use sources::{CatalogFormat, FileCatalog, InMemoryCatalog};

/// Raw content read from a catalog source.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogContent {
    pub records: Vec<RawRecord>,
    /// SHA-256 of the content the records were decoded from.
    pub checksum: String,
}

/// Where candidate records come from.
pub trait CatalogSource: Send + Sync {
    /// Human-readable description used in logs and reports.
    fn describe(&self) -> String;

    /// Read the full, ordered sequence of raw records.
    ///
    /// Fails with [`SchedulerError::Catalog`](crate::error::SchedulerError::Catalog)
    /// when the source cannot be read or decoded.
    fn read(&self) -> SchedulerResult<CatalogContent>;
}
