//! Turn raw catalog records into validated targets.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::CatalogSource;
use crate::error::{SchedulerError, SchedulerResult};
use crate::models::Target;

/// What to do with a record that fails validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// Log the failure, record it in the [`LoadReport`] and keep going.
    #[default]
    SkipInvalid,
    /// Abort the load on the first invalid record.
    Strict,
}

/// A record left out of the candidate list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRecord {
    /// Position of the record in the source.
    pub index: usize,
    /// The record's `name`, when it had a readable one.
    pub name: Option<String>,
    pub reason: String,
}

/// Summary of one catalog load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadReport {
    pub source: String,
    pub checksum: String,
    pub total_records: usize,
    pub loaded: usize,
    pub rejected: Vec<RejectedRecord>,
}

impl LoadReport {
    /// `true` when every record became a target.
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Targets built from a source, in source order, with the load summary.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedCatalog {
    pub targets: Vec<Target>,
    pub report: LoadReport,
}

/// Read `source` and build one [`Target`] per valid record.
///
/// Source order is preserved. Under [`LoadPolicy::SkipInvalid`] invalid
/// records are dropped with a warning; under [`LoadPolicy::Strict`] the first
/// one aborts the load.
///
/// # Errors
///
/// [`SchedulerError::Catalog`] when the source cannot be read, and
/// [`SchedulerError::Validation`] for an invalid record under the strict policy.
pub fn load_targets(
    source: &dyn CatalogSource,
    policy: LoadPolicy,
) -> SchedulerResult<LoadedCatalog> {
    let description = source.describe();
    let content = source.read()?;
    let total_records = content.records.len();

    let mut targets = Vec::with_capacity(total_records);
    let mut rejected = Vec::new();

    for (index, record) in content.records.iter().enumerate() {
        match Target::from_record(record) {
            Ok(target) => targets.push(target),
            Err(err) => {
                let reason = match &err {
                    SchedulerError::Validation(msg) => msg.clone(),
                    other => other.to_string(),
                };
                if policy == LoadPolicy::Strict {
                    return Err(SchedulerError::Validation(format!(
                        "record {} of {}: {}",
                        index, description, reason
                    )));
                }
                log::warn!(
                    "Skipping record {} of {}: {}",
                    index,
                    description,
                    reason
                );
                rejected.push(RejectedRecord {
                    index,
                    name: record_name(record),
                    reason,
                });
            }
        }
    }

    log::info!(
        "Loaded {} of {} targets from {} (checksum {})",
        targets.len(),
        total_records,
        description,
        short_checksum(&content.checksum)
    );

    let report = LoadReport {
        source: description,
        checksum: content.checksum,
        total_records,
        loaded: targets.len(),
        rejected,
    };

    Ok(LoadedCatalog { targets, report })
}

/// Leading twelve characters of a checksum, for log lines.
pub(crate) fn short_checksum(checksum: &str) -> &str {
    match checksum.char_indices().nth(12) {
        Some((end, _)) => &checksum[..end],
        None => checksum,
    }
}

fn record_name(record: &Value) -> Option<String> {
    record
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.trim().is_empty())
        .map(str::to_string)
}
