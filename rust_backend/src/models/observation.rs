use qtty::Seconds;
use serde::{Deserialize, Serialize};

use super::fields::{count_or, is_truthy_token, optional_integer, seconds_or, RawRecord};

/// Exposure time assumed when a record does not provide one.
pub const DEFAULT_EXPTIME: Seconds = Seconds::new(120.0);

/// Exposure count assumed when a record does not provide one.
pub const DEFAULT_EXPOSURE_COUNT: u32 = 1;

/// One exposure sequence on the primary and secondary imaging channels.
///
/// Both channels expose concurrently, so the duration of an observation is
/// set by whichever channel takes longer.
///
/// # Examples
///
/// ```
/// use merit_scheduler::models::Observation;
/// use qtty::Seconds;
/// use serde_json::json;
///
/// let obs = Observation::from_record(&json!({"master_exptime": 60, "master_nexp": 3}));
/// assert_eq!(obs.estimate_duration(Seconds::new(0.0)), Seconds::new(180.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub primary_exptime: Seconds,
    pub primary_count: u32,
    pub primary_filter: Option<i64>,
    /// Whether frames should be handed to the analysis pipeline.
    ///
    /// Catalog records drive this from the `master_filter` value (a truthy
    /// string token), not from a dedicated field.
    pub analyze: bool,
    pub secondary_exptime: Seconds,
    pub secondary_count: u32,
    pub secondary_filter: Option<i64>,
}

impl Default for Observation {
    fn default() -> Self {
        Self {
            primary_exptime: DEFAULT_EXPTIME,
            primary_count: DEFAULT_EXPOSURE_COUNT,
            primary_filter: None,
            analyze: false,
            secondary_exptime: DEFAULT_EXPTIME,
            secondary_count: DEFAULT_EXPOSURE_COUNT,
            secondary_filter: None,
        }
    }
}

impl Observation {
    /// Build an observation from a raw visit entry.
    ///
    /// Never fails: every field falls back to its default when absent or
    /// malformed.
    pub fn from_record(record: &RawRecord) -> Self {
        Self {
            primary_exptime: seconds_or(record, "master_exptime", DEFAULT_EXPTIME).into_value(),
            primary_count: count_or(record, "master_nexp", DEFAULT_EXPOSURE_COUNT).into_value(),
            primary_filter: optional_integer(record, "master_filter").into_value(),
            analyze: is_truthy_token(record.get("master_filter")),
            secondary_exptime: seconds_or(record, "slave_exptime", DEFAULT_EXPTIME).into_value(),
            secondary_count: count_or(record, "slave_nexp", DEFAULT_EXPOSURE_COUNT).into_value(),
            secondary_filter: optional_integer(record, "slave_filter").into_value(),
        }
    }

    /// Estimate how long this observation takes.
    ///
    /// `overhead` is charged once per exposure on each channel; the result is
    /// the longer of the two channels.
    pub fn estimate_duration(&self, overhead: Seconds) -> Seconds {
        let primary = (self.primary_exptime + overhead) * f64::from(self.primary_count);
        let secondary = (self.secondary_exptime + overhead) * f64::from(self.secondary_count);
        let duration = if primary >= secondary { primary } else { secondary };
        log::debug!("Observation duration estimated as {} s", duration.value());
        duration
    }
}
