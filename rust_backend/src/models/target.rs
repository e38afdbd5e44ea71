use qtty::Seconds;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::fields::{float_or, RawRecord};
use super::observation::Observation;
use super::position::{Position, ProperMotion};
use crate::error::{SchedulerError, SchedulerResult};

/// Priority assumed when a record does not provide one.
pub const DEFAULT_PRIORITY: f64 = 1.0;

/// A candidate the scheduler may choose to observe.
///
/// A target owns its visit: the ordered list of observations executed when it
/// is selected. Targets are built once per catalog load and never mutated by
/// scheduling.
///
/// # Examples
///
/// ```
/// use merit_scheduler::models::Target;
/// use qtty::Seconds;
/// use serde_json::json;
///
/// let target = Target::from_record(&json!({
///     "name": "M42",
///     "priority": 2,
///     "position": "05:35:17 -05:23:28",
///     "visit": [{"master_exptime": 60}, {"master_exptime": 30, "slave_exptime": 30}]
/// }))
/// .unwrap();
///
/// assert_eq!(target.priority, 2.0);
/// assert_eq!(target.estimate_visit_duration(Seconds::new(0.0)), Seconds::new(150.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    /// Multiplier applied to the weighted merit sum. Expected to be positive.
    pub priority: f64,
    /// `None` when the record's coordinates could not be parsed.
    pub position: Option<Position>,
    pub proper_motion: ProperMotion,
    pub visit: Vec<Observation>,
}

impl Target {
    /// Build a target from a raw catalog record.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::Validation`] when `name` is missing, not a string or
    /// empty, or when `visit` is missing, not a sequence of mappings, or empty.
    /// Every other field falls back to its default.
    pub fn from_record(record: &RawRecord) -> SchedulerResult<Self> {
        let name = match record.get("name") {
            Some(Value::String(name)) if !name.trim().is_empty() => name.clone(),
            Some(Value::String(_)) => {
                return Err(SchedulerError::Validation(
                    "target 'name' must not be empty".to_string(),
                ))
            }
            Some(other) => {
                return Err(SchedulerError::Validation(format!(
                    "target 'name' must be a string, found {}",
                    json_type_name(other)
                )))
            }
            None => {
                return Err(SchedulerError::Validation(
                    "target record is missing 'name'".to_string(),
                ))
            }
        };

        let entries = match record.get("visit") {
            Some(Value::Array(entries)) if !entries.is_empty() => entries,
            Some(Value::Array(_)) => {
                return Err(SchedulerError::Validation(format!(
                    "target '{}' has an empty 'visit'",
                    name
                )))
            }
            Some(other) => {
                return Err(SchedulerError::Validation(format!(
                    "target '{}': 'visit' must be a sequence, found {}",
                    name,
                    json_type_name(other)
                )))
            }
            None => {
                return Err(SchedulerError::Validation(format!(
                    "target '{}' is missing 'visit'",
                    name
                )))
            }
        };

        let visit = entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                if entry.is_object() {
                    Ok(Observation::from_record(entry))
                } else {
                    Err(SchedulerError::Validation(format!(
                        "target '{}': visit entry {} must be a mapping, found {}",
                        name,
                        idx,
                        json_type_name(entry)
                    )))
                }
            })
            .collect::<SchedulerResult<Vec<_>>>()?;

        let position = Position::from_record(record);
        if position.is_none() {
            log::debug!("Target '{}' has no usable position", name);
        }

        Ok(Self {
            priority: float_or(record, "priority", DEFAULT_PRIORITY).into_value(),
            position,
            proper_motion: ProperMotion::from_record(record).into_value(),
            visit,
            name,
        })
    }

    /// Estimate the duration of the whole visit.
    ///
    /// Each observation contributes its own estimate (which already charges
    /// `overhead` per exposure) plus `overhead` once more for the observation
    /// itself.
    pub fn estimate_visit_duration(&self, overhead: Seconds) -> Seconds {
        let duration = self
            .visit
            .iter()
            .fold(Seconds::new(0.0), |total, obs| {
                total + obs.estimate_duration(overhead) + overhead
            });
        log::debug!(
            "Visit duration for '{}' estimated as {} s",
            self.name,
            duration.value()
        );
        duration
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
