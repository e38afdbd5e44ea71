//! Fixed-cadence sampling of a time window.

use chrono::{DateTime, Duration, Utc};
use qtty::Seconds;

/// Cadence at which a visit window is sampled.
pub const DEFAULT_TIME_STEP: Seconds = Seconds::new(30.0);

/// Most instants a single window is sampled at.
pub const MAX_SAMPLES: u64 = 10_000;

/// Instants at which a window of length `duration` starting at `start` is
/// checked.
///
/// Offsets are `0, step, 2·step, …` while `offset < floor(duration) + step`,
/// so the window's start is always sampled and the last sample lies at or
/// past its end. A non-positive or non-finite `step` yields only `start`.
///
/// Returns `None` when the window needs more than [`MAX_SAMPLES`] instants,
/// has a non-finite length, or runs past the representable date range.
///
/// # Example
/// ```
/// use chrono::Utc;
/// use merit_scheduler::time::sample_instants;
/// use qtty::Seconds;
///
/// let start = Utc::now();
/// let samples = sample_instants(start, Seconds::new(125.0), Seconds::new(30.0)).unwrap();
/// assert_eq!(samples.len(), 6); // 0, 30, 60, 90, 120, 150
/// assert_eq!(samples[0], start);
/// ```
pub fn sample_instants(
    start: DateTime<Utc>,
    duration: Seconds,
    step: Seconds,
) -> Option<Vec<DateTime<Utc>>> {
    let step = step.value();
    let span = duration.value().max(0.0).floor();
    if !span.is_finite() {
        return None;
    }

    let count = if step.is_finite() && step > 0.0 {
        ((span + step) / step).ceil()
    } else {
        1.0
    };
    if count > MAX_SAMPLES as f64 {
        return None;
    }

    (0..count as u64)
        .map(|k| {
            let offset_ms = (k as f64 * step * 1000.0).round() as i64;
            Duration::try_milliseconds(offset_ms).and_then(|offset| start.checked_add_signed(offset))
        })
        .collect()
}
