use chrono::{DateTime, TimeZone, Utc};

/// MJD epoch (1858-11-17 00:00:00 UTC) as Unix timestamp
const MJD_EPOCH_UNIX: i64 = -3506716800;

const SECONDS_PER_DAY: f64 = 86400.0;

/// Convert a UTC instant to Modified Julian Date.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use merit_scheduler::time::datetime_to_mjd;
///
/// let dt = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
/// assert_eq!(datetime_to_mjd(&dt), 59580.0);
/// ```
pub fn datetime_to_mjd(dt: &DateTime<Utc>) -> f64 {
    let seconds = (dt.timestamp() - MJD_EPOCH_UNIX) as f64
        + f64::from(dt.timestamp_subsec_nanos()) * 1e-9;
    seconds / SECONDS_PER_DAY
}

/// Convert a Modified Julian Date to a UTC instant.
///
/// Returns `None` if the value is outside chrono's representable range.
pub fn mjd_to_datetime(mjd: f64) -> Option<DateTime<Utc>> {
    if !mjd.is_finite() {
        return None;
    }
    let seconds = mjd * SECONDS_PER_DAY;
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round() as u32;
    let secs = whole as i64 + MJD_EPOCH_UNIX;
    Utc.timestamp_opt(secs, nanos.min(999_999_999)).single()
}
