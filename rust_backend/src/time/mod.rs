//! Time conversions and sampling used by the merit functions.

pub mod mjd;
pub mod sampling;

pub use mjd::{datetime_to_mjd, mjd_to_datetime};
pub use sampling::{sample_instants, DEFAULT_TIME_STEP, MAX_SAMPLES};
