//! Observatory collaborators consumed by the merit functions.
//!
//! The scheduler never computes celestial mechanics itself. It asks an
//! [`Observatory`] for the current instant, for the horizontal position of a
//! target at a given instant, and whether a horizontal position is clear of
//! the site's obstructions.
//!
//! [`Station`] is the stock implementation, composed of a [`Site`], an
//! [`Ephemeris`] and a [`Horizon`]; tests and integrations can implement
//! [`Observatory`] directly. Positions come from an external ephemeris,
//! either through a custom [`Ephemeris`] or as precomputed tracks replayed by
//! [`TabulatedEphemeris`].

pub mod ephemeris;
pub mod horizon;
pub mod station;

use chrono::{DateTime, Utc};
use qtty::Degrees;
use serde::{Deserialize, Serialize};

use crate::error::{SchedulerError, SchedulerResult};
use crate::models::Target;

pub use ephemeris::{Ephemeris, TabulatedEphemeris, TrackPoint};
pub use horizon::{Horizon, HorizonProfile};
pub use station::{Clock, Station};

/// Geographic location of the observatory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    #[serde(default)]
    pub name: String,
    /// Latitude in decimal degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in decimal degrees, east positive (-180 to 180)
    pub longitude: f64,
    /// Elevation in meters above sea level
    #[serde(default)]
    pub elevation_m: f64,
}

impl Site {
    pub fn new(name: &str, latitude: f64, longitude: f64, elevation_m: f64) -> SchedulerResult<Self> {
        let site = Self {
            name: name.to_string(),
            latitude,
            longitude,
            elevation_m,
        };
        site.validate()?;
        Ok(site)
    }

    pub fn validate(&self) -> SchedulerResult<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(SchedulerError::Configuration(
                "Latitude must be between -90 and 90 degrees".to_string(),
            ));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(SchedulerError::Configuration(
                "Longitude must be between -180 and 180 degrees".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Site {
    fn default() -> Self {
        Self {
            name: String::new(),
            latitude: 0.0,
            longitude: 0.0,
            elevation_m: 0.0,
        }
    }
}

/// Local horizontal coordinates of a target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizontalCoord {
    pub altitude: Degrees,
    /// Azimuth measured from north through east, in `[0, 360)`.
    pub azimuth: Degrees,
}

impl HorizontalCoord {
    pub fn new(altitude: Degrees, azimuth: Degrees) -> Self {
        Self { altitude, azimuth }
    }
}

/// Time, ephemeris and horizon context for one scheduling decision.
pub trait Observatory: Send + Sync {
    /// Site the observatory stands on.
    fn site(&self) -> &Site;

    /// Instant a scheduling decision is made for.
    fn now(&self) -> DateTime<Utc>;

    /// Horizontal position of `target` at `at`.
    ///
    /// `Ok(None)` means the target's position cannot be resolved (for example
    /// a catalog entry without usable coordinates).
    fn horizontal(&self, target: &Target, at: DateTime<Utc>) -> SchedulerResult<Option<HorizontalCoord>>;

    /// Whether `altitude`/`azimuth` is in the unobstructed sky.
    fn is_observable(&self, altitude: Degrees, azimuth: Degrees) -> bool;
}
