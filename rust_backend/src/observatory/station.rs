//! Stock [`Observatory`] built from a site, an ephemeris and a horizon.

use std::fmt;

use chrono::{DateTime, Utc};
use qtty::Degrees;

use super::{Ephemeris, Horizon, HorizonProfile, HorizontalCoord, Observatory, Site};
use crate::error::SchedulerResult;
use crate::models::Target;

/// Source of the "current" instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    /// Wall-clock UTC.
    System,
    /// A fixed instant, for replaying or testing a decision.
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }
}

/// An observatory assembled from interchangeable parts.
///
/// # Examples
///
/// ```
/// use merit_scheduler::observatory::{HorizonProfile, Observatory, Site, Station, TabulatedEphemeris};
/// use qtty::Degrees;
///
/// let site = Site::new("Teide", 28.3, -16.5, 2390.0).unwrap();
/// let station = Station::new(site, TabulatedEphemeris::new())
///     .with_horizon(HorizonProfile::flat(Degrees::new(20.0)));
/// assert!(!station.is_observable(Degrees::new(10.0), Degrees::new(0.0)));
/// ```
pub struct Station {
    site: Site,
    clock: Clock,
    ephemeris: Box<dyn Ephemeris>,
    horizon: Box<dyn Horizon>,
}

impl Station {
    /// Station on `site` asking `ephemeris` for positions, with the wall
    /// clock and a geometric (0°) horizon.
    pub fn new(site: Site, ephemeris: impl Ephemeris + 'static) -> Self {
        Self {
            site,
            clock: Clock::System,
            ephemeris: Box::new(ephemeris),
            horizon: Box::new(HorizonProfile::default()),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_horizon(mut self, horizon: impl Horizon + 'static) -> Self {
        self.horizon = Box::new(horizon);
        self
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }
}

impl fmt::Debug for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Station")
            .field("site", &self.site)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl Observatory for Station {
    fn site(&self) -> &Site {
        &self.site
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn horizontal(&self, target: &Target, at: DateTime<Utc>) -> SchedulerResult<Option<HorizontalCoord>> {
        if target.position.is_none() {
            return Ok(None);
        }
        self.ephemeris.horizontal(&self.site, target, at)
    }

    fn is_observable(&self, altitude: Degrees, azimuth: Degrees) -> bool {
        self.horizon.is_observable(altitude, azimuth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observatory::{TabulatedEphemeris, TrackPoint};
    use chrono::TimeZone;
    use serde_json::json;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_fixed_clock() {
        let station = Station::new(Site::default(), TabulatedEphemeris::new()).with_clock(Clock::Fixed(at()));
        assert_eq!(station.now(), at());
        assert_eq!(station.clock(), Clock::Fixed(at()));
    }

    #[test]
    fn test_delegates_to_ephemeris() {
        let ephemeris = TabulatedEphemeris::new()
            .with_track("Vega", vec![TrackPoint::new(60370.0, 60.0, 10.0)])
            .unwrap();
        let station = Station::new(Site::default(), ephemeris)
            .with_clock(Clock::Fixed(at()))
            .with_horizon(HorizonProfile::flat(Degrees::new(30.0)));
        let target = Target::from_record(&json!({
            "name": "Vega",
            "position": "279.23 38.78",
            "visit": [{}]
        }))
        .unwrap();
        let coord = station.horizontal(&target, station.now()).unwrap().unwrap();
        assert_eq!(coord.altitude, Degrees::new(60.0));
        assert!(station.is_observable(coord.altitude, coord.azimuth));
    }

    #[test]
    fn test_target_without_position_is_unresolved() {
        let ephemeris = TabulatedEphemeris::new()
            .with_track("nowhere", vec![TrackPoint::new(60370.0, 60.0, 10.0)])
            .unwrap();
        let station = Station::new(Site::default(), ephemeris).with_clock(Clock::Fixed(at()));
        let target = Target::from_record(&json!({"name": "nowhere", "visit": [{}]})).unwrap();
        assert!(station.horizontal(&target, station.now()).unwrap().is_none());
    }
}
