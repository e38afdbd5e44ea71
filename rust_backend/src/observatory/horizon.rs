//! Horizon profiles describing which parts of the sky are unobstructed.

use qtty::Degrees;
use serde::{Deserialize, Serialize};

use crate::error::{SchedulerError, SchedulerResult};

/// Horizon test used by an observatory.
pub trait Horizon: Send + Sync {
    fn is_observable(&self, altitude: Degrees, azimuth: Degrees) -> bool;
}

/// Piecewise-linear horizon: a minimum altitude per azimuth.
///
/// `points` are `(azimuth, minimum altitude)` pairs in degrees; the profile is
/// interpolated linearly between neighbouring points and wraps around north.
/// `min_altitude` is a floor applied everywhere.
///
/// # Examples
///
/// ```
/// use merit_scheduler::observatory::{Horizon, HorizonProfile};
/// use qtty::Degrees;
///
/// let horizon = HorizonProfile::new(Degrees::new(10.0), vec![(0.0, 10.0), (180.0, 40.0)]).unwrap();
/// assert!(horizon.is_observable(Degrees::new(30.0), Degrees::new(45.0)));
/// assert!(!horizon.is_observable(Degrees::new(30.0), Degrees::new(180.0)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonProfile {
    min_altitude: f64,
    points: Vec<(f64, f64)>,
}

impl Default for HorizonProfile {
    fn default() -> Self {
        Self {
            min_altitude: 0.0,
            points: Vec::new(),
        }
    }
}

impl HorizonProfile {
    /// Build a profile, normalising azimuths into `[0, 360)` and sorting them.
    pub fn new(min_altitude: Degrees, points: Vec<(f64, f64)>) -> SchedulerResult<Self> {
        if !min_altitude.value().is_finite() {
            return Err(SchedulerError::Configuration(
                "horizon minimum altitude must be finite".to_string(),
            ));
        }
        let mut normalized = points
            .into_iter()
            .map(|(az, alt)| {
                if az.is_finite() && alt.is_finite() {
                    Ok((az.rem_euclid(360.0), alt))
                } else {
                    Err(SchedulerError::Configuration(format!(
                        "horizon point ({}, {}) is not finite",
                        az, alt
                    )))
                }
            })
            .collect::<SchedulerResult<Vec<_>>>()?;
        normalized.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(Self {
            min_altitude: min_altitude.value(),
            points: normalized,
        })
    }

    /// Flat horizon at `min_altitude`.
    pub fn flat(min_altitude: Degrees) -> Self {
        Self {
            min_altitude: min_altitude.value(),
            points: Vec::new(),
        }
    }

    /// Minimum observable altitude at `azimuth`.
    pub fn limit_at(&self, azimuth: Degrees) -> Degrees {
        let az = azimuth.value().rem_euclid(360.0);
        let profile = match self.points.as_slice() {
            [] => None,
            [(_, alt)] => Some(*alt),
            points => {
                let upper = points.iter().position(|(p_az, _)| *p_az >= az);
                let (lo, hi) = match upper {
                    Some(0) | None => (points[points.len() - 1], points[0]),
                    Some(i) => (points[i - 1], points[i]),
                };
                let span = (hi.0 - lo.0).rem_euclid(360.0);
                let offset = (az - lo.0).rem_euclid(360.0);
                if span == 0.0 {
                    Some(lo.1.max(hi.1))
                } else {
                    Some(lo.1 + (hi.1 - lo.1) * offset / span)
                }
            }
        };

        Degrees::new(profile.map_or(self.min_altitude, |alt| alt.max(self.min_altitude)))
    }
}

impl Horizon for HorizonProfile {
    fn is_observable(&self, altitude: Degrees, azimuth: Degrees) -> bool {
        let alt = altitude.value();
        alt.is_finite() && alt <= 90.0 && altitude >= self.limit_at(azimuth)
    }
}
