//! Horizontal positions supplied by an external ephemeris.
//!
//! Celestial mechanics live outside this crate. An [`Ephemeris`] answers
//! "where is this target in the local sky at this instant"; the stock
//! [`TabulatedEphemeris`] replays tracks that an ephemeris service computed
//! ahead of time for the site.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use qtty::Degrees;
use serde::{Deserialize, Serialize};

use super::{HorizontalCoord, Site};
use crate::error::{SchedulerError, SchedulerResult};
use crate::models::Target;
use crate::time::{datetime_to_mjd, mjd_to_datetime};

/// Computes where a target sits in the local sky.
pub trait Ephemeris: Send + Sync {
    /// Horizontal position of `target` seen from `site` at `at`.
    ///
    /// `Ok(None)` when this ephemeris has no position for the target at that
    /// instant.
    fn horizontal(
        &self,
        site: &Site,
        target: &Target,
        at: DateTime<Utc>,
    ) -> SchedulerResult<Option<HorizontalCoord>>;
}

/// One precomputed horizontal position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    /// Modified Julian Date (UTC)
    pub mjd: f64,
    /// Altitude in degrees
    pub altitude: f64,
    /// Azimuth in degrees, north through east
    pub azimuth: f64,
}

impl TrackPoint {
    pub fn new(mjd: f64, altitude: f64, azimuth: f64) -> Self {
        Self {
            mjd,
            altitude,
            azimuth,
        }
    }
}

/// Ephemeris replaying precomputed horizontal tracks, keyed by target name.
///
/// Between two points the altitude is interpolated linearly and the azimuth
/// along the shorter arc. Outside a track's span, and for targets without a
/// track, the position is unresolved.
///
/// Track files are JSON or YAML mappings from target name to a list of
/// `{mjd, altitude, azimuth}` points:
///
/// ```yaml
/// M42:
///   - { mjd: 60370.90, altitude: 41.2, azimuth: 201.5 }
///   - { mjd: 60370.95, altitude: 33.0, azimuth: 222.8 }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabulatedEphemeris {
    tracks: HashMap<String, Vec<TrackPoint>>,
}

impl TabulatedEphemeris {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the track of `name`. Points may come in any order.
    pub fn insert(&mut self, name: impl Into<String>, mut points: Vec<TrackPoint>) -> SchedulerResult<()> {
        let name = name.into();
        if points.is_empty() {
            return Err(SchedulerError::Ephemeris(format!("Track for '{}' is empty", name)));
        }
        for point in &points {
            let valid = point.mjd.is_finite()
                && point.azimuth.is_finite()
                && (-90.0..=90.0).contains(&point.altitude);
            if !valid {
                return Err(SchedulerError::Ephemeris(format!(
                    "Track for '{}' has an invalid point: mjd {}, altitude {}, azimuth {}",
                    name, point.mjd, point.altitude, point.azimuth
                )));
            }
        }
        points.sort_by(|a, b| a.mjd.total_cmp(&b.mjd));
        self.tracks.insert(name, points);
        Ok(())
    }

    pub fn with_track(mut self, name: impl Into<String>, points: Vec<TrackPoint>) -> SchedulerResult<Self> {
        self.insert(name, points)?;
        Ok(self)
    }

    /// Load tracks from a `.json`, `.yaml` or `.yml` file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SchedulerResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SchedulerError::Ephemeris(format!("Failed to read track file {}: {}", path.display(), e))
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        let tracks: HashMap<String, Vec<TrackPoint>> = match extension.as_str() {
            "json" => serde_json::from_str(&content)
                .map_err(|e| SchedulerError::Ephemeris(format!("Invalid JSON track file: {}", e)))?,
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .map_err(|e| SchedulerError::Ephemeris(format!("Invalid YAML track file: {}", e)))?,
            other => {
                return Err(SchedulerError::Ephemeris(format!(
                    "Unsupported track file format: '{}'",
                    other
                )))
            }
        };

        let mut ephemeris = Self::new();
        for (name, points) in tracks {
            ephemeris.insert(name, points)?;
        }
        log::debug!("Loaded {} tracks from {}", ephemeris.len(), path.display());
        Ok(ephemeris)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// First and last instant covered by the track of `name`.
    pub fn coverage(&self, name: &str) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let points = self.tracks.get(name)?;
        let first = mjd_to_datetime(points.first()?.mjd)?;
        let last = mjd_to_datetime(points.last()?.mjd)?;
        Some((first, last))
    }

    fn interpolate(points: &[TrackPoint], mjd: f64) -> Option<HorizontalCoord> {
        let first = points.first()?;
        let last = points.last()?;
        if mjd < first.mjd || mjd > last.mjd {
            return None;
        }

        // At least one point lies at or before `mjd`.
        let after_index = points.partition_point(|p| p.mjd <= mjd);
        let before = points.get(after_index.checked_sub(1)?)?;
        let Some(after) = points.get(after_index) else {
            return Some(HorizontalCoord::new(
                Degrees::new(before.altitude),
                Degrees::new(before.azimuth).wrap_pos(),
            ));
        };

        let fraction = (mjd - before.mjd) / (after.mjd - before.mjd);
        let altitude = before.altitude + fraction * (after.altitude - before.altitude);
        let mut swing = (after.azimuth - before.azimuth).rem_euclid(360.0);
        if swing > 180.0 {
            swing -= 360.0;
        }
        let azimuth = Degrees::new(before.azimuth + fraction * swing).wrap_pos();
        Some(HorizontalCoord::new(Degrees::new(altitude), azimuth))
    }
}

impl Ephemeris for TabulatedEphemeris {
    fn horizontal(
        &self,
        _site: &Site,
        target: &Target,
        at: DateTime<Utc>,
    ) -> SchedulerResult<Option<HorizontalCoord>> {
        let Some(points) = self.tracks.get(&target.name) else {
            log::debug!("No track for target '{}'", target.name);
            return Ok(None);
        };

        let coord = Self::interpolate(points, datetime_to_mjd(&at));
        if coord.is_none() {
            log::debug!("{} is outside the track of '{}'", at, target.name);
        }
        Ok(coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;
    use std::io::Write;

    // 2024-03-01T00:00:00Z
    const MJD0: f64 = 60370.0;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    fn target(name: &str) -> Target {
        Target::from_record(&json!({"name": name, "position": "10.0 20.0", "visit": [{}]})).unwrap()
    }

    fn setting_track() -> Vec<TrackPoint> {
        vec![
            TrackPoint::new(MJD0 + 0.5, 10.0, 250.0),
            TrackPoint::new(MJD0, 50.0, 200.0),
        ]
    }

    #[test]
    fn test_interpolates_between_points() {
        let ephemeris = TabulatedEphemeris::new().with_track("A", setting_track()).unwrap();
        let coord = ephemeris
            .horizontal(&Site::default(), &target("A"), start() + Duration::hours(3))
            .unwrap()
            .unwrap();
        assert!((coord.altitude.value() - 40.0).abs() < 1e-6);
        assert!((coord.azimuth.value() - 212.5).abs() < 1e-6);
    }

    #[test]
    fn test_exact_endpoints_are_covered() {
        let ephemeris = TabulatedEphemeris::new().with_track("A", setting_track()).unwrap();
        let site = Site::default();
        let first = ephemeris.horizontal(&site, &target("A"), start()).unwrap().unwrap();
        let last = ephemeris
            .horizontal(&site, &target("A"), start() + Duration::hours(12))
            .unwrap()
            .unwrap();
        assert_eq!(first.altitude, Degrees::new(50.0));
        assert_eq!(last.altitude, Degrees::new(10.0));
    }

    #[test]
    fn test_azimuth_takes_the_short_way_through_north() {
        let ephemeris = TabulatedEphemeris::new()
            .with_track(
                "circumpolar",
                vec![TrackPoint::new(MJD0, 30.0, 350.0), TrackPoint::new(MJD0 + 0.5, 30.0, 20.0)],
            )
            .unwrap();
        let at = start() + Duration::hours(4);
        let coord = ephemeris
            .horizontal(&Site::default(), &target("circumpolar"), at)
            .unwrap()
            .unwrap();
        // A third of the 30° swing from 350° through north.
        assert!((coord.azimuth.value() - 0.0).abs() < 1e-6 || (coord.azimuth.value() - 360.0).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_target_or_instant_is_unresolved() {
        let ephemeris = TabulatedEphemeris::new().with_track("A", setting_track()).unwrap();
        let site = Site::default();
        assert!(ephemeris.horizontal(&site, &target("B"), start()).unwrap().is_none());
        assert!(ephemeris
            .horizontal(&site, &target("A"), start() - Duration::seconds(1))
            .unwrap()
            .is_none());
        assert!(ephemeris
            .horizontal(&site, &target("A"), start() + Duration::hours(13))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_invalid_tracks_are_rejected() {
        let mut ephemeris = TabulatedEphemeris::new();
        assert!(matches!(ephemeris.insert("empty", vec![]), Err(SchedulerError::Ephemeris(_))));
        assert!(ephemeris.insert("low", vec![TrackPoint::new(MJD0, -91.0, 0.0)]).is_err());
        assert!(ephemeris.insert("nan", vec![TrackPoint::new(f64::NAN, 10.0, 0.0)]).is_err());
        assert!(ephemeris.is_empty());
    }

    #[test]
    fn test_coverage_reports_track_span() {
        let ephemeris = TabulatedEphemeris::new().with_track("A", setting_track()).unwrap();
        let (first, last) = ephemeris.coverage("A").unwrap();
        assert_eq!(first, start());
        assert_eq!(last, start() + Duration::hours(12));
        assert!(ephemeris.coverage("B").is_none());
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(
            b"M42:\n  - {mjd: 60370.0, altitude: 45.0, azimuth: 180.0}\n  - {mjd: 60370.5, altitude: 5.0, azimuth: 240.0}\nM31:\n  - {mjd: 60370.0, altitude: 20.0, azimuth: 300.0}\n",
        )
        .unwrap();

        let ephemeris = TabulatedEphemeris::from_file(file.path()).unwrap();
        assert_eq!(ephemeris.len(), 2);
        let coord = ephemeris
            .horizontal(&Site::default(), &target("M42"), start() + Duration::hours(6))
            .unwrap()
            .unwrap();
        assert!((coord.altitude.value() - 25.0).abs() < 1e-6);
    }

    #[test]
    fn test_from_file_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        let err = TabulatedEphemeris::from_file(file.path()).unwrap_err();
        assert!(matches!(err, SchedulerError::Ephemeris(_)));
    }
}
