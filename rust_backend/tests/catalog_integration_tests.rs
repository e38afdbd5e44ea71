//! Scheduling from catalog, track and configuration files with the stock
//! observatory.

mod support;

use std::fs;

use chrono::{DateTime, TimeZone, Utc};
use merit_scheduler::observatory::{Clock, Site, Station, TabulatedEphemeris, TrackPoint};
use merit_scheduler::{FileCatalog, LoadPolicy, Scheduler, SchedulerConfig, SchedulerError, Weights};

const CATALOG_YAML: &str = r#"
- name: circumpolar
  priority: 1
  position: "06:00:00 +60:00:00"
  visit:
    - master_exptime: 300
      master_nexp: 2
- name: southern
  priority: 5
  position: "06:00:00 -30:00:00"
  visit:
    - master_exptime: 60
- name: broken
  visit: []
- name: no_position
  priority: 10
  visit:
    - {}
"#;

// Tracks around 2024-12-01T00:00:00Z (MJD 60645).
const TRACKS_YAML: &str = r#"
circumpolar:
  - {mjd: 60644.9, altitude: 60.0, azimuth: 0.0}
  - {mjd: 60645.1, altitude: 60.0, azimuth: 0.0}
southern:
  - {mjd: 60644.9, altitude: -30.0, azimuth: 180.0}
  - {mjd: 60645.1, altitude: -30.0, azimuth: 180.0}
no_position:
  - {mjd: 60644.9, altitude: 80.0, azimuth: 90.0}
  - {mjd: 60645.1, altitude: 80.0, azimuth: 90.0}
"#;

fn at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap()
}

fn write_tracks(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("tracks.yaml");
    fs::write(&path, TRACKS_YAML).unwrap();
    path
}

fn write_catalog(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("targets.yaml");
    fs::write(&path, CATALOG_YAML).unwrap();
    path
}

#[test]
fn test_yaml_catalog_with_tracked_station() {
    let dir = tempfile::tempdir().unwrap();
    let scheduler = Scheduler::new(FileCatalog::new(write_catalog(&dir)));

    let report = scheduler.reload().unwrap();
    assert_eq!(report.total_records, 4);
    assert_eq!(report.loaded, 3);
    assert_eq!(report.rejected[0].name.as_deref(), Some("broken"));

    let ephemeris = TabulatedEphemeris::from_file(write_tracks(&dir)).unwrap();
    let station = Station::new(Site::default(), ephemeris).with_clock(Clock::Fixed(at()));

    // "no_position" has a track but no catalog position, so it is vetoed.
    let selection = scheduler
        .get_target(&station, &Weights::default())
        .unwrap()
        .unwrap();
    assert_eq!(selection.target.name, "circumpolar");
    assert_eq!(selection.score, 1.0);
}

#[test]
fn test_track_ending_mid_visit_vetoes_target() {
    let dir = tempfile::tempdir().unwrap();
    let scheduler = Scheduler::new(FileCatalog::new(write_catalog(&dir)));

    // Covers under three minutes of a ten-minute visit.
    let ephemeris = TabulatedEphemeris::new()
        .with_track(
            "circumpolar",
            vec![TrackPoint::new(60644.9, 60.0, 0.0), TrackPoint::new(60645.002, 60.0, 0.0)],
        )
        .unwrap();
    let station = Station::new(Site::default(), ephemeris).with_clock(Clock::Fixed(at()));

    let selection = scheduler.get_target(&station, &Weights::default()).unwrap();
    assert!(selection.is_none());
}

#[test]
fn test_strict_policy_rejects_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let scheduler =
        Scheduler::new(FileCatalog::new(write_catalog(&dir))).with_policy(LoadPolicy::Strict);

    let err = scheduler.reload().unwrap_err();
    assert!(matches!(err, SchedulerError::Validation(_)));
    assert!(scheduler.candidates().is_empty());
}

#[test]
fn test_config_file_drives_scheduler() {
    let dir = tempfile::tempdir().unwrap();
    write_catalog(&dir);
    let config_path = dir.path().join("scheduler.toml");
    fs::write(
        &config_path,
        r#"
[catalog]
path = "targets.yaml"

[scheduler]
time_step_sec = 60.0

[site]
name = "Roque de los Muchachos"
latitude = 28.7624
longitude = -17.8892

[horizon]
min_altitude_deg = 70.0

[ephemeris]
tracks = "tracks.yaml"
"#,
    )
    .unwrap();
    write_tracks(&dir);

    let config = SchedulerConfig::from_file(&config_path).unwrap();
    let station = config.station(Clock::Fixed(at())).unwrap();
    let scheduler = config.build_scheduler();

    // The 70° horizon hides the 60° target as well.
    let selection = scheduler
        .get_target(&station, &config.scheduling_weights())
        .unwrap();
    assert!(selection.is_none());
    assert_eq!(scheduler.last_report().unwrap().loaded, 3);
}

#[test]
fn test_missing_catalog_file_is_catalog_error() {
    let scheduler = Scheduler::new(FileCatalog::new("/nonexistent/targets.yaml"));
    let station = Station::new(Site::default(), TabulatedEphemeris::new());
    let err = scheduler
        .get_target(&station, &Weights::default())
        .unwrap_err();
    assert!(matches!(err, SchedulerError::Catalog(_)));
}
