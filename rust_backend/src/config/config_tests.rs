#[cfg(test)]
mod tests {
    use crate::catalog::LoadPolicy;
    use crate::config::{EphemerisSettings, SchedulerConfig, MAX_TIME_STEP_SEC};
    use crate::error::SchedulerError;
    use crate::models::Target;
    use crate::observatory::{Clock, Observatory, TabulatedEphemeris};
    use chrono::{TimeZone, Utc};
    use qtty::{Degrees, Seconds};
    use serde_json::json;
    use std::io::Write;
    use std::path::Path;

    const FULL: &str = r#"
[catalog]
path = "targets.yaml"
policy = "strict"

[scheduler]
overhead_sec = 5.0
time_step_sec = 10.0

[weights]
observability = 2.0

[site]
name = "Mauna Loa"
latitude = 19.54
longitude = -155.58
elevation_m = 3400.0

[horizon]
min_altitude_deg = 20.0
points = [[0.0, 25.0], [90.0, 30.0]]
"#;

    #[test]
    fn test_parse_full_config() {
        let config: SchedulerConfig = FULL.parse().unwrap();
        assert_eq!(config.catalog.path, Path::new("targets.yaml"));
        assert_eq!(config.catalog.policy, LoadPolicy::Strict);
        assert_eq!(config.scheduler.overhead_sec, 5.0);
        assert_eq!(config.site.name, "Mauna Loa");
        assert_eq!(config.horizon.points, vec![(0.0, 25.0), (90.0, 30.0)]);
        assert_eq!(config.scheduling_weights().get("observability"), Some(2.0));

        let observability = config.observability();
        assert_eq!(observability.overhead, Seconds::new(5.0));
        assert_eq!(observability.time_step, Seconds::new(10.0));
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: SchedulerConfig = "[catalog]\npath = \"targets.json\"\n".parse().unwrap();
        assert_eq!(config.catalog.policy, LoadPolicy::SkipInvalid);
        assert_eq!(config.scheduler.overhead_sec, 0.0);
        assert_eq!(config.scheduler.time_step_sec, 30.0);
        assert_eq!(config.scheduling_weights().len(), 1);
        assert_eq!(config.scheduling_weights().get("observability"), Some(1.0));
        assert_eq!(config.site.latitude, 0.0);
        assert!(config.horizon.points.is_empty());
    }

    #[test]
    fn test_for_catalog_matches_minimal_file() {
        let built = SchedulerConfig::for_catalog("targets.json");
        let parsed: SchedulerConfig = "[catalog]\npath = \"targets.json\"\n".parse().unwrap();
        assert_eq!(built.catalog.path, parsed.catalog.path);
        assert_eq!(built.weights, parsed.weights);
        assert_eq!(built.scheduler.time_step_sec, parsed.scheduler.time_step_sec);
        assert!(built.validate().is_ok());
    }

    #[test]
    fn test_empty_weights_table_means_no_terms() {
        let config: SchedulerConfig = "[catalog]\npath = \"t.json\"\n[weights]\n".parse().unwrap();
        assert!(config.scheduling_weights().is_empty());
    }

    #[test]
    fn test_missing_catalog_section_is_rejected() {
        let err = "[scheduler]\noverhead_sec = 1.0\n"
            .parse::<SchedulerConfig>()
            .unwrap_err();
        assert!(matches!(err, SchedulerError::Configuration(_)));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let cases = [
            "[catalog]\npath = \"t.json\"\n[scheduler]\ntime_step_sec = 0.0\n",
            "[catalog]\npath = \"t.json\"\n[scheduler]\ntime_step_sec = 1e13\n",
            "[catalog]\npath = \"t.json\"\n[scheduler]\noverhead_sec = -1.0\n",
            "[catalog]\npath = \"t.json\"\n[site]\nlatitude = 95.0\nlongitude = 0.0\n",
            "[catalog]\npath = \"t.json\"\n[weights]\nobservability = -2.0\n",
            "[catalog]\npath = \"\"\n",
            "[catalog]\npath = \"t.json\"\npolicy = \"lenient\"\n",
        ];
        for case in cases {
            let err = case.parse::<SchedulerConfig>().unwrap_err();
            assert!(
                matches!(err, SchedulerError::Configuration(_)),
                "expected configuration error for {:?}, got {:?}",
                case,
                err
            );
        }
    }

    #[test]
    fn test_from_file_resolves_catalog_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("scheduler.toml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        file.write_all(b"[catalog]\npath = \"targets.yaml\"\n").unwrap();

        let config = SchedulerConfig::from_file(&config_path).unwrap();
        assert_eq!(config.catalog.path, dir.path().join("targets.yaml"));
    }

    #[test]
    fn test_from_file_missing() {
        let err = SchedulerConfig::from_file("/nonexistent/scheduler.toml").unwrap_err();
        assert!(matches!(err, SchedulerError::Configuration(_)));
    }

    #[test]
    fn test_time_step_upper_bound() {
        let at_bound = format!(
            "[catalog]\npath = \"t.json\"\n[scheduler]\ntime_step_sec = {:.1}\n",
            MAX_TIME_STEP_SEC
        );
        assert!(at_bound.parse::<SchedulerConfig>().is_ok());

        let past_bound = format!(
            "[catalog]\npath = \"t.json\"\n[scheduler]\ntime_step_sec = {:.1}\n",
            MAX_TIME_STEP_SEC + 1.0
        );
        assert!(matches!(
            past_bound.parse::<SchedulerConfig>(),
            Err(SchedulerError::Configuration(_))
        ));
    }

    #[test]
    fn test_station_uses_site_horizon_and_tracks() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("tracks.yaml"),
            "M42:\n  - {mjd: 60431.0, altitude: 40.0, azimuth: 45.0}\n  - {mjd: 60432.0, altitude: 40.0, azimuth: 45.0}\n",
        )
        .unwrap();
        let config_path = dir.path().join("scheduler.toml");
        std::fs::write(&config_path, format!("{}\n[ephemeris]\ntracks = \"tracks.yaml\"\n", FULL)).unwrap();

        let config = SchedulerConfig::from_file(&config_path).unwrap();
        assert_eq!(config.ephemeris.as_ref().unwrap().tracks, dir.path().join("tracks.yaml"));

        // 2024-05-01T10:00:00Z is MJD 60431.41667
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let station = config.station(Clock::Fixed(at)).unwrap();

        assert_eq!(station.now(), at);
        assert_eq!(station.site().name, "Mauna Loa");
        assert!(!station.is_observable(Degrees::new(15.0), Degrees::new(200.0)));
        assert!(station.is_observable(Degrees::new(35.0), Degrees::new(45.0)));

        let m42 = Target::from_record(&json!({"name": "M42", "position": "83.8 -5.4", "visit": [{}]})).unwrap();
        let coord = station.horizontal(&m42, at).unwrap().unwrap();
        assert!((coord.altitude.value() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_station_needs_ephemeris_section() {
        let config: SchedulerConfig = FULL.parse().unwrap();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let err = config.station(Clock::Fixed(at)).unwrap_err();
        assert!(matches!(err, SchedulerError::Configuration(_)));

        let station = config.station_with(Clock::Fixed(at), TabulatedEphemeris::new()).unwrap();
        assert_eq!(station.site().name, "Mauna Loa");
    }

    #[test]
    fn test_station_with_unreadable_tracks() {
        let mut config: SchedulerConfig = FULL.parse().unwrap();
        config.ephemeris = Some(EphemerisSettings {
            tracks: "/nonexistent/tracks.yaml".into(),
        });
        let err = config.station(Clock::System).unwrap_err();
        assert!(matches!(err, SchedulerError::Configuration(_)));
    }

    #[test]
    fn test_build_scheduler_carries_policy() {
        let config: SchedulerConfig = FULL.parse().unwrap();
        let scheduler = config.build_scheduler();
        assert_eq!(scheduler.policy(), LoadPolicy::Strict);
        assert!(scheduler.registry().contains("observability"));
        assert_eq!(scheduler.source_description(), "targets.yaml");
    }
}
