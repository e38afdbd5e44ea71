//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashSet;

use chrono::{DateTime, TimeZone, Utc};
use merit_scheduler::observatory::{HorizontalCoord, Observatory, Site};
use merit_scheduler::{SchedulerResult, Target};
use qtty::Degrees;
use serde_json::{json, Value};

/// Observatory that puts the named targets at 45° altitude and every other
/// target below the horizon, at a fixed instant.
pub struct MockObservatory {
    site: Site,
    now: DateTime<Utc>,
    visible: HashSet<String>,
}

impl MockObservatory {
    pub fn with_visible(names: &[&str]) -> Self {
        Self {
            site: Site::default(),
            now: Utc.with_ymd_and_hms(2024, 3, 1, 23, 0, 0).unwrap(),
            visible: names.iter().map(|name| name.to_string()).collect(),
        }
    }
}

impl Observatory for MockObservatory {
    fn site(&self) -> &Site {
        &self.site
    }

    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn horizontal(
        &self,
        target: &Target,
        _at: DateTime<Utc>,
    ) -> SchedulerResult<Option<HorizontalCoord>> {
        let altitude = if self.visible.contains(&target.name) {
            45.0
        } else {
            -5.0
        };
        Ok(Some(HorizontalCoord::new(
            Degrees::new(altitude),
            Degrees::new(90.0),
        )))
    }

    fn is_observable(&self, altitude: Degrees, _azimuth: Degrees) -> bool {
        altitude.value() >= 0.0
    }
}

/// Target record with a single default observation.
pub fn target_record(name: &str, priority: f64) -> Value {
    json!({
        "name": name,
        "priority": priority,
        "visit": [{"master_exptime": 60, "slave_exptime": 60}]
    })
}
