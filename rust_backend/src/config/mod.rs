//! Scheduler configuration file support.
//!
//! Configuration is read from a TOML file (`scheduler.toml`). Only the
//! `[catalog]` section is required; every other section has defaults.
//! Building a [`Station`] from the file also needs an `[ephemeris]` section
//! naming the precomputed track file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use qtty::{Degrees, Seconds};

use crate::catalog::{FileCatalog, LoadPolicy};
use crate::error::{SchedulerError, SchedulerResult};
use crate::merit::{MeritRegistry, Observability, OBSERVABILITY};
use crate::observatory::{Clock, Ephemeris, HorizonProfile, Site, Station, TabulatedEphemeris};
use crate::scheduler::{Scheduler, Weights};

#[cfg(test)]
mod config_tests;

/// Scheduler configuration from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub scheduler: SchedulingSettings,
    #[serde(default = "default_weights")]
    pub weights: BTreeMap<String, f64>,
    #[serde(default)]
    pub site: Site,
    #[serde(default)]
    pub horizon: HorizonSettings,
    #[serde(default)]
    pub ephemeris: Option<EphemerisSettings>,
}

/// Where candidates are read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSettings {
    pub path: PathBuf,
    #[serde(default)]
    pub policy: LoadPolicy,
}

/// Tuning of the built-in merit functions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingSettings {
    /// Overhead charged per exposure and per observation, in seconds.
    #[serde(default)]
    pub overhead_sec: f64,
    /// Sampling step of the observability window, in seconds.
    #[serde(default = "default_time_step")]
    pub time_step_sec: f64,
}

/// Site horizon.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HorizonSettings {
    #[serde(default)]
    pub min_altitude_deg: f64,
    /// `(azimuth, minimum altitude)` pairs in degrees.
    #[serde(default)]
    pub points: Vec<(f64, f64)>,
}

/// Precomputed horizontal tracks for the site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EphemerisSettings {
    /// JSON or YAML track file, see [`TabulatedEphemeris`].
    pub tracks: PathBuf,
}

/// Largest accepted `scheduler.time_step_sec` (one hour).
pub const MAX_TIME_STEP_SEC: f64 = 3600.0;

fn default_time_step() -> f64 {
    30.0
}

fn default_weights() -> BTreeMap<String, f64> {
    BTreeMap::from([(OBSERVABILITY.to_string(), 1.0)])
}

impl Default for SchedulingSettings {
    fn default() -> Self {
        Self {
            overhead_sec: 0.0,
            time_step_sec: default_time_step(),
        }
    }
}

impl FromStr for SchedulerConfig {
    type Err = SchedulerError;

    /// Parse and validate a TOML document.
    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let config: SchedulerConfig = toml::from_str(content).map_err(|e| {
            SchedulerError::Configuration(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }
}

impl SchedulerConfig {
    /// Default configuration reading candidates from `path`.
    pub fn for_catalog(path: impl Into<PathBuf>) -> Self {
        Self {
            catalog: CatalogSettings {
                path: path.into(),
                policy: LoadPolicy::default(),
            },
            scheduler: SchedulingSettings::default(),
            weights: default_weights(),
            site: Site::default(),
            horizon: HorizonSettings::default(),
            ephemeris: None,
        }
    }

    /// Load configuration from a TOML file.
    ///
    /// Relative `catalog.path` and `ephemeris.tracks` are resolved against
    /// the directory holding the configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SchedulerResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SchedulerError::Configuration(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let mut config: SchedulerConfig = content.parse()?;
        if let Some(dir) = path.parent() {
            if config.catalog.path.is_relative() {
                config.catalog.path = dir.join(&config.catalog.path);
            }
            if let Some(ephemeris) = config.ephemeris.as_mut() {
                if ephemeris.tracks.is_relative() {
                    ephemeris.tracks = dir.join(&ephemeris.tracks);
                }
            }
        }

        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `scheduler.toml` in:
    /// 1. Current directory
    /// 2. `rust_backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> SchedulerResult<Self> {
        let search_paths = [
            PathBuf::from("scheduler.toml"),
            PathBuf::from("rust_backend/scheduler.toml"),
            PathBuf::from("../scheduler.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(SchedulerError::Configuration(
            "No scheduler.toml found in standard locations".to_string(),
        ))
    }

    /// Check value ranges the TOML types cannot express.
    pub fn validate(&self) -> SchedulerResult<()> {
        if self.catalog.path.as_os_str().is_empty() {
            return Err(SchedulerError::Configuration(
                "'catalog.path' must not be empty".to_string(),
            ));
        }

        let overhead = self.scheduler.overhead_sec;
        if !overhead.is_finite() || overhead < 0.0 {
            return Err(SchedulerError::Configuration(format!(
                "'scheduler.overhead_sec' must be a non-negative number, got {}",
                overhead
            )));
        }

        let step = self.scheduler.time_step_sec;
        if !step.is_finite() || step <= 0.0 || step > MAX_TIME_STEP_SEC {
            return Err(SchedulerError::Configuration(format!(
                "'scheduler.time_step_sec' must be in (0, {}], got {}",
                MAX_TIME_STEP_SEC, step
            )));
        }

        for (name, weight) in &self.weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(SchedulerError::Configuration(format!(
                    "weight for '{}' must be a non-negative number, got {}",
                    name, weight
                )));
            }
        }

        self.site.validate()?;
        self.horizon_profile()?;
        Ok(())
    }

    pub fn catalog_source(&self) -> FileCatalog {
        FileCatalog::new(&self.catalog.path)
    }

    pub fn scheduling_weights(&self) -> Weights {
        self.weights
            .iter()
            .map(|(name, weight)| (name.clone(), *weight))
            .collect()
    }

    /// The `observability` merit function tuned by `[scheduler]`.
    pub fn observability(&self) -> Observability {
        Observability::new(
            Seconds::new(self.scheduler.overhead_sec),
            Seconds::new(self.scheduler.time_step_sec),
        )
    }

    /// Built-in merit functions with configured settings.
    pub fn merit_registry(&self) -> MeritRegistry {
        let mut registry = MeritRegistry::with_builtins();
        registry.register(OBSERVABILITY, self.observability());
        registry
    }

    pub fn horizon_profile(&self) -> SchedulerResult<HorizonProfile> {
        HorizonProfile::new(
            Degrees::new(self.horizon.min_altitude_deg),
            self.horizon.points.clone(),
        )
    }

    /// Observatory for the configured site, horizon and track file.
    pub fn station(&self, clock: Clock) -> SchedulerResult<Station> {
        let settings = self.ephemeris.as_ref().ok_or_else(|| {
            SchedulerError::Configuration(
                "No [ephemeris] section: 'ephemeris.tracks' is needed to build a station".to_string(),
            )
        })?;
        let ephemeris = TabulatedEphemeris::from_file(&settings.tracks).map_err(|e| {
            SchedulerError::Configuration(format!(
                "Failed to load tracks {}: {}",
                settings.tracks.display(),
                e
            ))
        })?;
        self.station_with(clock, ephemeris)
    }

    /// Observatory for the configured site and horizon, asking `ephemeris`
    /// for positions.
    pub fn station_with(&self, clock: Clock, ephemeris: impl Ephemeris + 'static) -> SchedulerResult<Station> {
        Ok(Station::new(self.site.clone(), ephemeris)
            .with_clock(clock)
            .with_horizon(self.horizon_profile()?))
    }

    /// Scheduler over the configured catalog, policy and merit functions.
    pub fn build_scheduler(&self) -> Scheduler {
        Scheduler::with_registry(self.catalog_source(), self.merit_registry())
            .with_policy(self.catalog.policy)
    }
}
