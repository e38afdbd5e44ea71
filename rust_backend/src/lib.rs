//! Merit-based target selection for robotic telescopes.
//!
//! Candidates are read from a catalog, scored by weighted merit functions
//! against an observatory's current state, and ranked; the best target wins.
//!
//! - [`models`]: targets and the observations of their visits
//! - [`catalog`]: catalog sources and record-to-target loading
//! - [`observatory`]: site, ephemeris, horizon and clock
//! - [`merit`]: merit functions and their registry
//! - [`scheduler`]: weighted ranking and target selection
//! - [`config`]: TOML configuration

pub mod catalog;
pub mod config;
pub mod error;
pub mod merit;
pub mod models;
pub mod observatory;
pub mod scheduler;
pub mod time;

pub use catalog::{CatalogSource, FileCatalog, InMemoryCatalog, LoadPolicy, LoadReport};
pub use config::SchedulerConfig;
pub use error::{SchedulerError, SchedulerResult};
pub use merit::{Merit, MeritFunction, MeritRegistry};
pub use models::{Observation, Target};
pub use observatory::{Ephemeris, Observatory, Station, TabulatedEphemeris};
pub use scheduler::{Evaluation, Scheduler, Selection, Weights};
