//! Error types for scheduling operations.

/// Result type for scheduling operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Error type for scheduling operations.
///
/// Vetoes produced by merit functions are not errors; they are reported
/// through [`crate::merit::Merit::Veto`].
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// A raw target record is missing a required field or has the wrong shape.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A weight names a merit function that is not registered, or carries an
    /// unusable weight value.
    #[error("Registry error: {0}")]
    Registry(String),

    /// The candidate catalog could not be read or decoded.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// The observatory could not resolve a horizontal position.
    #[error("Ephemeris error: {0}")]
    Ephemeris(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl SchedulerError {
    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            SchedulerError::Validation(_) => "validation",
            SchedulerError::Registry(_) => "registry",
            SchedulerError::Catalog(_) => "catalog",
            SchedulerError::Ephemeris(_) => "ephemeris",
            SchedulerError::Configuration(_) => "configuration",
        }
    }
}
