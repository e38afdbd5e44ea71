//! Merit functions and the registry the scheduler looks them up in.
//!
//! A merit function scores one target against the observatory's current
//! state. It either returns a non-zero score or vetoes the target; a veto
//! excludes the target from the current scheduling decision regardless of
//! what any other term says.

pub mod observability;
pub mod registry;


use serde::{Deserialize, Serialize};

use crate::error::SchedulerResult;
use crate::models::Target;
use crate::observatory::Observatory;

pub use observability::{Observability, OBSERVABILITY};
pub use registry::MeritRegistry;

/// Outcome of one merit function for one target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Merit {
    Score(f64),
    Veto,
}

impl Merit {
    /// A score, where zero and NaN count as a veto.
    pub fn from_score(score: f64) -> Self {
        if score == 0.0 || score.is_nan() {
            Merit::Veto
        } else {
            Merit::Score(score)
        }
    }

    /// `true` for [`Merit::Veto`] and for scores that would be falsy.
    pub fn is_veto(&self) -> bool {
        match self {
            Merit::Veto => true,
            Merit::Score(score) => *score == 0.0 || score.is_nan(),
        }
    }

    /// The score, unless this result vetoes.
    pub fn score(&self) -> Option<f64> {
        match self {
            Merit::Score(score) if !self.is_veto() => Some(*score),
            _ => None,
        }
    }
}

impl From<bool> for Merit {
    fn from(pass: bool) -> Self {
        if pass {
            Merit::Score(1.0)
        } else {
            Merit::Veto
        }
    }
}

/// A named scoring rule.
///
/// Implemented for any `Fn(&Target, &dyn Observatory) -> SchedulerResult<Merit>`
/// closure, so ad-hoc terms can be registered without a dedicated type.
pub trait MeritFunction: Send + Sync {
    fn evaluate(&self, target: &Target, observatory: &dyn Observatory) -> SchedulerResult<Merit>;
}

impl<F> MeritFunction for F
where
    F: Fn(&Target, &dyn Observatory) -> SchedulerResult<Merit> + Send + Sync,
{
    fn evaluate(&self, target: &Target, observatory: &dyn Observatory) -> SchedulerResult<Merit> {
        self(target, observatory)
    }
}
