//! The built-in `observability` merit function.

use qtty::Seconds;

use super::{Merit, MeritFunction};
use crate::error::SchedulerResult;
use crate::models::Target;
use crate::observatory::Observatory;
use crate::time::sampling::{sample_instants, DEFAULT_TIME_STEP};

/// Registry name of [`Observability`].
pub const OBSERVABILITY: &str = "observability";

/// Vetoes targets that leave the unobstructed sky before their visit ends.
///
/// The visit window starts at the observatory's current instant and lasts for
/// the target's estimated visit duration. It is sampled every `time_step`
/// rather than only at its endpoints, since a non-convex horizon can block
/// the middle of a window whose start and end are clear. A target that passes
/// every sample scores a flat `1`: all fully observable targets are equally
/// meritorious under this term. Windows too long to sample (see
/// [`MAX_SAMPLES`](crate::time::sampling::MAX_SAMPLES)) are vetoed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observability {
    /// Overhead passed to [`Target::estimate_visit_duration`].
    pub overhead: Seconds,
    pub time_step: Seconds,
}

impl Default for Observability {
    fn default() -> Self {
        Self {
            overhead: Seconds::new(0.0),
            time_step: DEFAULT_TIME_STEP,
        }
    }
}

impl Observability {
    pub fn new(overhead: Seconds, time_step: Seconds) -> Self {
        Self {
            overhead,
            time_step,
        }
    }
}

impl MeritFunction for Observability {
    fn evaluate(&self, target: &Target, observatory: &dyn Observatory) -> SchedulerResult<Merit> {
        let duration = target.estimate_visit_duration(self.overhead);
        let start = observatory.now();

        let Some(instants) = sample_instants(start, duration, self.time_step) else {
            log::warn!(
                "Visit window of target '{}' ({} s every {} s) cannot be sampled; vetoing",
                target.name,
                duration.value(),
                self.time_step.value()
            );
            return Ok(Merit::Veto);
        };

        for at in instants {
            let coord = match observatory.horizontal(target, at)? {
                Some(coord) => coord,
                None => {
                    log::warn!(
                        "Target '{}' has no resolvable position; vetoing",
                        target.name
                    );
                    return Ok(Merit::Veto);
                }
            };

            if !observatory.is_observable(coord.altitude, coord.azimuth) {
                log::debug!(
                    "Target '{}' unobservable at {} (alt {:.2}, az {:.2})",
                    target.name,
                    at,
                    coord.altitude.value(),
                    coord.azimuth.value()
                );
                return Ok(Merit::Veto);
            }
        }

        Ok(Merit::Score(1.0))
    }
}
