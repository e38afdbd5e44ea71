use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{SchedulerError, SchedulerResult};
use crate::merit::{MeritFunction, MeritRegistry, OBSERVABILITY};

/// Weighted merit terms applied to every candidate, in insertion order.
///
/// `Weights::default()` is `{"observability": 1.0}`; [`Weights::empty`] gives
/// a weight set with no terms, under which every candidate scores zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Weights {
    entries: Vec<(String, f64)>,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            entries: vec![(OBSERVABILITY.to_string(), 1.0)],
        }
    }
}

impl Weights {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Set the weight of `name`. An existing entry keeps its position.
    pub fn set(&mut self, name: impl Into<String>, weight: f64) -> &mut Self {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = weight,
            None => self.entries.push((name, weight)),
        }
        self
    }

    /// Builder form of [`Weights::set`].
    pub fn with(mut self, name: impl Into<String>, weight: f64) -> Self {
        self.set(name, weight);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, weight)| *weight)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(name, weight)| (name.as_str(), *weight))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look every term up in `registry`.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::Registry`] for an unknown name or for a negative or
    /// non-finite weight.
    pub fn resolve(
        &self,
        registry: &MeritRegistry,
    ) -> SchedulerResult<Vec<(String, f64, Arc<dyn MeritFunction>)>> {
        self.entries
            .iter()
            .map(|(name, weight)| {
                if !weight.is_finite() || *weight < 0.0 {
                    return Err(SchedulerError::Registry(format!(
                        "weight for '{}' must be a finite non-negative number, got {}",
                        name, weight
                    )));
                }
                Ok((name.clone(), *weight, registry.resolve(name)?))
            })
            .collect()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Weights {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut weights = Weights::empty();
        for (name, weight) in iter {
            weights.set(name, weight);
        }
        weights
    }
}

impl fmt::Display for Weights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .iter()
            .map(|(name, weight)| format!("{}={}", name, weight))
            .collect();
        write!(f, "{{{}}}", rendered.join(", "))
    }
}
