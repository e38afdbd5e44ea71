use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::{MeritFunction, Observability, OBSERVABILITY};
use crate::error::{SchedulerError, SchedulerResult};

/// Named merit functions available to the scheduler.
///
/// Names are stable identifiers used as keys in scheduling weights. The
/// registry is open for extension: registering a new name does not require
/// any change to the scheduler.
///
/// # Examples
///
/// ```
/// use merit_scheduler::merit::{Merit, MeritRegistry};
/// use merit_scheduler::models::Target;
/// use merit_scheduler::observatory::Observatory;
/// use merit_scheduler::SchedulerResult;
///
/// let mut registry = MeritRegistry::with_builtins();
/// registry.register("bright", |target: &Target, _: &dyn Observatory| -> SchedulerResult<Merit> {
///     Ok(Merit::from_score(target.priority))
/// });
/// assert_eq!(registry.names(), vec!["bright", "observability"]);
/// ```
#[derive(Clone, Default)]
pub struct MeritRegistry {
    functions: BTreeMap<String, Arc<dyn MeritFunction>>,
}

impl MeritRegistry {
    /// Registry with no functions.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry holding the built-in `observability` function with default
    /// settings.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(OBSERVABILITY, Observability::default());
        registry
    }

    /// Register `function` under `name`, returning the function it replaces.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        function: impl MeritFunction + 'static,
    ) -> Option<Arc<dyn MeritFunction>> {
        self.functions.insert(name.into(), Arc::new(function))
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn MeritFunction>> {
        self.functions.get(name)
    }

    /// Look `name` up, failing with [`SchedulerError::Registry`] when absent.
    pub fn resolve(&self, name: &str) -> SchedulerResult<Arc<dyn MeritFunction>> {
        self.get(name).cloned().ok_or_else(|| {
            SchedulerError::Registry(format!(
                "unknown merit function '{}' (registered: {})",
                name,
                self.names().join(", ")
            ))
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.functions.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for MeritRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeritRegistry")
            .field("functions", &self.names())
            .finish()
    }
}
