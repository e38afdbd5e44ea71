//! Merit-based selection of the next target.
//!
//! The [`Scheduler`] holds the current candidate list and the catalog source
//! it came from. Each call to [`Scheduler::get_target`] scores every
//! candidate with the weighted merit functions named in a [`Weights`] set and
//! returns the best one.
//!
//! # Example
//!
//! ```
//! use merit_scheduler::catalog::InMemoryCatalog;
//! use merit_scheduler::merit::{Merit, MeritRegistry};
//! use merit_scheduler::models::Target;
//! use merit_scheduler::observatory::{Observatory, Site, Station, TabulatedEphemeris};
//! use merit_scheduler::scheduler::{Scheduler, Weights};
//! use merit_scheduler::SchedulerResult;
//! use serde_json::json;
//!
//! let catalog = InMemoryCatalog::new(vec![
//!     json!({"name": "A", "priority": 3, "visit": [{}]}),
//!     json!({"name": "B", "priority": 1, "visit": [{}]}),
//! ]);
//!
//! let mut registry = MeritRegistry::empty();
//! registry.register("always", |_: &Target, _: &dyn Observatory| -> SchedulerResult<Merit> {
//!     Ok(Merit::Score(1.0))
//! });
//!
//! let scheduler = Scheduler::with_registry(catalog, registry);
//! let selection = scheduler
//!     .get_target(
//!         &Station::new(Site::default(), TabulatedEphemeris::new()),
//!         &Weights::empty().with("always", 1.0),
//!     )
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(selection.target.name, "A");
//! assert_eq!(selection.score, 3.0);
//! ```

pub mod evaluation;
pub mod weights;


use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::catalog::{load_targets, CatalogSource, LoadPolicy, LoadReport};
use crate::error::{SchedulerError, SchedulerResult};
use crate::merit::MeritRegistry;
use crate::models::Target;
use crate::observatory::Observatory;

pub use evaluation::{best_index, Evaluation, Selection, TermResult};
pub use weights::Weights;

/// What the scheduler currently works from: a source, the candidates read
/// from it and the report of that read.
pub struct CatalogState {
    source: Arc<dyn CatalogSource>,
    candidates: Arc<Vec<Target>>,
    report: Option<LoadReport>,
}

impl CatalogState {
    fn unloaded(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            candidates: Arc::new(Vec::new()),
            report: None,
        }
    }

    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    pub fn candidates(&self) -> &Arc<Vec<Target>> {
        &self.candidates
    }

    /// `None` until the first successful load.
    pub fn report(&self) -> Option<&LoadReport> {
        self.report.as_ref()
    }
}

/// Chooses the next target to observe from a catalog of candidates.
///
/// Source, candidate list and load report are replaced together on every
/// load: the new state is built without holding any lock and then swapped
/// in, so a scheduling pass running concurrently always sees either the old
/// or the new catalog, never a mix.
pub struct Scheduler {
    registry: MeritRegistry,
    policy: LoadPolicy,
    state: RwLock<Arc<CatalogState>>,
}

impl Scheduler {
    /// Scheduler over `source` with the built-in merit functions.
    ///
    /// Nothing is read until the first load or scheduling pass.
    pub fn new(source: impl CatalogSource + 'static) -> Self {
        Self::with_registry(source, MeritRegistry::with_builtins())
    }

    pub fn with_registry(source: impl CatalogSource + 'static, registry: MeritRegistry) -> Self {
        Self {
            registry,
            policy: LoadPolicy::default(),
            state: RwLock::new(Arc::new(CatalogState::unloaded(Arc::new(source)))),
        }
    }

    /// Set how invalid catalog records are handled on load.
    pub fn with_policy(mut self, policy: LoadPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> LoadPolicy {
        self.policy
    }

    pub fn registry(&self) -> &MeritRegistry {
        &self.registry
    }

    /// Mutable access for registering additional merit functions.
    pub fn registry_mut(&mut self) -> &mut MeritRegistry {
        &mut self.registry
    }

    /// Replace the candidate list with the targets read from `source`.
    ///
    /// On success `source` becomes the one used by [`Scheduler::reload`] and
    /// lazy loads. On failure the previous list and source are kept.
    pub fn load_candidates(
        &self,
        source: impl CatalogSource + 'static,
    ) -> SchedulerResult<LoadReport> {
        self.load_from(Arc::new(source))
    }

    /// Re-read the recorded source, replacing the candidate list.
    pub fn reload(&self) -> SchedulerResult<LoadReport> {
        let source = Arc::clone(&self.state().source);
        self.load_from(source)
    }

    fn load_from(&self, source: Arc<dyn CatalogSource>) -> SchedulerResult<LoadReport> {
        self.swap_in(source).map(|(_, report)| report)
    }

    /// Read `source` and publish it, its targets and the report as one state.
    fn swap_in(
        &self,
        source: Arc<dyn CatalogSource>,
    ) -> SchedulerResult<(Arc<Vec<Target>>, LoadReport)> {
        let loaded = load_targets(source.as_ref(), self.policy)?;
        let candidates = Arc::new(loaded.targets);
        let report = loaded.report;
        *self.state.write() = Arc::new(CatalogState {
            source,
            candidates: Arc::clone(&candidates),
            report: Some(report.clone()),
        });
        Ok((candidates, report))
    }

    /// Source, candidates and load report as of the latest load.
    pub fn state(&self) -> Arc<CatalogState> {
        Arc::clone(&self.state.read())
    }

    /// Snapshot of the current candidate list.
    pub fn candidates(&self) -> Arc<Vec<Target>> {
        Arc::clone(&self.state().candidates)
    }

    /// Report of the most recent successful load.
    pub fn last_report(&self) -> Option<LoadReport> {
        self.state().report.clone()
    }

    /// Describe the source loads currently read from.
    pub fn source_description(&self) -> String {
        self.state().source_description()
    }

    /// Score every candidate without choosing one.
    ///
    /// # Errors
    ///
    /// - [`SchedulerError::Registry`] when a weight names an unknown merit
    ///   function or is negative or non-finite; checked before any
    ///   candidate is evaluated.
    /// - [`SchedulerError::Catalog`] when the candidate list is empty and
    ///   cannot be loaded.
    /// - Any error a merit function raises.
    pub fn evaluate(
        &self,
        observatory: &dyn Observatory,
        weights: &Weights,
    ) -> SchedulerResult<Vec<Evaluation>> {
        self.evaluate_snapshot(observatory, weights)
            .map(|(_, evaluations)| evaluations)
    }

    /// Choose the best candidate for the observatory's current instant.
    ///
    /// Vetoed targets are never chosen. Among the rest the highest
    /// `priority * merit` wins, and ties go to the target listed first in
    /// the catalog. Returns `None` when there are no candidates or all of
    /// them are vetoed.
    ///
    /// # Errors
    ///
    /// Same as [`Scheduler::evaluate`].
    pub fn get_target(
        &self,
        observatory: &dyn Observatory,
        weights: &Weights,
    ) -> SchedulerResult<Option<Selection>> {
        let (snapshot, evaluations) = self.evaluate_snapshot(observatory, weights)?;

        let selection = best_index(&evaluations).and_then(|index| {
            let score = evaluations[index].score?;
            Some(Selection {
                target: snapshot[index].clone(),
                score,
            })
        });

        match &selection {
            Some(selection) => log::info!(
                "Selected '{}' with score {} at {}",
                selection.target.name,
                selection.score,
                observatory.now()
            ),
            None => log::info!(
                "No observable target among {} candidates at {}",
                snapshot.len(),
                observatory.now()
            ),
        }

        Ok(selection)
    }

    fn evaluate_snapshot(
        &self,
        observatory: &dyn Observatory,
        weights: &Weights,
    ) -> SchedulerResult<(Arc<Vec<Target>>, Vec<Evaluation>)> {
        let terms = weights.resolve(&self.registry)?;
        let snapshot = self.ensure_loaded()?;

        let mut evaluations = Vec::with_capacity(snapshot.len());
        for (index, target) in snapshot.iter().enumerate() {
            let mut results = Vec::with_capacity(terms.len());
            for (name, weight, function) in &terms {
                let merit = function.evaluate(target, observatory)?;
                log::debug!(
                    "Target '{}': {} = {:?} (weight {})",
                    target.name,
                    name,
                    merit,
                    weight
                );
                results.push(TermResult {
                    name: name.clone(),
                    weight: *weight,
                    merit,
                });
            }
            evaluations.push(Evaluation::from_terms(index, target, results));
        }

        Ok((snapshot, evaluations))
    }

    /// Current candidates, loading them from the recorded source when the
    /// list is empty.
    fn ensure_loaded(&self) -> SchedulerResult<Arc<Vec<Target>>> {
        let state = self.state();
        if !state.candidates.is_empty() {
            return Ok(Arc::clone(&state.candidates));
        }

        let description = state.source_description();
        log::debug!("Candidate list empty; loading from {}", description);
        let (candidates, _) = self
            .swap_in(Arc::clone(&state.source))
            .map_err(|err| match err {
                SchedulerError::Catalog(_) => err,
                other => SchedulerError::Catalog(format!(
                    "failed to load candidates from {}: {}",
                    description, other
                )),
            })?;

        Ok(candidates)
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("Scheduler")
            .field("registry", &self.registry)
            .field("policy", &self.policy)
            .field("source", &state.source_description())
            .field("candidates", &state.candidates.len())
            .finish()
    }
}
