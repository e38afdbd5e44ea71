use serde::Serialize;

use crate::merit::Merit;
use crate::models::Target;

/// One weighted merit term as applied to one target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermResult {
    pub name: String,
    pub weight: f64,
    pub merit: Merit,
}

/// Per-target breakdown of a scheduling pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// Position of the target in the candidate list.
    pub index: usize,
    pub name: String,
    pub priority: f64,
    pub terms: Vec<TermResult>,
    pub vetoed: bool,
    /// Weighted sum of the non-vetoing terms, before priority.
    pub merit: f64,
    /// `priority * merit`, or `None` when vetoed.
    pub score: Option<f64>,
}

impl Evaluation {
    /// Combine term results the way the scheduler ranks targets.
    ///
    /// The weighted sum starts at zero. Any vetoing term marks the target as
    /// vetoed; once vetoed, later terms stop accumulating.
    pub fn from_terms(index: usize, target: &Target, terms: Vec<TermResult>) -> Self {
        let mut vetoed = false;
        let mut merit = 0.0;

        for term in &terms {
            match term.merit.score() {
                None => vetoed = true,
                Some(score) if !vetoed => merit += term.weight * score,
                Some(_) => {}
            }
        }

        Self {
            index,
            name: target.name.clone(),
            priority: target.priority,
            score: (!vetoed).then(|| target.priority * merit),
            terms,
            vetoed,
            merit,
        }
    }
}

/// The target chosen by a scheduling pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub target: Target,
    pub score: f64,
}

/// Index of the best-scoring evaluation; ties go to the earliest.
pub fn best_index(evaluations: &[Evaluation]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for evaluation in evaluations {
        let Some(score) = evaluation.score else {
            continue;
        };
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((evaluation.index, score)),
        }
    }
    best.map(|(index, _)| index)
}
