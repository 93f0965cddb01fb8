//! Decision boundary: who answers at each gate.
//!
//! Three gates need an external answer (iteration count, candidate
//! selection, final approval). The source is chosen at construction: a
//! human-edited file or a seeded simulator for automated runs. Payloads are
//! validated before use; a malformed payload is fatal to the invocation and
//! never mutates workflow state.

use crate::error::{PipelineError, PipelineResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;
use tungsten_training::{TestingReport, ValidationReport};

/// Iteration-count bounds accepted at the learning-curve gate.
pub const MIN_MAX_ITER: u32 = 10;
pub const MAX_MAX_ITER: u32 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LearningCurveDecision {
    pub max_iter: u32,
    pub good_max_iter: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionDecision {
    /// Grid index of the chosen candidate; 0 means "reject all".
    pub chosen_index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApprovalDecision {
    pub approved: bool,
}

/// External actor answering the pipeline's gates.
pub trait DecisionSource: Send {
    fn learning_curve(&mut self) -> PipelineResult<LearningCurveDecision>;

    fn selection(&mut self, report: &ValidationReport) -> PipelineResult<SelectionDecision>;

    fn approval(&mut self, report: &TestingReport) -> PipelineResult<ApprovalDecision>;

    /// True when the source needs the controller to pause after arming a gate
    /// so the actor can inspect the new artifact and answer.
    fn interactive(&self) -> bool {
        false
    }
}

/// On-disk shape of the human decision file.
///
/// Each gate requires its own keys to be present; a missing required key is a
/// malformed payload, not an implicit answer. `-1` marks an integer the human
/// has not filled in yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DecisionFile {
    max_iter: Option<i64>,
    good_max_iter: Option<bool>,
    best_model: Option<i64>,
    approved: Option<bool>,
}

/// Reads gate answers from a human-edited JSON file.
///
/// After each consumed gate the file is rewritten: the consumed answer is
/// carried forward (or reset for one-shot answers), while answers for gates
/// not yet reached are left exactly as the human wrote them.
pub struct FileDecisionSource {
    path: PathBuf,
}

impl FileDecisionSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read(&self) -> PipelineResult<DecisionFile> {
        let json = std::fs::read_to_string(&self.path).map_err(|e| {
            PipelineError::Decision(format!(
                "decision file {} is required for user input: {e}",
                self.path.display()
            ))
        })?;
        serde_json::from_str(&json)
            .map_err(|e| PipelineError::Decision(format!("malformed decision file: {e}")))
    }

    fn require<T>(value: Option<T>, key: &str) -> PipelineResult<T> {
        value.ok_or_else(|| {
            PipelineError::Decision(format!("decision file is missing required field {key}"))
        })
    }

    /// Rewrites the template; a failure here only costs the human a hint.
    fn write_template(&self, file: &DecisionFile) {
        // Unanswered keys get placeholders so the expected shape is visible.
        let template = DecisionFile {
            max_iter: file.max_iter.or(Some(-1)),
            good_max_iter: file.good_max_iter.or(Some(false)),
            best_model: file.best_model.or(Some(-1)),
            approved: file.approved.or(Some(false)),
        };
        let json = match serde_json::to_string_pretty(&template) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialize decision template");
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, json) {
            warn!(error = %e, path = %self.path.display(), "failed to reset decision template");
        }
    }
}

impl DecisionSource for FileDecisionSource {
    fn learning_curve(&mut self) -> PipelineResult<LearningCurveDecision> {
        let input = self.read()?;
        let max_iter = Self::require(input.max_iter, "max_iter")?;
        let good_max_iter = Self::require(input.good_max_iter, "good_max_iter")?;
        if max_iter < i64::from(MIN_MAX_ITER) || max_iter > i64::from(MAX_MAX_ITER) {
            return Err(PipelineError::Decision(format!(
                "max_iter must be between {MIN_MAX_ITER} and {MAX_MAX_ITER}, got {max_iter}"
            )));
        }
        self.write_template(&input);
        Ok(LearningCurveDecision { max_iter: max_iter as u32, good_max_iter })
    }

    fn selection(&mut self, _report: &ValidationReport) -> PipelineResult<SelectionDecision> {
        let mut input = self.read()?;
        let best_model = Self::require(input.best_model, "best_model")?;
        if best_model < 0 {
            return Err(PipelineError::Decision(format!(
                "best_model must be >= 0 (0 rejects all candidates), got {best_model}"
            )));
        }
        // A new selection pass must get an explicit fresh choice.
        input.best_model = Some(-1);
        self.write_template(&input);
        Ok(SelectionDecision { chosen_index: best_model as u32 })
    }

    fn approval(&mut self, _report: &TestingReport) -> PipelineResult<ApprovalDecision> {
        let mut input = self.read()?;
        let approved = Self::require(input.approved, "approved")?;
        input.approved = Some(false);
        self.write_template(&input);
        Ok(ApprovalDecision { approved })
    }

    fn interactive(&self) -> bool {
        true
    }
}

/// Deterministic-but-randomized stand-in for the human, used in automated
/// runs. Seeded, so a given seed replays the same gate answers.
pub struct SimulatedDecisionSource {
    rng: StdRng,
}

impl SimulatedDecisionSource {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl DecisionSource for SimulatedDecisionSource {
    fn learning_curve(&mut self) -> PipelineResult<LearningCurveDecision> {
        Ok(LearningCurveDecision {
            max_iter: self.rng.gen_range(500..=1500),
            good_max_iter: self.rng.gen_bool(0.75),
        })
    }

    fn selection(&mut self, report: &ValidationReport) -> PipelineResult<SelectionDecision> {
        Ok(SelectionDecision { chosen_index: report.first_valid_index() })
    }

    fn approval(&mut self, report: &TestingReport) -> PipelineResult<ApprovalDecision> {
        Ok(ApprovalDecision { approved: report.errors.passed })
    }
}
