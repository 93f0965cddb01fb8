//! The phase state machine driving one development run end to end.

use crate::checkpoint::{CheckpointStore, StateUpdate};
use crate::config::PipelineConfig;
use crate::decision::DecisionSource;
use crate::error::{PipelineError, PipelineResult};
use crate::intake::Mailbox;
use crate::layout::PipelineLayout;
use crate::phase::Phase;
use crate::promotion::ModelPublisher;
use std::sync::Arc;
use tracing::{error, info};
use tungsten_training::{
    read_json, write_json, GridSearchEngine, LearningSets, LossTrace, ModelStore, TestingReport,
    Trainer, TrainingParams, ValidationReport,
};

/// How one pipeline run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The chosen model was approved and handed to the promotion boundary.
    Promoted { index: u32 },
    /// The final test report was rejected; all work was discarded.
    Rejected,
    /// An interactive gate was armed; the run resumes from the checkpoint
    /// once the decision file carries the answer.
    AwaitingInput,
}

/// Whether the run loop keeps going after a phase step.
enum Step {
    Continue,
    AwaitInput,
}

/// Drives the pipeline from its checkpointed phase to the end of a run.
///
/// Each phase entry performs its action, checkpoints the transition, and the
/// loop continues until the Results gate resolves. A crash between phases
/// resumes from the last checkpointed transition; collaborators (trainer,
/// decision source, publisher) are injected at construction.
pub struct PhaseController {
    layout: PipelineLayout,
    config: PipelineConfig,
    checkpoint: CheckpointStore,
    mailbox: Arc<Mailbox<LearningSets>>,
    trainer: Box<dyn Trainer>,
    decisions: Box<dyn DecisionSource>,
    publisher: Box<dyn ModelPublisher>,
    learning_sets: Option<LearningSets>,
}

impl PhaseController {
    pub fn new(
        layout: PipelineLayout,
        config: PipelineConfig,
        trainer: Box<dyn Trainer>,
        decisions: Box<dyn DecisionSource>,
        publisher: Box<dyn ModelPublisher>,
    ) -> PipelineResult<Self> {
        config.validate()?;
        layout.ensure_dirs()?;
        let checkpoint = CheckpointStore::load(layout.status_path())?;
        Ok(Self {
            layout,
            config,
            checkpoint,
            mailbox: Arc::new(Mailbox::new()),
            trainer,
            decisions,
            publisher,
            learning_sets: None,
        })
    }

    /// Hand-off point for the intake listener.
    pub fn mailbox(&self) -> Arc<Mailbox<LearningSets>> {
        Arc::clone(&self.mailbox)
    }

    pub fn phase(&self) -> Phase {
        self.checkpoint.phase()
    }

    pub fn layout(&self) -> &PipelineLayout {
        &self.layout
    }

    /// Runs the state machine until the current run completes or pauses.
    ///
    /// With an interactive decision source the loop stops with
    /// [`RunOutcome::AwaitingInput`] whenever a gate has just been armed
    /// (curve generated, report written, reject-all retry), so the human can
    /// inspect the artifact and fill in the decision file before the next
    /// invocation resumes from the checkpoint.
    ///
    /// # Errors
    ///
    /// Fatal configuration and decision errors halt the run without mutating
    /// the checkpoint, so the same phase is retried after the input is fixed.
    pub fn run(&mut self) -> PipelineResult<RunOutcome> {
        loop {
            let step = match self.checkpoint.phase() {
                Phase::Starting => self.starting_phase()?,
                Phase::Waiting => self.waiting_phase()?,
                Phase::Ready => self.ready_phase()?,
                Phase::LearningCurve => self.learning_curve_phase()?,
                Phase::Validation => self.validation_phase()?,
                Phase::ValidationReport => self.selection_phase()?,
                Phase::Testing => self.testing_phase()?,
                Phase::Results => return self.results_phase(),
            };
            if matches!(step, Step::AwaitInput) {
                info!("gate armed, pausing for user input");
                return Ok(RunOutcome::AwaitingInput);
            }
        }
    }

    /// `AwaitInput` when the decision source needs a pause at a freshly armed
    /// gate, `Continue` for automated sources.
    fn gate_armed(&self) -> Step {
        if self.decisions.interactive() {
            Step::AwaitInput
        } else {
            Step::Continue
        }
    }

    fn starting_phase(&mut self) -> PipelineResult<Step> {
        info!("pipeline starting, waiting for learning sets");
        self.checkpoint.save(StateUpdate::phase(Phase::Waiting))?;
        Ok(Step::Continue)
    }

    /// The single synchronization point with the intake listener.
    fn waiting_phase(&mut self) -> PipelineResult<Step> {
        let sets = self.mailbox.recv();
        sets.validate()?;
        // Persist the bundle before the phase transition: a crash in between
        // re-arms the listener instead of trusting an unproven Waiting state.
        write_json(&self.layout.learning_sets_path(), &sets)?;
        info!(
            training = sets.training_set.len(),
            validation = sets.validation_set.len(),
            test = sets.test_set.len(),
            "received learning sets"
        );
        self.learning_sets = Some(sets);
        self.checkpoint.save(StateUpdate::phase(Phase::Ready))?;
        Ok(Step::Continue)
    }

    fn ready_phase(&mut self) -> PipelineResult<Step> {
        let avg = self.config.validation.hyper_parameters.average();
        info!(layers = avg.layers, neurons = avg.neurons, "average hyperparameters set");
        self.checkpoint.save(StateUpdate {
            phase: Some(Phase::LearningCurve),
            avg_params: Some(avg),
            ..StateUpdate::default()
        })?;
        Ok(Step::Continue)
    }

    fn learning_curve_phase(&mut self) -> PipelineResult<Step> {
        let decision = self.decisions.learning_curve()?;

        // No curve yet, or the last iteration count was judged insufficient:
        // run the exploratory fit at average capacity and stay in this phase.
        if self.checkpoint.first_iter() || !decision.good_max_iter {
            self.checkpoint.save(StateUpdate {
                max_iter: Some(decision.max_iter),
                ..StateUpdate::default()
            })?;
            let avg = self.checkpoint.avg_params().ok_or_else(|| {
                PipelineError::Config("average hyperparameters missing from checkpoint".to_string())
            })?;
            let params = TrainingParams {
                max_iter: decision.max_iter,
                layers: avg.layers,
                neurons: avg.neurons,
            };
            info!(max_iter = decision.max_iter, "generating learning curve");
            self.ensure_learning_sets()?;
            let training = &self
                .learning_sets
                .as_ref()
                .ok_or_else(|| PipelineError::Config("learning sets unavailable".to_string()))?
                .training_set;
            let fitted = self.trainer.train(&params, training)?;

            let trace = LossTrace::new(decision.max_iter, fitted.loss_curve);
            if let Err(e) = write_json(&self.layout.learning_curve_path(), &trace) {
                error!(error = %e, "failed to write learning curve trace");
            }
            // The human inspects the fresh curve before judging max_iter.
            return Ok(self.gate_armed());
        }

        info!(max_iter = ?self.checkpoint.max_iter(), "iteration count confirmed");
        self.checkpoint.save(StateUpdate::phase(Phase::Validation))?;
        Ok(Step::Continue)
    }

    fn validation_phase(&mut self) -> PipelineResult<Step> {
        let max_iter = self.checkpoint.max_iter().ok_or_else(|| {
            PipelineError::Config("no iteration count recorded before validation".to_string())
        })?;
        info!(max_iter, "starting validation grid search");

        let store = ModelStore::create(self.layout.models_dir())?;
        let engine = GridSearchEngine::new(
            self.config.validation.hyper_parameters,
            self.config.validation.overfitting_tolerance,
            store,
        );
        self.ensure_learning_sets()?;
        let sets = self
            .learning_sets
            .as_ref()
            .ok_or_else(|| PipelineError::Config("learning sets unavailable".to_string()))?;
        let report =
            engine.run(self.trainer.as_mut(), max_iter, &sets.training_set, &sets.validation_set)?;

        // The report is the durable record of the search; the selection gate
        // reads it back after a restart, so this write must succeed.
        write_json(&self.layout.validation_report_path(), &report)?;
        self.checkpoint.save(StateUpdate::phase(Phase::ValidationReport))?;
        Ok(self.gate_armed())
    }

    fn selection_phase(&mut self) -> PipelineResult<Step> {
        let report: ValidationReport =
            read_json(&self.layout.validation_report_path()).map_err(|e| {
                PipelineError::Config(format!("validation report unavailable: {e}"))
            })?;
        let decision = self.decisions.selection(&report)?;

        if decision.chosen_index == 0 {
            info!("all candidates rejected, restarting development");
            self.checkpoint.retry()?;
            // The next curve gate needs a fresh iteration-count verdict.
            return Ok(self.gate_armed());
        }

        let candidate = report.find(decision.chosen_index).ok_or_else(|| {
            PipelineError::InvalidCandidate(format!(
                "no retained candidate with index {}",
                decision.chosen_index
            ))
        })?;
        if !candidate.valid {
            return Err(PipelineError::InvalidCandidate(format!(
                "candidate {} failed the overfitting check",
                candidate.index
            )));
        }

        info!(
            index = candidate.index,
            layers = candidate.layers,
            neurons = candidate.neurons,
            "candidate chosen for testing"
        );
        self.checkpoint.save(StateUpdate {
            phase: Some(Phase::Testing),
            best_classifier: Some(candidate.clone()),
            ..StateUpdate::default()
        })?;
        Ok(Step::Continue)
    }

    fn testing_phase(&mut self) -> PipelineResult<Step> {
        let candidate = self.checkpoint.best_classifier().ok_or_else(|| {
            PipelineError::Config("no chosen candidate recorded before testing".to_string())
        })?;
        info!(index = candidate.index, "testing chosen candidate on holdout split");

        let store = ModelStore::create(self.layout.models_dir())?;
        let bytes = store.load(candidate.index)?;
        let classifier = self.trainer.load(&bytes)?;

        self.ensure_learning_sets()?;
        let test_set = &self
            .learning_sets
            .as_ref()
            .ok_or_else(|| PipelineError::Config("learning sets unavailable".to_string()))?
            .test_set;
        let testing_error = test_set.classification_error(&*classifier);

        let report = TestingReport::evaluate(
            &candidate,
            testing_error,
            self.config.testing.generalization_tolerance,
        );
        info!(
            testing_error,
            error_difference = report.errors.error_difference,
            passed = report.errors.passed,
            "holdout test finished"
        );

        // Read back at the Results gate, so this write must succeed.
        write_json(&self.layout.testing_report_path(), &report)?;
        self.checkpoint.save(StateUpdate::phase(Phase::Results))?;
        // The human inspects the testing report before the approval gate.
        Ok(self.gate_armed())
    }

    fn results_phase(&mut self) -> PipelineResult<RunOutcome> {
        let report: TestingReport = read_json(&self.layout.testing_report_path())
            .map_err(|e| PipelineError::Config(format!("testing report unavailable: {e}")))?;
        let decision = self.decisions.approval(&report)?;

        let outcome = if decision.approved {
            let index = report.classifier_id;
            info!(index, "test report approved, sending model to serving system");
            // Send failures are logged, never retried, and do not hold up the
            // reset that follows.
            match ModelStore::create(self.layout.models_dir())
                .and_then(|store| store.load(index))
            {
                Ok(bytes) => {
                    if let Err(e) = self.publisher.publish(&bytes) {
                        error!(error = %e, "failed to send model to serving system");
                    }
                }
                Err(e) => error!(error = %e, "promoted model artifact unavailable"),
            }
            RunOutcome::Promoted { index }
        } else {
            info!("test report rejected, development failed");
            RunOutcome::Rejected
        };

        self.learning_sets = None;
        self.checkpoint.reset()?;
        Ok(outcome)
    }

    fn ensure_learning_sets(&mut self) -> PipelineResult<()> {
        if self.learning_sets.is_none() {
            // Resuming past Ready after a restart: the bundle was persisted
            // when it was delivered.
            let sets: LearningSets = read_json(&self.layout.learning_sets_path())
                .map_err(|e| PipelineError::Config(format!("learning sets unavailable: {e}")))?;
            sets.validate()?;
            self.learning_sets = Some(sets);
        }
        Ok(())
    }
}
