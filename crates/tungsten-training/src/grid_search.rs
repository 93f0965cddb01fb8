use crate::dataset::Split;
use crate::error::TrainingResult;
use crate::hyperparams::{AverageParams, HyperparameterGrid, TrainingParams};
use crate::ranking::{CandidateRecord, RankedCandidates};
use crate::reports::ValidationReport;
use crate::store::ModelStore;
use crate::trainer::Trainer;
use tracing::info;

/// Exhaustive search over the hyperparameter grid.
///
/// Trains one candidate per cell in the fixed enumeration order, scores it on
/// the training and validation splits, persists the fitted artifact under its
/// index and keeps a bounded ranked list of the best candidates.
pub struct GridSearchEngine {
    grid: HyperparameterGrid,
    overfitting_tolerance: f64,
    store: ModelStore,
}

impl GridSearchEngine {
    pub fn new(grid: HyperparameterGrid, overfitting_tolerance: f64, store: ModelStore) -> Self {
        Self { grid, overfitting_tolerance, store }
    }

    /// Midpoint of each grid range, used to size the exploratory run before
    /// any search happens.
    pub fn average_params(&self) -> AverageParams {
        self.grid.average()
    }

    /// Runs the full search and emits the final ranked report.
    ///
    /// Cells are trained strictly sequentially; a zero-cell grid yields a
    /// report with an empty ranked list.
    pub fn run(
        &self,
        trainer: &mut dyn Trainer,
        max_iter: u32,
        training: &Split,
        validation: &Split,
    ) -> TrainingResult<ValidationReport> {
        let mut ranked = RankedCandidates::new();

        for cell in self.grid.cells() {
            let params = TrainingParams {
                max_iter,
                layers: cell.layers,
                neurons: cell.neurons,
            };
            let fitted = trainer.train(&params, training)?;
            let training_error = training.classification_error(&*fitted.classifier);
            let validation_error = validation.classification_error(&*fitted.classifier);

            self.store.save(cell.index, &fitted.classifier.to_bytes()?)?;

            let record = CandidateRecord::scored(
                cell.index,
                cell.layers,
                cell.neurons,
                training_error,
                validation_error,
                self.overfitting_tolerance,
            );
            info!(
                index = cell.index,
                layers = cell.layers,
                neurons = cell.neurons,
                training_error,
                validation_error,
                valid = record.valid,
                "trained candidate"
            );
            ranked.insert(record);
        }

        Ok(ValidationReport::new(self.overfitting_tolerance, ranked.into_records()))
    }
}
