use crate::dataset::Split;
use crate::error::TrainingResult;
use crate::hyperparams::TrainingParams;

/// A fitted model that can label feature rows and serialize itself.
pub trait Classifier: Send {
    fn predict(&self, features: &[Vec<f64>]) -> Vec<i64>;

    /// Serializes the fitted model for the model store / promotion boundary.
    fn to_bytes(&self) -> TrainingResult<Vec<u8>>;
}

/// Output of one training run: the fitted classifier plus the per-iteration
/// loss trace used for the exploratory learning curve.
pub struct FittedModel {
    pub classifier: Box<dyn Classifier>,
    pub loss_curve: Vec<f64>,
}

/// Training backend capability.
///
/// The pipeline never implements the fitting algorithm itself; it hands
/// parameters and a split to a `Trainer` and gets a fitted model back.
/// Candidates are trained strictly sequentially because a backend may reuse
/// internal state between fits.
pub trait Trainer: Send {
    fn id(&self) -> &'static str;

    fn train(&mut self, params: &TrainingParams, data: &Split) -> TrainingResult<FittedModel>;

    /// Rehydrates a classifier previously serialized with
    /// [`Classifier::to_bytes`].
    fn load(&self, bytes: &[u8]) -> TrainingResult<Box<dyn Classifier>>;
}
