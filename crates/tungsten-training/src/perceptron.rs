//! Built-in training backend.
//!
//! A minimal multiclass perceptron usable without any external training
//! service. The grid's capacity knobs (layers, neurons) are recorded in the
//! artifact but do not change this linear baseline; the backend exists so the
//! pipeline can run end to end locally, not to win benchmarks.

use crate::dataset::Split;
use crate::error::{TrainingError, TrainingResult};
use crate::hyperparams::TrainingParams;
use crate::trainer::{Classifier, FittedModel, Trainer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Fitted perceptron: one weight row (plus bias) per class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerceptronModel {
    classes: Vec<i64>,
    weights: Vec<Vec<f64>>,
    params: TrainingParams,
}

impl PerceptronModel {
    fn score(&self, class_idx: usize, row: &[f64]) -> f64 {
        let w = &self.weights[class_idx];
        let bias = w[w.len() - 1];
        row.iter().zip(w.iter()).map(|(x, wi)| x * wi).sum::<f64>() + bias
    }

    fn predict_row(&self, row: &[f64]) -> usize {
        let mut best = 0;
        let mut best_score = self.score(0, row);
        for idx in 1..self.classes.len() {
            let score = self.score(idx, row);
            if score > best_score {
                best = idx;
                best_score = score;
            }
        }
        best
    }
}

impl Classifier for PerceptronModel {
    fn predict(&self, features: &[Vec<f64>]) -> Vec<i64> {
        features
            .iter()
            .map(|row| self.classes[self.predict_row(row)])
            .collect()
    }

    fn to_bytes(&self) -> TrainingResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Deterministic local trainer: runs up to `max_iter` perceptron epochs and
/// records the misclassification fraction of each epoch as the loss trace.
#[derive(Debug, Default, Clone)]
pub struct PerceptronTrainer;

impl PerceptronTrainer {
    pub fn new() -> Self {
        Self
    }
}

impl Trainer for PerceptronTrainer {
    fn id(&self) -> &'static str {
        "perceptron"
    }

    fn train(&mut self, params: &TrainingParams, data: &Split) -> TrainingResult<FittedModel> {
        data.validate("training_set")?;
        if params.max_iter == 0 {
            return Err(TrainingError::Trainer("max_iter must be >= 1".to_string()));
        }

        let classes: Vec<i64> = data.labels.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let width = data.features[0].len();
        let mut model = PerceptronModel {
            weights: vec![vec![0.0; width + 1]; classes.len()],
            classes,
            params: *params,
        };

        let mut loss_curve = Vec::new();
        for _epoch in 0..params.max_iter {
            let mut mistakes = 0usize;
            for (row, label) in data.features.iter().zip(data.labels.iter()) {
                let predicted = model.predict_row(row);
                let target = model
                    .classes
                    .binary_search(label)
                    .map_err(|_| TrainingError::Trainer("label missing from class set".to_string()))?;
                if predicted != target {
                    mistakes += 1;
                    for (i, x) in row.iter().enumerate() {
                        model.weights[target][i] += x;
                        model.weights[predicted][i] -= x;
                    }
                    model.weights[target][width] += 1.0;
                    model.weights[predicted][width] -= 1.0;
                }
            }
            loss_curve.push(mistakes as f64 / data.len() as f64);
            if mistakes == 0 {
                break;
            }
        }

        Ok(FittedModel { classifier: Box::new(model), loss_curve })
    }

    fn load(&self, bytes: &[u8]) -> TrainingResult<Box<dyn Classifier>> {
        let model: PerceptronModel = serde_json::from_slice(bytes)?;
        Ok(Box::new(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(max_iter: u32) -> TrainingParams {
        TrainingParams { max_iter, layers: 2, neurons: 20 }
    }

    fn separable() -> Split {
        Split {
            features: vec![
                vec![2.0, 1.0],
                vec![3.0, 0.5],
                vec![-2.0, -1.0],
                vec![-3.0, -0.5],
            ],
            labels: vec![1, 1, 0, 0],
        }
    }

    #[test]
    fn test_learns_linearly_separable_data() {
        let data = separable();
        let fitted = PerceptronTrainer::new().train(&params(100), &data).unwrap();
        assert_eq!(data.classification_error(&*fitted.classifier), 0.0);
        assert_eq!(fitted.loss_curve.last(), Some(&0.0));
        assert!(fitted.loss_curve.len() <= 100);
    }

    #[test]
    fn test_loss_curve_has_one_entry_per_epoch() {
        let data = Split {
            features: vec![vec![1.0], vec![1.0]],
            labels: vec![0, 1],
        };
        // Contradictory labels never converge; every epoch is recorded.
        let fitted = PerceptronTrainer::new().train(&params(15), &data).unwrap();
        assert_eq!(fitted.loss_curve.len(), 15);
    }

    #[test]
    fn test_round_trip_through_bytes() {
        let data = separable();
        let trainer = PerceptronTrainer::new();
        let fitted = PerceptronTrainer::new().train(&params(100), &data).unwrap();
        let bytes = fitted.classifier.to_bytes().unwrap();
        let reloaded = trainer.load(&bytes).unwrap();
        assert_eq!(reloaded.predict(&data.features), fitted.classifier.predict(&data.features));
    }

    #[test]
    fn test_zero_max_iter_rejected() {
        let data = separable();
        assert!(PerceptronTrainer::new().train(&params(0), &data).is_err());
    }
}
