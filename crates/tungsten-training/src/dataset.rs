use crate::error::{TrainingError, TrainingResult};
use crate::trainer::Classifier;
use serde::{Deserialize, Serialize};

/// One labeled split: a table of feature rows plus parallel labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Split {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<i64>,
}

impl Split {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Checks the split is non-empty, parallel and rectangular.
    pub fn validate(&self, name: &str) -> TrainingResult<()> {
        if self.features.is_empty() {
            return Err(TrainingError::Dataset(format!("{name}: features are empty")));
        }
        if self.features.len() != self.labels.len() {
            return Err(TrainingError::Dataset(format!(
                "{name}: {} feature rows but {} labels",
                self.features.len(),
                self.labels.len()
            )));
        }
        let width = self.features[0].len();
        if width == 0 {
            return Err(TrainingError::Dataset(format!("{name}: feature rows are empty")));
        }
        for (idx, row) in self.features.iter().enumerate() {
            if row.len() != width {
                return Err(TrainingError::Dataset(format!(
                    "{name}: row {idx} has {} features, expected {width}",
                    row.len()
                )));
            }
        }
        Ok(())
    }

    /// Scores a classifier on this split as `1 - accuracy`.
    pub fn classification_error(&self, classifier: &dyn Classifier) -> f64 {
        let predictions = classifier.predict(&self.features);
        let correct = predictions
            .iter()
            .zip(self.labels.iter())
            .filter(|(p, l)| p == l)
            .count();
        1.0 - correct as f64 / self.labels.len() as f64
    }
}

/// The dataset bundle consumed exactly once per pipeline run: three disjoint
/// splits for training, validation and holdout testing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningSets {
    pub training_set: Split,
    pub validation_set: Split,
    pub test_set: Split,
}

impl LearningSets {
    /// Checks each split internally and that all three agree on the feature
    /// width, since a classifier fitted on one split scores the others.
    pub fn validate(&self) -> TrainingResult<()> {
        self.training_set.validate("training_set")?;
        self.validation_set.validate("validation_set")?;
        self.test_set.validate("test_set")?;

        let width = self.training_set.features[0].len();
        for (name, split) in [
            ("validation_set", &self.validation_set),
            ("test_set", &self.test_set),
        ] {
            let split_width = split.features[0].len();
            if split_width != width {
                return Err(TrainingError::Dataset(format!(
                    "{name} rows have {split_width} features, training_set rows have {width}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ConstantClassifier(i64);

    impl Classifier for ConstantClassifier {
        fn predict(&self, features: &[Vec<f64>]) -> Vec<i64> {
            vec![self.0; features.len()]
        }

        fn to_bytes(&self) -> TrainingResult<Vec<u8>> {
            Ok(vec![])
        }
    }

    fn split(rows: usize, ones: usize) -> Split {
        let features = vec![vec![1.0, 2.0]; rows];
        let mut labels = vec![0i64; rows];
        for label in labels.iter_mut().take(ones) {
            *label = 1;
        }
        Split { features, labels }
    }

    #[test]
    fn test_validate_rejects_mismatched_lengths() {
        let split = Split { features: vec![vec![1.0]], labels: vec![0, 1] };
        assert!(split.validate("training_set").is_err());
    }

    #[test]
    fn test_validate_rejects_ragged_rows() {
        let split = Split {
            features: vec![vec![1.0, 2.0], vec![1.0]],
            labels: vec![0, 1],
        };
        assert!(split.validate("training_set").is_err());
    }

    #[test]
    fn test_classification_error_is_one_minus_accuracy() {
        let split = split(10, 1);
        let error = split.classification_error(&ConstantClassifier(0));
        assert!((error - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_learning_sets_reject_mismatched_feature_widths() {
        let sets = LearningSets {
            training_set: split(4, 2),
            validation_set: split(4, 2),
            test_set: Split {
                features: vec![vec![1.0, 2.0, 3.0]; 4],
                labels: vec![0, 1, 0, 1],
            },
        };
        let err = sets.validate().unwrap_err();
        assert!(matches!(err, TrainingError::Dataset(_)));
        assert!(err.to_string().contains("test_set"));
    }

    #[test]
    fn test_learning_sets_validate_checks_all_splits() {
        let good = split(4, 2);
        let bad = Split { features: vec![], labels: vec![] };
        let sets = LearningSets {
            training_set: good.clone(),
            validation_set: good,
            test_set: bad,
        };
        assert!(sets.validate().is_err());
    }
}
