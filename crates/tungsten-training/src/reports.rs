//! Report artifacts emitted by the search and testing stages.
//!
//! Reports are written as whole JSON documents via a temp-file rename so an
//! external viewer never observes a partially written record.

use crate::error::TrainingResult;
use crate::ranking::CandidateRecord;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Ranked outcome of one grid search pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub overfitting_tolerance: f64,
    pub best_classifiers: Vec<CandidateRecord>,
}

impl ValidationReport {
    pub fn new(overfitting_tolerance: f64, best_classifiers: Vec<CandidateRecord>) -> Self {
        Self {
            title: "Validation Report".to_string(),
            generated_at: Utc::now(),
            overfitting_tolerance,
            best_classifiers,
        }
    }

    /// Looks up a retained candidate by its grid index.
    pub fn find(&self, index: u32) -> Option<&CandidateRecord> {
        self.best_classifiers.iter().find(|c| c.index == index)
    }

    /// Index of the best-ranked valid candidate, 0 when none qualifies.
    pub fn first_valid_index(&self) -> u32 {
        self.best_classifiers
            .iter()
            .find(|c| c.valid)
            .map_or(0, |c| c.index)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportHyperParams {
    pub layers: u32,
    pub neurons: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestingErrors {
    pub validation_error: f64,
    pub testing_error: f64,
    pub generalization_tolerance: f64,
    pub error_difference: f64,
    pub passed: bool,
}

/// Holdout-test outcome for the chosen candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestingReport {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub classifier_id: u32,
    pub hyper_parameters: ReportHyperParams,
    pub errors: TestingErrors,
}

impl TestingReport {
    /// Compares holdout error against the candidate's validation error:
    /// `passed` iff the gap stays strictly within the tolerance.
    pub fn evaluate(
        candidate: &CandidateRecord,
        testing_error: f64,
        generalization_tolerance: f64,
    ) -> Self {
        let error_difference = testing_error - candidate.validation_error;
        Self {
            title: "Testing Report".to_string(),
            generated_at: Utc::now(),
            classifier_id: candidate.index,
            hyper_parameters: ReportHyperParams {
                layers: candidate.layers,
                neurons: candidate.neurons,
            },
            errors: TestingErrors {
                validation_error: candidate.validation_error,
                testing_error,
                generalization_tolerance,
                error_difference,
                passed: error_difference.abs() < generalization_tolerance,
            },
        }
    }
}

/// Diagnostic loss trace from one exploratory learning-curve run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LossTrace {
    pub generated_at: DateTime<Utc>,
    pub max_iter: u32,
    pub loss: Vec<f64>,
}

impl LossTrace {
    pub fn new(max_iter: u32, loss: Vec<f64>) -> Self {
        Self { generated_at: Utc::now(), max_iter, loss }
    }
}

/// Writes a JSON document atomically (write to temp, then rename).
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> TrainingResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, json)?;
    std::fs::rename(&temp_path, path)?;
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> TrainingResult<T> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn candidate(index: u32, valid: bool) -> CandidateRecord {
        CandidateRecord {
            index,
            layers: 2,
            neurons: 20,
            training_error: 0.1,
            validation_error: 0.12,
            error_difference: -0.02,
            valid,
        }
    }

    #[test]
    fn test_first_valid_index_skips_invalid_candidates() {
        let report = ValidationReport::new(0.1, vec![candidate(4, false), candidate(2, true)]);
        assert_eq!(report.first_valid_index(), 2);
    }

    #[test]
    fn test_first_valid_index_zero_when_empty() {
        let report = ValidationReport::new(0.1, vec![]);
        assert_eq!(report.first_valid_index(), 0);
    }

    #[test]
    fn test_testing_report_generalization_check() {
        let mut chosen = candidate(1, true);
        chosen.validation_error = 0.08;
        let report = TestingReport::evaluate(&chosen, 0.10, 0.05);
        assert!((report.errors.error_difference - 0.02).abs() < 1e-12);
        assert!(report.errors.passed);

        let failed = TestingReport::evaluate(&chosen, 0.20, 0.05);
        assert!(!failed.errors.passed);
    }

    #[test]
    fn test_write_and_read_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("reports").join("validation_report.json");
        let report = ValidationReport::new(0.07, vec![candidate(1, true)]);
        write_json(&path, &report).unwrap();
        let loaded: ValidationReport = read_json(&path).unwrap();
        assert_eq!(loaded.overfitting_tolerance, 0.07);
        assert_eq!(loaded.best_classifiers.len(), 1);
    }
}
