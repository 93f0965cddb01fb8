//! Tungsten Training
//!
//! Training-side primitives for the model promotion pipeline:
//! - Dataset splits and the learning-sets bundle
//! - The 2-D hyperparameter grid and its fixed enumeration order
//! - The `Trainer` capability plus a built-in perceptron backend
//! - Grid search with bounded candidate ranking and model persistence
//! - Report artifacts (validation, testing, loss trace)

pub mod dataset;
pub mod error;
pub mod grid_search;
pub mod hyperparams;
pub mod perceptron;
pub mod ranking;
pub mod reports;
pub mod store;
pub mod trainer;

pub use dataset::{LearningSets, Split};
pub use error::{TrainingError, TrainingResult};
pub use grid_search::GridSearchEngine;
pub use hyperparams::{AverageParams, GridCell, HyperparameterGrid, ParamRange, TrainingParams};
pub use perceptron::{PerceptronModel, PerceptronTrainer};
pub use ranking::{CandidateRecord, RankedCandidates, MAX_RANKED};
pub use reports::{read_json, write_json, LossTrace, TestingReport, ValidationReport};
pub use store::ModelStore;
pub use trainer::{Classifier, FittedModel, Trainer};
