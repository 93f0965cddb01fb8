//! Pipeline configuration.

use crate::error::{PipelineError, PipelineResult};
use serde::Deserialize;
use std::path::Path;
use tungsten_training::{HyperparameterGrid, ParamRange};

/// Grid-search settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ValidationConfig {
    #[serde(default = "default_grid")]
    pub hyper_parameters: HyperparameterGrid,
    /// Threshold on |training error - validation error|.
    #[serde(default = "default_overfitting_tolerance")]
    pub overfitting_tolerance: f64,
}

fn default_grid() -> HyperparameterGrid {
    HyperparameterGrid {
        layers: ParamRange { min: 1, max: 3, step: 1 },
        neurons: ParamRange { min: 10, max: 100, step: 30 },
    }
}

fn default_overfitting_tolerance() -> f64 {
    0.1
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            hyper_parameters: default_grid(),
            overfitting_tolerance: default_overfitting_tolerance(),
        }
    }
}

/// Holdout-test settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TestingConfig {
    /// Threshold on |test error - validation error|.
    #[serde(default = "default_generalization_tolerance")]
    pub generalization_tolerance: f64,
}

fn default_generalization_tolerance() -> f64 {
    0.1
}

impl Default for TestingConfig {
    fn default() -> Self {
        Self { generalization_tolerance: default_generalization_tolerance() }
    }
}

/// Which decision source answers the gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionMode {
    /// Human-edited decision file.
    File,
    /// Seeded simulator, for automated runs.
    Simulated,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DecisionConfig {
    #[serde(default = "default_decision_mode")]
    pub mode: DecisionMode,
    /// Seed for the simulated source; a given seed replays the same answers.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_decision_mode() -> DecisionMode {
    DecisionMode::File
}

fn default_seed() -> u64 {
    42
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self { mode: default_decision_mode(), seed: default_seed() }
    }
}

/// Promotion boundary settings.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PromotionConfig {
    /// Serving system intake URL; promotions are logged locally when unset.
    #[serde(default)]
    pub url: Option<String>,
}

/// Root configuration for a pipeline instance.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PipelineConfig {
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub testing: TestingConfig,
    #[serde(default)]
    pub decisions: DecisionConfig,
    #[serde(default)]
    pub promotion: PromotionConfig,
}

impl PipelineConfig {
    /// Loads and validates configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the file is unreadable, malformed
    /// or fails validation; nothing is mutated in that case.
    pub fn load(path: &Path) -> PipelineResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("cannot read config {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&json)
            .map_err(|e| PipelineError::Config(format!("malformed config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PipelineResult<()> {
        self.validation
            .hyper_parameters
            .validate()
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        if self.validation.overfitting_tolerance <= 0.0 {
            return Err(PipelineError::Config(
                "validation.overfitting_tolerance must be > 0".to_string(),
            ));
        }
        if self.testing.generalization_tolerance <= 0.0 {
            return Err(PipelineError::Config(
                "testing.generalization_tolerance must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.decisions.mode, DecisionMode::File);
        assert!(config.promotion.url.is_none());
    }

    #[test]
    fn test_load_from_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                "validation": {
                    "hyper_parameters": {
                        "layers": {"min": 1, "max": 2, "step": 1},
                        "neurons": {"min": 5, "max": 15, "step": 5}
                    },
                    "overfitting_tolerance": 0.05
                },
                "testing": {"generalization_tolerance": 0.02},
                "decisions": {"mode": "simulated", "seed": 9}
            }"#,
        )
        .unwrap();
        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.validation.overfitting_tolerance, 0.05);
        assert_eq!(config.decisions.mode, DecisionMode::Simulated);
        assert_eq!(config.decisions.seed, 9);
        assert_eq!(config.validation.hyper_parameters.cell_count(), 6);
    }

    #[test]
    fn test_malformed_config_is_config_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, r#"{"validation": {"overfitting_tolerance": "high"}}"#).unwrap();
        assert!(matches!(PipelineConfig::load(&path), Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_zero_tolerance_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, r#"{"validation": {"overfitting_tolerance": 0.0}}"#).unwrap();
        assert!(matches!(PipelineConfig::load(&path), Err(PipelineError::Config(_))));
    }
}
