use serde::{Deserialize, Serialize};

/// The closed set of pipeline phases.
///
/// Serialized as the variant name, which is also the on-disk checkpoint
/// representation. Transition handling is an exhaustive match in the
/// controller, so adding a variant fails to compile until it is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Fresh pipeline; the intake listener gets armed from here.
    Starting,
    /// Blocked until a learning-sets bundle is delivered.
    Waiting,
    /// Bundle received; average hyperparameters not yet computed.
    Ready,
    /// Exploratory runs to settle the iteration count.
    LearningCurve,
    /// Grid search over the full hyperparameter grid.
    Validation,
    /// Awaiting the candidate selection decision.
    ValidationReport,
    /// Holdout evaluation of the chosen candidate.
    Testing,
    /// Awaiting final approval of the test outcome.
    Results,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Starting => "Starting",
            Self::Waiting => "Waiting",
            Self::Ready => "Ready",
            Self::LearningCurve => "LearningCurve",
            Self::Validation => "Validation",
            Self::ValidationReport => "ValidationReport",
            Self::Testing => "Testing",
            Self::Results => "Results",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_serializes_as_variant_name() {
        let json = serde_json::to_string(&Phase::LearningCurve).unwrap();
        assert_eq!(json, "\"LearningCurve\"");
        let parsed: Phase = serde_json::from_str("\"ValidationReport\"").unwrap();
        assert_eq!(parsed, Phase::ValidationReport);
    }

    #[test]
    fn test_unknown_phase_rejected() {
        assert!(serde_json::from_str::<Phase>("\"Halted\"").is_err());
    }
}
