use serde::{Deserialize, Serialize};

/// Maximum number of candidates retained in a validation report.
pub const MAX_RANKED: usize = 5;

/// One trained grid cell with its scores and overfitting verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub index: u32,
    pub layers: u32,
    pub neurons: u32,
    pub training_error: f64,
    pub validation_error: f64,
    pub error_difference: f64,
    pub valid: bool,
}

impl CandidateRecord {
    /// Builds a record from raw scores, deriving the error gap and the
    /// overfitting verdict (`|gap| < tolerance`, boundary exclusive).
    pub fn scored(
        index: u32,
        layers: u32,
        neurons: u32,
        training_error: f64,
        validation_error: f64,
        overfitting_tolerance: f64,
    ) -> Self {
        let error_difference = training_error - validation_error;
        Self {
            index,
            layers,
            neurons,
            training_error,
            validation_error,
            error_difference,
            valid: error_difference.abs() < overfitting_tolerance,
        }
    }
}

/// Bounded ranked list of the best candidates seen so far.
///
/// Ordered by ascending validation error; at equal error the earlier insert
/// keeps its position. Never holds more than [`MAX_RANKED`] records.
#[derive(Debug, Default)]
pub struct RankedCandidates {
    records: Vec<CandidateRecord>,
}

impl RankedCandidates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: CandidateRecord) {
        let pos = self
            .records
            .partition_point(|r| r.validation_error <= record.validation_error);
        self.records.insert(pos, record);
        self.records.truncate(MAX_RANKED);
    }

    pub fn records(&self) -> &[CandidateRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<CandidateRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(index: u32, validation_error: f64) -> CandidateRecord {
        CandidateRecord::scored(index, 1, 2, validation_error, validation_error, 0.1)
    }

    #[test]
    fn test_ranking_sorted_by_validation_error() {
        let mut ranked = RankedCandidates::new();
        ranked.insert(record(1, 0.3));
        ranked.insert(record(2, 0.1));
        ranked.insert(record(3, 0.2));
        let order: Vec<u32> = ranked.records().iter().map(|r| r.index).collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn test_ranking_caps_at_five() {
        let mut ranked = RankedCandidates::new();
        for i in 1..=7 {
            ranked.insert(record(i, f64::from(i) / 10.0));
        }
        assert_eq!(ranked.records().len(), MAX_RANKED);
        let order: Vec<u32> = ranked.records().iter().map(|r| r.index).collect();
        assert_eq!(order, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_worse_than_fifth_dropped_without_reordering() {
        let mut ranked = RankedCandidates::new();
        for i in 1..=5 {
            ranked.insert(record(i, f64::from(i) / 10.0));
        }
        ranked.insert(record(6, 0.9));
        let order: Vec<u32> = ranked.records().iter().map(|r| r.index).collect();
        assert_eq!(order, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_ties_keep_first_inserted_ahead() {
        let mut ranked = RankedCandidates::new();
        ranked.insert(record(1, 0.2));
        ranked.insert(record(2, 0.2));
        ranked.insert(record(3, 0.1));
        let order: Vec<u32> = ranked.records().iter().map(|r| r.index).collect();
        assert_eq!(order, vec![3, 1, 2]);
    }

    #[test]
    fn test_validity_boundary_is_exclusive() {
        let exactly_at = CandidateRecord::scored(1, 1, 1, 0.30, 0.20, 0.10);
        assert!(!exactly_at.valid);
        let just_inside = CandidateRecord::scored(2, 1, 1, 0.30, 0.21, 0.10);
        assert!(just_inside.valid);
        let negative_gap = CandidateRecord::scored(3, 1, 1, 0.10, 0.15, 0.10);
        assert!(negative_gap.valid);
        assert!((negative_gap.error_difference + 0.05).abs() < 1e-12);
    }
}
