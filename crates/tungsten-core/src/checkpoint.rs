//! Durable workflow checkpoint.
//!
//! A single JSON record holds the current phase and every decision
//! accumulated so far, so a crash or deliberate shutdown between phases loses
//! no already-computed work. Writes are atomic (temp file + rename) and
//! synced before returning, because the controller relies on a `save`
//! surviving a crash immediately after it.

use crate::error::PipelineResult;
use crate::phase::Phase;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;
use tungsten_training::{AverageParams, CandidateRecord};

/// The singleton durable workflow record.
///
/// Fields other than `phase` are populated only once the phase that produces
/// them has executed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_iter: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_params: Option<AverageParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_classifier: Option<CandidateRecord>,
}

impl WorkflowState {
    fn initial() -> Self {
        Self::with_phase(Phase::Starting)
    }

    fn with_phase(phase: Phase) -> Self {
        Self { phase, max_iter: None, avg_params: None, best_classifier: None }
    }
}

/// Partial update merged into the state by [`CheckpointStore::save`].
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    pub phase: Option<Phase>,
    pub max_iter: Option<u32>,
    pub avg_params: Option<AverageParams>,
    pub best_classifier: Option<CandidateRecord>,
}

impl StateUpdate {
    pub fn phase(phase: Phase) -> Self {
        Self { phase: Some(phase), ..Self::default() }
    }
}

/// Owner of the workflow state record and its durability rules.
pub struct CheckpointStore {
    path: PathBuf,
    state: Mutex<WorkflowState>,
}

impl CheckpointStore {
    /// Loads the checkpoint, or starts fresh when none exists.
    ///
    /// A stored `Waiting` phase is rewritten to a fresh `Starting` state:
    /// Waiting only records that a listener was armed, with no durable proof
    /// the awaited data ever arrived, so trusting it after a restart could
    /// block the controller forever.
    pub fn load(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref().to_path_buf();
        let state = match std::fs::read_to_string(&path) {
            Ok(json) => {
                let stored: WorkflowState = serde_json::from_str(&json)?;
                if stored.phase == Phase::Waiting {
                    debug!("recovering torn Waiting checkpoint to Starting");
                    WorkflowState::initial()
                } else {
                    stored
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => WorkflowState::initial(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, state: Mutex::new(state) })
    }

    /// Merges the update into the in-memory state and durably rewrites the
    /// whole record. At most one write is in flight at a time.
    pub fn save(&self, update: StateUpdate) -> PipelineResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(phase) = update.phase {
            state.phase = phase;
        }
        if let Some(max_iter) = update.max_iter {
            state.max_iter = Some(max_iter);
        }
        if let Some(avg_params) = update.avg_params {
            state.avg_params = Some(avg_params);
        }
        if let Some(best) = update.best_classifier {
            state.best_classifier = Some(best);
        }
        self.persist(&state)
    }

    /// Discards this run's search results and returns to `Ready`, keeping the
    /// already-delivered dataset bundle in play. Used on reject-all.
    pub fn retry(&self) -> PipelineResult<()> {
        let mut state = self.state.lock().unwrap();
        *state = WorkflowState::with_phase(Phase::Ready);
        self.persist(&state)
    }

    /// Full reset to a fresh `Starting` state, in one atomic write.
    pub fn reset(&self) -> PipelineResult<()> {
        let mut state = self.state.lock().unwrap();
        *state = WorkflowState::initial();
        self.persist(&state)
    }

    pub fn phase(&self) -> Phase {
        self.state.lock().unwrap().phase
    }

    pub fn max_iter(&self) -> Option<u32> {
        self.state.lock().unwrap().max_iter
    }

    pub fn avg_params(&self) -> Option<AverageParams> {
        self.state.lock().unwrap().avg_params
    }

    pub fn best_classifier(&self) -> Option<CandidateRecord> {
        self.state.lock().unwrap().best_classifier.clone()
    }

    /// True until the first learning-curve iteration count is recorded.
    pub fn first_iter(&self) -> bool {
        self.state.lock().unwrap().max_iter.is_none()
    }

    pub fn snapshot(&self) -> WorkflowState {
        self.state.lock().unwrap().clone()
    }

    fn persist(&self, state: &WorkflowState) -> PipelineResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(state)?;
        let temp_path = self.path.with_extension("tmp");
        let mut file = File::create(&temp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(temp: &TempDir) -> CheckpointStore {
        CheckpointStore::load(temp.path().join("status.json")).unwrap()
    }

    #[test]
    fn test_missing_file_starts_fresh() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        assert_eq!(store.phase(), Phase::Starting);
        assert!(store.first_iter());
    }

    #[test]
    fn test_save_merges_and_round_trips() {
        let temp = TempDir::new().unwrap();
        {
            let store = store(&temp);
            store.save(StateUpdate::phase(Phase::Ready)).unwrap();
            store
                .save(StateUpdate { max_iter: Some(300), ..StateUpdate::default() })
                .unwrap();
        }
        let reloaded = store(&temp);
        assert_eq!(reloaded.phase(), Phase::Ready);
        assert_eq!(reloaded.max_iter(), Some(300));
    }

    #[test]
    fn test_waiting_checkpoint_recovers_to_starting() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("status.json");
        std::fs::write(
            &path,
            r#"{"phase": "Waiting", "max_iter": 500, "avg_params": {"layers": 2, "neurons": 20}}"#,
        )
        .unwrap();
        let store = CheckpointStore::load(&path).unwrap();
        assert_eq!(store.phase(), Phase::Starting);
        assert_eq!(store.max_iter(), None);
        assert!(store.avg_params().is_none());
    }

    #[test]
    fn test_retry_keeps_only_ready_phase() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store
            .save(StateUpdate {
                phase: Some(Phase::ValidationReport),
                max_iter: Some(750),
                avg_params: Some(AverageParams { layers: 2, neurons: 20 }),
                best_classifier: None,
            })
            .unwrap();
        store.retry().unwrap();
        assert_eq!(store.phase(), Phase::Ready);
        assert!(store.first_iter());
        assert!(store.avg_params().is_none());
    }

    #[test]
    fn test_reset_returns_to_starting() {
        let temp = TempDir::new().unwrap();
        {
            let store = store(&temp);
            store.save(StateUpdate::phase(Phase::Results)).unwrap();
            store.reset().unwrap();
        }
        let reloaded = store(&temp);
        assert_eq!(reloaded.phase(), Phase::Starting);
        assert!(reloaded.best_classifier().is_none());
    }

    #[test]
    fn test_corrupt_checkpoint_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("status.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(CheckpointStore::load(&path).is_err());
    }
}
