use crate::error::PipelineResult;
use std::path::{Path, PathBuf};

/// Filesystem layout for all pipeline state under one root directory.
///
/// ```text
/// <root>/status.json             durable workflow checkpoint
/// <root>/learning_sets.json      the delivered dataset bundle
/// <root>/inbox/                  drop point watched by the intake listener
/// <root>/models/                 fitted artifacts, model_<index>.bin
/// <root>/reports/                learning_curve / validation / testing JSON
/// <root>/user_input.json         human decision file
/// ```
#[derive(Debug, Clone)]
pub struct PipelineLayout {
    root: PathBuf,
}

impl PipelineLayout {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn status_path(&self) -> PathBuf {
        self.root.join("status.json")
    }

    pub fn learning_sets_path(&self) -> PathBuf {
        self.root.join("learning_sets.json")
    }

    pub fn inbox_path(&self) -> PathBuf {
        self.root.join("inbox").join("learning_sets.json")
    }

    pub fn models_dir(&self) -> PathBuf {
        self.root.join("models")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.root.join("reports")
    }

    pub fn learning_curve_path(&self) -> PathBuf {
        self.reports_dir().join("learning_curve.json")
    }

    pub fn validation_report_path(&self) -> PathBuf {
        self.reports_dir().join("validation_report.json")
    }

    pub fn testing_report_path(&self) -> PathBuf {
        self.reports_dir().join("testing_report.json")
    }

    pub fn decision_file_path(&self) -> PathBuf {
        self.root.join("user_input.json")
    }

    pub fn ensure_dirs(&self) -> PipelineResult<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir_all(self.inbox_path().parent().unwrap_or(&self.root))?;
        std::fs::create_dir_all(self.models_dir())?;
        std::fs::create_dir_all(self.reports_dir())?;
        Ok(())
    }
}
