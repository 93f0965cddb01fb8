use crate::error::{TrainingError, TrainingResult};
use std::path::{Path, PathBuf};

/// Filesystem store for fitted model artifacts, one file per candidate index.
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    /// Opens the store, creating the directory if needed.
    pub fn create(dir: impl AsRef<Path>) -> TrainingResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn model_path(&self, index: u32) -> PathBuf {
        self.dir.join(format!("model_{index}.bin"))
    }

    pub fn save(&self, index: u32, bytes: &[u8]) -> TrainingResult<()> {
        std::fs::write(self.model_path(index), bytes)?;
        Ok(())
    }

    pub fn load(&self, index: u32) -> TrainingResult<Vec<u8>> {
        let path = self.model_path(index);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(TrainingError::Store(
                format!("no stored model for candidate {index}"),
            )),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load_by_index() {
        let temp = TempDir::new().unwrap();
        let store = ModelStore::create(temp.path().join("models")).unwrap();
        store.save(3, b"weights").unwrap();
        assert_eq!(store.load(3).unwrap(), b"weights");
    }

    #[test]
    fn test_load_missing_index_is_store_error() {
        let temp = TempDir::new().unwrap();
        let store = ModelStore::create(temp.path()).unwrap();
        assert!(matches!(store.load(9), Err(TrainingError::Store(_))));
    }
}
