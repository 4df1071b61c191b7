//! Durable storage for snapshots and reports
//!
//! Snapshots overwrite their file atomically (temp file + rename); reports
//! always go to a new, uniquely named file.

use crate::error::PersistError;
use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// File holding the latest request observations
pub const PERFORMANCE_METRICS_FILE: &str = "performance-metrics.json";

/// File holding the latest health snapshots
pub const SYSTEM_HEALTH_FILE: &str = "system-health.json";

/// File holding the benchmark history
pub const BENCHMARKS_FILE: &str = "model-benchmarks.json";

/// File holding recorded predictions
pub const PREDICTIONS_FILE: &str = "model-predictions.json";

/// Give up on finding a free report name after this many collisions
const MAX_UNIQUE_ATTEMPTS: u32 = 1000;

/// Destination for serialized snapshots and reports
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Replace the contents of `file_name` with `contents`
    async fn write(&self, file_name: &str, contents: Vec<u8>) -> Result<PathBuf, PersistError>;

    /// Write `contents` to a new `<prefix>-<unix-millis>.json` file
    async fn write_unique(&self, prefix: &str, contents: Vec<u8>) -> Result<PathBuf, PersistError>;
}

/// Serialize a value as indented, human-readable JSON
pub fn to_pretty_json<T: Serialize + ?Sized>(
    what: &'static str,
    value: &T,
) -> Result<Vec<u8>, PersistError> {
    serde_json::to_vec_pretty(value).map_err(|source| PersistError::Serialize { what, source })
}

/// Store writing plain files into one directory
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn ensure_dir(&self) -> Result<(), PersistError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PersistError::io(&self.dir, e))
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn write(&self, file_name: &str, contents: Vec<u8>) -> Result<PathBuf, PersistError> {
        self.ensure_dir().await?;

        let path = self.dir.join(file_name);
        let temp_path = path.with_extension("tmp");

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .await
            .map_err(|e| PersistError::io(&temp_path, e))?;
        file.write_all(&contents)
            .await
            .map_err(|e| PersistError::io(&temp_path, e))?;
        file.sync_all()
            .await
            .map_err(|e| PersistError::io(&temp_path, e))?;
        drop(file);

        fs::rename(&temp_path, &path)
            .await
            .map_err(|e| PersistError::io(&path, e))?;

        Ok(path)
    }

    async fn write_unique(&self, prefix: &str, contents: Vec<u8>) -> Result<PathBuf, PersistError> {
        self.ensure_dir().await?;

        let millis = chrono::Utc::now().timestamp_millis();
        for attempt in 0..MAX_UNIQUE_ATTEMPTS {
            let name = if attempt == 0 {
                format!("{prefix}-{millis}.json")
            } else {
                format!("{prefix}-{millis}-{attempt}.json")
            };
            let path = self.dir.join(name);

            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(PersistError::io(&path, e)),
            };

            file.write_all(&contents)
                .await
                .map_err(|e| PersistError::io(&path, e))?;
            file.flush().await.map_err(|e| PersistError::io(&path, e))?;
            return Ok(path);
        }

        Err(PersistError::io(
            self.dir.join(format!("{prefix}-{millis}.json")),
            std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "no free report file name",
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_overwrites_previous_contents() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path());

        store.write("snap.json", b"[1,2,3]".to_vec()).await.unwrap();
        let path = store.write("snap.json", b"[4]".to_vec()).await.unwrap();

        let contents = fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents, "[4]");
        assert!(!dir.path().join("snap.tmp").exists());
    }

    #[tokio::test]
    async fn test_write_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileSnapshotStore::new(&nested);

        let path = store.write("x.json", b"{}".to_vec()).await.unwrap();
        assert!(path.starts_with(&nested));
    }

    #[tokio::test]
    async fn test_write_unique_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path());

        let first = store.write_unique("report", b"1".to_vec()).await.unwrap();
        let second = store.write_unique("report", b"2".to_vec()).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(fs::read_to_string(&first).await.unwrap(), "1");
        assert_eq!(fs::read_to_string(&second).await.unwrap(), "2");

        let name = first.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("report-"));
        assert!(name.ends_with(".json"));
    }

    #[tokio::test]
    async fn test_write_into_file_path_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();

        let store = FileSnapshotStore::new(&blocker);
        let result = store.write("snap.json", b"[]".to_vec()).await;

        assert!(matches!(result, Err(PersistError::Io { .. })));
    }

    #[test]
    fn test_to_pretty_json_is_indented() {
        let bytes = to_pretty_json("values", &vec![1, 2]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains('\n'));
    }
}
