use super::backend::StorageBackend;
use super::Database;
use crate::error::EngineError;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

pub struct FsBackend {
    root: PathBuf,
    name: String,
}

impl FsBackend {
    pub fn new(root: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            name: name.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn database_path(&self) -> PathBuf {
        self.root.join(format!("{}.json", self.name))
    }

    async fn ensure_dir(&self) -> Result<(), EngineError> {
        if fs::metadata(&self.root).await.is_err() {
            fs::create_dir_all(&self.root).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FsBackend {
    async fn load(&self) -> Result<Option<Database>, EngineError> {
        let content = match fs::read_to_string(self.database_path()).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(EngineError::Io(e)),
        };
        let db: Database = serde_json::from_str(&content)?;
        Ok(Some(db))
    }

    async fn commit(&self, db: &Database) -> Result<(), EngineError> {
        self.ensure_dir().await?;

        let content = serde_json::to_string_pretty(db)?;

        // Atomic write
        let tmp_path = self.root.join(format!(".{}-{}.tmp", self.name, Uuid::new_v4()));
        if let Err(e) = fs::write(&tmp_path, content).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(EngineError::Io(e));
        }
        if let Err(e) = fs::rename(&tmp_path, self.database_path()).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(EngineError::Io(e));
        }

        Ok(())
    }

    fn location(&self) -> String {
        self.database_path().display().to_string()
    }
}
