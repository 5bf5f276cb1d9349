//! Local durable source: one file per key.

use std::{
    io::ErrorKind as IoErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::{Source, SourceError, validate_key};
use crate::Result;

/// A [`Source`] storing each key as a file in a directory.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the target, so a crash mid-write never leaves a truncated value.
#[derive(Debug, Clone)]
pub struct FileSource {
    name: String,
    dir: PathBuf,
}

impl FileSource {
    /// Opens a file source rooted at `dir`, creating the directory if needed.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let name = format!("file:{}", dir.display());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| SourceError::Unavailable {
                source_name: name.clone(),
                key: String::new(),
                reason: format!("failed to create directory: {e}"),
            })?;
        Ok(Self { name, dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> std::result::Result<PathBuf, SourceError> {
        validate_key(key)?;
        Ok(self.dir.join(key))
    }

    fn unavailable(&self, key: &str, err: std::io::Error) -> SourceError {
        SourceError::Unavailable {
            source_name: self.name.clone(),
            key: key.to_string(),
            reason: err.to_string(),
        }
    }
}

#[async_trait]
impl Source for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == IoErrorKind::NotFound => Err(SourceError::NotFound {
                source_name: self.name.clone(),
                key: key.to_string(),
            }
            .into()),
            Err(e) => Err(self.unavailable(key, e).into()),
        }
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        // Leading dot keeps temp files out of the key namespace
        let tmp = self.dir.join(format!(".{key}.{}.tmp", Uuid::new_v4()));

        if let Err(e) = tokio::fs::write(&tmp, value).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(self.unavailable(key, e).into());
        }
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(self.unavailable(key, e).into());
        }

        debug!(source = %self.name, key, bytes = value.len(), "Wrote value");
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key)?;
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| self.unavailable(key, e).into())
    }
}
