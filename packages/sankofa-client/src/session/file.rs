//! JSON file session store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::{SessionStore, StoredSession};
use crate::error::{ClientError, Result};

/// Persists the session as a JSON document on disk.
///
/// A missing file means "no session". Parent directories are created on the
/// first save.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn storage_error(path: &Path, err: impl std::fmt::Display) -> ClientError {
    ClientError::Storage(format!("{}: {}", path.display(), err))
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<StoredSession>> {
        match fs::read(&self.path).await {
            Ok(bytes) => {
                let session = serde_json::from_slice(&bytes)
                    .map_err(|e| storage_error(&self.path, e))?;
                Ok(Some(session))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error(&self.path, e)),
        }
    }

    async fn save(&self, session: &StoredSession) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error(parent, e))?;
        }

        let json = serde_json::to_vec_pretty(session)?;
        fs::write(&self.path, json)
            .await
            .map_err(|e| storage_error(&self.path, e))?;

        debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error(&self.path, e)),
        }
    }
}
