//! Local CSV file backend.
//!
//! Single-user: writes overwrite the file unconditionally and ignore the
//! precondition.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::{ContentId, PersistError, PersistenceBackend, Precondition};

/// Local file backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalFileConfig {
    /// Path of the CSV file (default: tickets.csv).
    #[serde(default = "default_path")]
    pub path: PathBuf,
}

impl Default for LocalFileConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

fn default_path() -> PathBuf {
    PathBuf::from("tickets.csv")
}

/// Stores the table as a plain file on disk.
pub struct LocalFileBackend {
    path: PathBuf,
}

impl LocalFileBackend {
    pub fn new(config: LocalFileConfig) -> Self {
        Self { path: config.path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn digest(content: &[u8]) -> ContentId {
        ContentId::new(format!("{:x}", Sha256::digest(content)))
    }
}

#[async_trait]
impl PersistenceBackend for LocalFileBackend {
    async fn read(&self) -> Result<Option<Vec<u8>>, PersistError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                debug!("Read {} bytes from {:?}", bytes.len(), self.path);
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No ticket file at {:?}", self.path);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn probe(&self) -> Result<Option<ContentId>, PersistError> {
        Ok(self.read().await?.map(|bytes| Self::digest(&bytes)))
    }

    async fn write(
        &self,
        content: &[u8],
        _precondition: Precondition,
    ) -> Result<ContentId, PersistError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        // A crash mid-write leaves the previous file in place.
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!("Wrote {} bytes to {:?}", content.len(), self.path);
        Ok(Self::digest(content))
    }

    fn name(&self) -> &'static str {
        "local"
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
