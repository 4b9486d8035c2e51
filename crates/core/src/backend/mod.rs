//! Persistence backends holding the serialized ticket table.
//!
//! A backend stores one blob of bytes and exposes a content identifier for
//! it. Writes carry a [`Precondition`] naming the identifier the writer last
//! saw; backends that can enforce it reject stale writes with
//! [`PersistError::Conflict`].

mod hosted;
mod local;

pub use hosted::{HostedFileBackend, HostedFileConfig};
pub use local::{LocalFileBackend, LocalFileConfig};

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{StorageBackend, StorageConfig};

/// Fingerprint of the stored content (a git blob sha, or a SHA-256 digest).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the writer believes the backend currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    /// Nothing stored yet; create the resource.
    Absent,
    /// The stored content must still carry this identifier.
    Matches(ContentId),
}

impl Precondition {
    /// Precondition for a write following a probe.
    pub fn from_probe(probed: Option<ContentId>) -> Self {
        match probed {
            Some(id) => Precondition::Matches(id),
            None => Precondition::Absent,
        }
    }
}

/// Errors from backend reads and writes.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Stored content changed since it was probed.
    #[error("Write rejected, stored content changed concurrently: {0}")]
    Conflict(String),

    /// Backend could not be reached (network failure, timeout).
    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    /// Backend refused the configured credentials.
    #[error("Backend rejected credentials: {0}")]
    Unauthorized(String),

    /// Backend returned an unexpected status.
    #[error("Backend error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Backend response could not be decoded.
    #[error("Failed to decode backend response: {0}")]
    Decode(String),

    /// Local filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend not configured (missing token, owner, path...).
    #[error("Backend not configured: {0}")]
    NotConfigured(String),
}

impl PersistError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            PersistError::Conflict(_) => "conflict",
            PersistError::Unreachable(_) => "unreachable",
            PersistError::Unauthorized(_) => "unauthorized",
            PersistError::Api { .. } => "api_error",
            PersistError::Decode(_) => "decode_error",
            PersistError::Io(_) => "io_error",
            PersistError::NotConfigured(_) => "not_configured",
        }
    }
}

impl From<reqwest::Error> for PersistError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            PersistError::Decode(e.to_string())
        } else {
            PersistError::Unreachable(e.to_string())
        }
    }
}

/// Storage medium for the serialized ticket table.
#[async_trait]
pub trait PersistenceBackend: Send + Sync {
    /// Read the stored bytes, or `None` when nothing has been stored yet.
    async fn read(&self) -> Result<Option<Vec<u8>>, PersistError>;

    /// Fetch the identifier of the stored content without its bytes.
    async fn probe(&self) -> Result<Option<ContentId>, PersistError>;

    /// Replace the stored bytes, returning the new content identifier.
    async fn write(
        &self,
        content: &[u8],
        precondition: Precondition,
    ) -> Result<ContentId, PersistError>;

    /// Name of this backend kind.
    fn name(&self) -> &'static str;

    /// Human-readable location of the stored table.
    fn location(&self) -> String;
}

/// Factory function to create a backend from config.
pub fn create_backend(config: &StorageConfig) -> Result<Arc<dyn PersistenceBackend>, PersistError> {
    match config.backend {
        StorageBackend::Local => {
            let local = config.local.clone().unwrap_or_default();
            Ok(Arc::new(LocalFileBackend::new(local)))
        }
        StorageBackend::Hosted => {
            let hosted = config.hosted.clone().ok_or_else(|| {
                PersistError::NotConfigured(
                    "[storage.hosted] must be set when using the hosted backend".to_string(),
                )
            })?;
            Ok(Arc::new(HostedFileBackend::new(hosted)?))
        }
    }
}
