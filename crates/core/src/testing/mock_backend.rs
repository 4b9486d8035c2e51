//! Mock persistence backend for testing.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::backend::{ContentId, PersistError, PersistenceBackend, Precondition};

/// A write the mock accepted, for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedWrite {
    /// Bytes written.
    pub content: Vec<u8>,
    /// Precondition the writer sent.
    pub precondition: Precondition,
}

/// In-memory backend that enforces preconditions the way a hosted file API
/// does.
///
/// Provides controllable behavior for testing:
/// - Seed stored content
/// - Fail the next operation with a chosen error
/// - Simulate another writer landing between probe and write
///
/// # Example
///
/// ```rust,ignore
/// use ticketdesk_core::testing::MockBackend;
///
/// let backend = Arc::new(MockBackend::new());
/// let mut store = TicketStore::new(backend.clone(), RequiredField::ALL.to_vec());
///
/// store.append(&submission).await?;
/// assert_eq!(backend.write_count().await, 1);
/// ```
#[derive(Debug)]
pub struct MockBackend {
    /// Stored bytes, `None` until the first write.
    content: Arc<Mutex<Option<Vec<u8>>>>,
    /// Accepted writes.
    writes: Arc<RwLock<Vec<RecordedWrite>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<PersistError>>>,
    /// If set, the next probe is followed by this foreign write.
    interleaved_write: Arc<RwLock<Option<Vec<u8>>>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create an empty mock backend.
    pub fn new() -> Self {
        Self {
            content: Arc::new(Mutex::new(None)),
            writes: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            interleaved_write: Arc::new(RwLock::new(None)),
        }
    }

    /// Create a mock backend already holding `content`.
    pub fn with_content(content: &[u8]) -> Self {
        let mut backend = Self::new();
        backend.content = Arc::new(Mutex::new(Some(content.to_vec())));
        backend
    }

    /// Identifier the mock assigns to `content`.
    pub fn content_id(content: &[u8]) -> ContentId {
        ContentId::new(format!("{:x}", Sha256::digest(content)))
    }

    /// Currently stored bytes.
    pub async fn stored(&self) -> Option<Vec<u8>> {
        self.content.lock().await.clone()
    }

    /// Currently stored bytes as UTF-8 text.
    pub async fn stored_text(&self) -> Option<String> {
        self.stored()
            .await
            .map(|b| String::from_utf8_lossy(&b).into_owned())
    }

    /// Replace the stored bytes directly, as another writer would.
    pub async fn set_content(&self, content: &[u8]) {
        *self.content.lock().await = Some(content.to_vec());
    }

    /// Number of accepted writes.
    pub async fn write_count(&self) -> usize {
        self.writes.read().await.len()
    }

    /// All accepted writes in order.
    pub async fn recorded_writes(&self) -> Vec<RecordedWrite> {
        self.writes.read().await.clone()
    }

    /// Make the next read, probe or write fail with `error`.
    pub async fn set_next_error(&self, error: PersistError) {
        *self.next_error.write().await = Some(error);
    }

    /// After the next probe returns, replace the stored bytes with `content`
    /// so that a write using the probed identifier conflicts.
    pub async fn write_between_probe_and_write(&self, content: Vec<u8>) {
        *self.interleaved_write.write().await = Some(content);
    }

    async fn take_error(&self) -> Result<(), PersistError> {
        match self.next_error.write().await.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PersistenceBackend for MockBackend {
    async fn read(&self) -> Result<Option<Vec<u8>>, PersistError> {
        self.take_error().await?;
        Ok(self.content.lock().await.clone())
    }

    async fn probe(&self) -> Result<Option<ContentId>, PersistError> {
        self.take_error().await?;
        let mut content = self.content.lock().await;
        let probed = content.as_deref().map(Self::content_id);

        if let Some(foreign) = self.interleaved_write.write().await.take() {
            *content = Some(foreign);
        }
        Ok(probed)
    }

    async fn write(
        &self,
        bytes: &[u8],
        precondition: Precondition,
    ) -> Result<ContentId, PersistError> {
        self.take_error().await?;

        // Check and swap under one lock so concurrent writers see a single order.
        let mut content = self.content.lock().await;
        let current = content.as_deref().map(Self::content_id);
        let accepted = match (&precondition, &current) {
            (Precondition::Absent, None) => true,
            (Precondition::Matches(expected), Some(actual)) => expected == actual,
            _ => false,
        };
        if !accepted {
            return Err(PersistError::Conflict(format!(
                "expected {:?}, found {:?}",
                precondition, current
            )));
        }

        *content = Some(bytes.to_vec());
        self.writes.write().await.push(RecordedWrite {
            content: bytes.to_vec(),
            precondition,
        });
        Ok(Self::content_id(bytes))
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
