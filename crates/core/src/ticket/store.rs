//! Session-scoped ticket store.
//!
//! Owns the in-memory table for one session and routes every read and write
//! through a [`PersistenceBackend`]. A failed persist never rolls the table
//! back; the store instead reports unpersisted changes until a later persist
//! succeeds.

use std::sync::Arc;
use std::time::Instant;

use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

use crate::auth::AdminGrant;
use crate::backend::{ContentId, PersistenceBackend, Precondition};
use crate::metrics::{PERSIST_DURATION, PERSIST_TOTAL, SUBMISSIONS_REJECTED, TICKETS_SUBMITTED};
use crate::ticket::csv_codec::{parse_table, serialize_table};
use crate::ticket::{
    validate_submission, RequiredField, TicketError, TicketPatch, TicketRecord, TicketSubmission,
    TicketTable,
};

/// Source of the submission date.
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Result of a bulk update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The edited table equals the current one; nothing was written.
    Unchanged,
    /// The table was replaced and persisted.
    Saved,
}

/// Ticket store for one session.
pub struct TicketStore {
    backend: Arc<dyn PersistenceBackend>,
    required_fields: Vec<RequiredField>,
    table: TicketTable,
    unpersisted: bool,
    last_persist_error: Option<String>,
    clock: Clock,
}

impl TicketStore {
    /// Create a store with an empty table. Call [`TicketStore::reload`] (or use
    /// [`TicketStore::open`]) to pick up persisted data.
    pub fn new(backend: Arc<dyn PersistenceBackend>, required_fields: Vec<RequiredField>) -> Self {
        Self {
            backend,
            required_fields,
            table: TicketTable::new(),
            unpersisted: false,
            last_persist_error: None,
            clock: Arc::new(|| Local::now().date_naive()),
        }
    }

    /// Create a store and load the persisted table.
    pub async fn open(
        backend: Arc<dyn PersistenceBackend>,
        required_fields: Vec<RequiredField>,
    ) -> Result<Self, TicketError> {
        let mut store = Self::new(backend, required_fields);
        store.reload().await?;
        Ok(store)
    }

    /// Replace the date source.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn table(&self) -> &TicketTable {
        &self.table
    }

    pub fn required_fields(&self) -> &[RequiredField] {
        &self.required_fields
    }

    /// Whether the in-memory table holds changes the backend has not accepted.
    pub fn has_unpersisted_changes(&self) -> bool {
        self.unpersisted
    }

    pub fn last_persist_error(&self) -> Option<&str> {
        self.last_persist_error.as_deref()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn backend_location(&self) -> String {
        self.backend.location()
    }

    /// Read and parse the persisted table without touching the session.
    ///
    /// Absent data is an empty table; unparseable data is `CorruptData`.
    pub async fn load(&self) -> Result<TicketTable, TicketError> {
        match self.backend.read().await? {
            None => {
                info!(
                    "No persisted tickets at {}, starting empty",
                    self.backend.location()
                );
                Ok(TicketTable::new())
            }
            Some(bytes) => {
                let table = parse_table(&bytes)?;
                debug!(
                    "Loaded {} tickets from {}",
                    table.len(),
                    self.backend.location()
                );
                Ok(table)
            }
        }
    }

    /// Replace the session table with the persisted one, discarding any
    /// unpersisted changes.
    pub async fn reload(&mut self) -> Result<&TicketTable, TicketError> {
        let table = self.load().await?;
        if self.unpersisted {
            warn!(
                "Reload discarded unpersisted changes ({} tickets in memory)",
                self.table.len()
            );
        }
        self.table = table;
        self.unpersisted = false;
        self.last_persist_error = None;
        Ok(&self.table)
    }

    /// Validate a submission, append it as a new ticket and persist.
    ///
    /// Validation failures leave the table untouched and write nothing. A
    /// persist failure is returned as `TicketError::Persist` with the new
    /// ticket already in the table.
    pub async fn append(
        &mut self,
        submission: &TicketSubmission,
    ) -> Result<TicketRecord, TicketError> {
        if let Err(e) = validate_submission(submission, &self.required_fields) {
            if let TicketError::MissingField(field) = &e {
                SUBMISSIONS_REJECTED.with_label_values(&[*field]).inc();
            }
            return Err(e);
        }

        let id = self.table.next_id()?;
        let record = TicketRecord::from_submission(id, submission, (self.clock)());
        info!(
            "Ticket {} submitted: {:?} ({})",
            record.id, record.title, record.priority
        );
        self.table.push(record.clone());
        TICKETS_SUBMITTED.inc();

        self.persist().await?;
        Ok(record)
    }

    /// Replace the table with an externally edited copy.
    ///
    /// Equal tables are a no-op with no backend write. Edits may change any
    /// column except `id` and `date_submitted`, and may not add, drop or
    /// reorder rows.
    pub async fn update(
        &mut self,
        new_table: TicketTable,
        grant: &AdminGrant,
    ) -> Result<UpdateOutcome, TicketError> {
        if new_table == self.table {
            debug!("Bulk update from {} changed nothing", grant.user_id());
            return Ok(UpdateOutcome::Unchanged);
        }

        self.table.check_edit(&new_table)?;

        let changed = self
            .table
            .iter()
            .zip(new_table.iter())
            .filter(|(a, b)| a != b)
            .count();
        info!("{} edited {} ticket(s)", grant.user_id(), changed);

        self.table = new_table;
        self.persist().await?;
        Ok(UpdateOutcome::Saved)
    }

    /// Edit one ticket's mutable columns. Built on [`TicketStore::update`].
    pub async fn update_record(
        &mut self,
        id: &str,
        patch: &TicketPatch,
        grant: &AdminGrant,
    ) -> Result<TicketRecord, TicketError> {
        if self.table.get(id).is_none() {
            return Err(TicketError::NotFound(id.to_string()));
        }

        let records = self
            .table
            .iter()
            .cloned()
            .map(|mut record| {
                if record.id == id {
                    record.apply(patch);
                }
                record
            })
            .collect();
        let edited = TicketTable::from_records(records)?;

        self.update(edited, grant).await?;

        self.table
            .get(id)
            .cloned()
            .ok_or_else(|| TicketError::NotFound(id.to_string()))
    }

    /// Serialize the table and write it with an optimistic precondition.
    ///
    /// The precondition comes from a probe made just before the write. A
    /// concurrent writer between probe and write makes the backend reject
    /// the write as a conflict; there is no retry or merge here.
    pub async fn persist(&mut self) -> Result<ContentId, TicketError> {
        let backend = self.backend.name();
        let start = Instant::now();

        let result = self.write_table().await;

        PERSIST_DURATION
            .with_label_values(&[backend])
            .observe(start.elapsed().as_secs_f64());

        match result {
            Ok(id) => {
                PERSIST_TOTAL.with_label_values(&[backend, "ok"]).inc();
                debug!(
                    "Persisted {} tickets to {} ({})",
                    self.table.len(),
                    self.backend.location(),
                    id
                );
                self.unpersisted = false;
                self.last_persist_error = None;
                Ok(id)
            }
            Err(e) => {
                let kind = match &e {
                    TicketError::Persist(p) => p.kind(),
                    _ => "encode_error",
                };
                PERSIST_TOTAL.with_label_values(&[backend, kind]).inc();
                warn!(
                    "Saved locally, not yet persisted to {}: {}",
                    self.backend.location(),
                    e
                );
                self.unpersisted = true;
                self.last_persist_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn write_table(&self) -> Result<ContentId, TicketError> {
        let bytes = serialize_table(&self.table)?;
        let precondition = Precondition::from_probe(self.backend.probe().await?);
        Ok(self.backend.write(&bytes, precondition).await?)
    }
}
