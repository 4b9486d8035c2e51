use thiserror::Error;

use crate::backend::PersistError;

/// Error type for ticket operations.
#[derive(Debug, Error)]
pub enum TicketError {
    /// A required submission field was empty after trimming.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Persisted table text could not be parsed.
    #[error("Stored ticket table is corrupt: {0}")]
    CorruptData(String),

    /// A bulk edit tried to change `id`, `date_submitted`, or the row set.
    #[error("Cannot change {field} of ticket {ticket_id}")]
    ImmutableField {
        ticket_id: String,
        field: &'static str,
    },

    /// A field value is outside its closed set.
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },

    /// Ticket not found.
    #[error("Ticket not found: {0}")]
    NotFound(String),

    /// The table could not be encoded as CSV.
    #[error("Failed to encode ticket table: {0}")]
    Encode(String),

    /// The in-memory change stands but could not be written to the backend.
    #[error("Saved locally, not yet persisted: {0}")]
    Persist(#[from] PersistError),
}

impl TicketError {
    /// Whether the in-memory table already holds the change that failed to
    /// persist.
    pub fn is_saved_locally(&self) -> bool {
        matches!(self, TicketError::Persist(_) | TicketError::Encode(_))
    }
}
