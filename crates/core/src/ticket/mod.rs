//! Project tickets: record schema, validation, CSV codec and the session store.

mod csv_codec;
mod error;
mod stats;
mod store;
mod table;
mod types;
mod validate;

pub use csv_codec::{parse_table, serialize_table};
pub use error::TicketError;
pub use stats::{PriorityCount, StatusCount, TicketStats};
pub use store::{Clock, TicketStore, UpdateOutcome};
pub use table::TicketTable;
pub use types::{
    format_ticket_id, ticket_id_suffix, Department, Priority, ReviewedPriority, TicketPatch,
    TicketRecord, TicketStatus, TicketSubmission, COLUMNS, DATE_FORMAT, ID_BASE, ID_PREFIX,
};
pub use validate::{validate_submission, RequiredField};
