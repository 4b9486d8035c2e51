//! Testing utilities and mock implementations.
//!
//! This module provides an in-memory persistence backend and submission
//! fixtures, allowing store and API tests without a filesystem or network.
//!
//! # Example
//!
//! ```rust,ignore
//! use ticketdesk_core::testing::{fixtures, MockBackend};
//!
//! let backend = Arc::new(MockBackend::new());
//! backend.set_next_error(PersistError::Unreachable("offline".into())).await;
//!
//! // Use in AppState...
//! ```

mod mock_backend;

pub use mock_backend::{MockBackend, RecordedWrite};

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::NaiveDate;
    use std::sync::Arc;

    use crate::ticket::{Clock, Department, Priority, TicketSubmission};

    /// A complete submission with every required field filled in.
    pub fn submission(title: &str) -> TicketSubmission {
        TicketSubmission {
            name: "Dana Whitfield".to_string(),
            title: title.to_string(),
            description: format!("{} for the operations team", title),
            business_case: "Removes a weekly manual export".to_string(),
            priority: Some(Priority::Medium),
            department: Some(Department::Operations),
            roi_hours_saved: Some(10),
            roi_money_saved: Some(500.0),
        }
    }

    /// Clock pinned to one date.
    pub fn fixed_clock(year: i32, month: u32, day: u32) -> Clock {
        let date = NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date");
        Arc::new(move || date)
    }
}
