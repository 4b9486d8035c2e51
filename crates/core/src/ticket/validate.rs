//! Required-field validation for new submissions.

use serde::{Deserialize, Serialize};

use super::{TicketError, TicketSubmission};

/// Free-text submission fields that may be marked as required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    Name,
    Title,
    Description,
    BusinessCase,
}

impl RequiredField {
    /// Column order; validation reports the first missing field in this order.
    pub const ALL: [RequiredField; 4] = [
        RequiredField::Name,
        RequiredField::Title,
        RequiredField::Description,
        RequiredField::BusinessCase,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequiredField::Name => "name",
            RequiredField::Title => "title",
            RequiredField::Description => "description",
            RequiredField::BusinessCase => "business_case",
        }
    }

    fn value<'a>(&self, submission: &'a TicketSubmission) -> &'a str {
        match self {
            RequiredField::Name => &submission.name,
            RequiredField::Title => &submission.title,
            RequiredField::Description => &submission.description,
            RequiredField::BusinessCase => &submission.business_case,
        }
    }
}

/// Check that every required field is non-empty after trimming.
pub fn validate_submission(
    submission: &TicketSubmission,
    required: &[RequiredField],
) -> Result<(), TicketError> {
    for field in RequiredField::ALL {
        if required.contains(&field) && field.value(submission).trim().is_empty() {
            return Err(TicketError::MissingField(field.as_str()));
        }
    }

    Ok(())
}
