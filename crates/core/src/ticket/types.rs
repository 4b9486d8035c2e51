//! Ticket record schema and the closed value sets it draws from.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::TicketError;

/// Numeric suffix of the first ticket id (`PROJECT-1100`).
pub const ID_BASE: u64 = 1100;

/// Prefix shared by every ticket id.
pub const ID_PREFIX: &str = "PROJECT-";

/// On-disk format of `date_submitted`.
pub const DATE_FORMAT: &str = "%m-%d-%Y";

/// Declared columns in serialization order.
///
/// Must match the field order of [`TicketRecord`].
pub const COLUMNS: [&str; 12] = [
    "ID",
    "Name",
    "Title",
    "Description",
    "Business Case",
    "Status",
    "Priority",
    "Reviewed Priority",
    "ROI Hours Saved",
    "ROI Money Saved",
    "Department",
    "Date Submitted",
];

/// Format a ticket id from its numeric suffix.
pub fn format_ticket_id(suffix: u64) -> String {
    format!("{}{}", ID_PREFIX, suffix)
}

/// Extract the numeric suffix of a `PROJECT-<n>` id.
pub fn ticket_id_suffix(id: &str) -> Option<u64> {
    id.strip_prefix(ID_PREFIX)?.parse().ok()
}

/// Workflow status of a ticket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TicketStatus {
    #[default]
    Open,
    #[serde(rename = "Under Review")]
    UnderReview,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::Open,
        TicketStatus::UnderReview,
        TicketStatus::InProgress,
        TicketStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "Open",
            TicketStatus::UnderReview => "Under Review",
            TicketStatus::InProgress => "In Progress",
            TicketStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Submitter-assigned priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority assigned by a reviewer: unset, or a rank from 1 to 10.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ReviewedPriority {
    #[default]
    NotSet,
    Rank(u8),
}

impl ReviewedPriority {
    pub const NOT_SET_LABEL: &'static str = "Set After Review";
    pub const MAX_RANK: u8 = 10;

    /// Build a ranked value, rejecting anything outside 1..=10.
    pub fn rank(rank: u8) -> Result<Self, TicketError> {
        if (1..=Self::MAX_RANK).contains(&rank) {
            Ok(ReviewedPriority::Rank(rank))
        } else {
            Err(TicketError::InvalidValue {
                field: "reviewed_priority",
                value: rank.to_string(),
            })
        }
    }
}

impl fmt::Display for ReviewedPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewedPriority::NotSet => f.write_str(Self::NOT_SET_LABEL),
            ReviewedPriority::Rank(n) => write!(f, "{}", n),
        }
    }
}

impl FromStr for ReviewedPriority {
    type Err = TicketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed == Self::NOT_SET_LABEL {
            return Ok(ReviewedPriority::NotSet);
        }
        // Spreadsheet exports sometimes write ranks as floats ("3.0").
        let rank = trimmed
            .parse::<u8>()
            .ok()
            .or_else(|| {
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u8::MAX as f64)
                    .map(|f| f as u8)
            })
            .ok_or_else(|| TicketError::InvalidValue {
                field: "reviewed_priority",
                value: s.to_string(),
            })?;
        Self::rank(rank).map_err(|_| TicketError::InvalidValue {
            field: "reviewed_priority",
            value: s.to_string(),
        })
    }
}

impl TryFrom<String> for ReviewedPriority {
    type Error = TicketError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReviewedPriority> for String {
    fn from(value: ReviewedPriority) -> Self {
        value.to_string()
    }
}

/// Submitting department. The list is closed; the first entry is the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Department {
    #[default]
    Accounting,
    #[serde(rename = "Customer Service")]
    CustomerService,
    Engineering,
    Facilities,
    Finance,
    #[serde(rename = "Human Resources")]
    HumanResources,
    #[serde(rename = "Information Technology")]
    InformationTechnology,
    Legal,
    Marketing,
    Operations,
    Procurement,
    #[serde(rename = "Quality Assurance")]
    QualityAssurance,
    #[serde(rename = "Research and Development")]
    ResearchAndDevelopment,
    Sales,
}

impl Department {
    pub const ALL: [Department; 14] = [
        Department::Accounting,
        Department::CustomerService,
        Department::Engineering,
        Department::Facilities,
        Department::Finance,
        Department::HumanResources,
        Department::InformationTechnology,
        Department::Legal,
        Department::Marketing,
        Department::Operations,
        Department::Procurement,
        Department::QualityAssurance,
        Department::ResearchAndDevelopment,
        Department::Sales,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Accounting => "Accounting",
            Department::CustomerService => "Customer Service",
            Department::Engineering => "Engineering",
            Department::Facilities => "Facilities",
            Department::Finance => "Finance",
            Department::HumanResources => "Human Resources",
            Department::InformationTechnology => "Information Technology",
            Department::Legal => "Legal",
            Department::Marketing => "Marketing",
            Department::Operations => "Operations",
            Department::Procurement => "Procurement",
            Department::QualityAssurance => "Quality Assurance",
            Department::ResearchAndDevelopment => "Research and Development",
            Department::Sales => "Sales",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One submitted project ticket.
///
/// Serde names follow the CSV header. Every column except `ID` and
/// `Date Submitted` falls back to its schema default when absent, so files
/// written by older revisions with fewer columns still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketRecord {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Business Case", default)]
    pub business_case: String,
    #[serde(rename = "Status", default)]
    pub status: TicketStatus,
    #[serde(rename = "Priority", default)]
    pub priority: Priority,
    #[serde(rename = "Reviewed Priority", default)]
    pub reviewed_priority: ReviewedPriority,
    #[serde(
        rename = "ROI Hours Saved",
        default,
        deserialize_with = "lenient::hours"
    )]
    pub roi_hours_saved: u32,
    #[serde(
        rename = "ROI Money Saved",
        default,
        deserialize_with = "lenient::money"
    )]
    pub roi_money_saved: f64,
    #[serde(rename = "Department", default)]
    pub department: Department,
    #[serde(rename = "Date Submitted", with = "submitted_date")]
    pub date_submitted: NaiveDate,
}

impl TicketRecord {
    /// Build a record from a submission, applying schema defaults to every
    /// optional column left unspecified.
    pub fn from_submission(id: String, submission: &TicketSubmission, today: NaiveDate) -> Self {
        Self {
            id,
            name: submission.name.trim().to_string(),
            title: submission.title.trim().to_string(),
            description: submission.description.trim().to_string(),
            business_case: submission.business_case.trim().to_string(),
            status: TicketStatus::default(),
            priority: submission.priority.unwrap_or_default(),
            reviewed_priority: ReviewedPriority::default(),
            roi_hours_saved: submission.roi_hours_saved.unwrap_or(0),
            roi_money_saved: clamp_money(submission.roi_money_saved.unwrap_or(0.0)),
            department: submission.department.unwrap_or_default(),
            date_submitted: today,
        }
    }

    /// Apply an edit to the mutable columns.
    pub fn apply(&mut self, patch: &TicketPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(business_case) = &patch.business_case {
            self.business_case = business_case.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(reviewed) = patch.reviewed_priority {
            self.reviewed_priority = reviewed;
        }
        if let Some(hours) = patch.roi_hours_saved {
            self.roi_hours_saved = hours;
        }
        if let Some(money) = patch.roi_money_saved {
            self.roi_money_saved = clamp_money(money);
        }
        if let Some(department) = patch.department {
            self.department = department;
        }
    }

    /// Submission date rendered as `MM-DD-YYYY`.
    pub fn date_label(&self) -> String {
        self.date_submitted.format(DATE_FORMAT).to_string()
    }
}

/// Fields supplied by a submitter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub business_case: String,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub department: Option<Department>,
    #[serde(default)]
    pub roi_hours_saved: Option<u32>,
    #[serde(default)]
    pub roi_money_saved: Option<f64>,
}

/// Partial edit of one record. `id` and `date_submitted` are not editable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketPatch {
    pub name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub business_case: Option<String>,
    pub status: Option<TicketStatus>,
    pub priority: Option<Priority>,
    pub reviewed_priority: Option<ReviewedPriority>,
    pub roi_hours_saved: Option<u32>,
    pub roi_money_saved: Option<f64>,
    pub department: Option<Department>,
}

/// Money estimates are non-negative; NaN collapses to zero.
pub(crate) fn clamp_money(value: f64) -> f64 {
    if value.is_nan() || value < 0.0 {
        0.0
    } else {
        value
    }
}

mod submitted_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::DATE_FORMAT;

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Numeric columns written by spreadsheet tools may be empty or carry a
/// trailing `.0`. Empty reads as zero; hours must otherwise be a whole
/// non-negative count.
mod lenient {
    use serde::{Deserialize, Deserializer};

    fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
            return Ok(0.0);
        }
        trimmed.parse::<f64>().map_err(serde::de::Error::custom)
    }

    pub fn hours<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let value = number(deserializer)?;
        if value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
            return Err(serde::de::Error::custom(format!(
                "ROI Hours Saved must be a whole non-negative number, got {}",
                value
            )));
        }
        Ok(value as u32)
    }

    pub fn money<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        number(deserializer).map(super::clamp_money)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }

    #[test]
    fn test_ticket_id_round_trip() {
        assert_eq!(format_ticket_id(1100), "PROJECT-1100");
        assert_eq!(ticket_id_suffix("PROJECT-1107"), Some(1107));
        assert_eq!(ticket_id_suffix("TASK-1"), None);
        assert_eq!(ticket_id_suffix("PROJECT-abc"), None);
    }

    #[test]
    fn test_reviewed_priority_parse() {
        assert_eq!(
            "Set After Review".parse::<ReviewedPriority>().unwrap(),
            ReviewedPriority::NotSet
        );
        assert_eq!("".parse::<ReviewedPriority>().unwrap(), ReviewedPriority::NotSet);
        assert_eq!("7".parse::<ReviewedPriority>().unwrap(), ReviewedPriority::Rank(7));
        assert_eq!("3.0".parse::<ReviewedPriority>().unwrap(), ReviewedPriority::Rank(3));
        assert!("0".parse::<ReviewedPriority>().is_err());
        assert!("11".parse::<ReviewedPriority>().is_err());
        assert!("urgent".parse::<ReviewedPriority>().is_err());
    }

    #[test]
    fn test_reviewed_priority_display() {
        assert_eq!(ReviewedPriority::NotSet.to_string(), "Set After Review");
        assert_eq!(ReviewedPriority::Rank(10).to_string(), "10");
    }

    #[test]
    fn test_from_submission_applies_defaults() {
        let submission = TicketSubmission {
            title: "  Build dashboard ".to_string(),
            description: "x".to_string(),
            ..Default::default()
        };
        let record = TicketRecord::from_submission("PROJECT-1100".to_string(), &submission, today());

        assert_eq!(record.title, "Build dashboard");
        assert_eq!(record.status, TicketStatus::Open);
        assert_eq!(record.priority, Priority::Medium);
        assert_eq!(record.reviewed_priority, ReviewedPriority::NotSet);
        assert_eq!(record.roi_hours_saved, 0);
        assert_eq!(record.roi_money_saved, 0.0);
        assert_eq!(record.department, Department::Accounting);
        assert_eq!(record.date_label(), "03-07-2024");
    }

    #[test]
    fn test_from_submission_clamps_negative_money() {
        let submission = TicketSubmission {
            roi_money_saved: Some(-250.0),
            ..Default::default()
        };
        let record = TicketRecord::from_submission("PROJECT-1100".to_string(), &submission, today());
        assert_eq!(record.roi_money_saved, 0.0);
    }

    #[test]
    fn test_apply_patch_leaves_identity_alone() {
        let mut record =
            TicketRecord::from_submission("PROJECT-1100".to_string(), &TicketSubmission::default(), today());
        record.apply(&TicketPatch {
            status: Some(TicketStatus::InProgress),
            reviewed_priority: Some(ReviewedPriority::Rank(2)),
            roi_money_saved: Some(f64::NAN),
            ..Default::default()
        });

        assert_eq!(record.id, "PROJECT-1100");
        assert_eq!(record.date_submitted, today());
        assert_eq!(record.status, TicketStatus::InProgress);
        assert_eq!(record.reviewed_priority, ReviewedPriority::Rank(2));
        assert_eq!(record.roi_money_saved, 0.0);
    }

    #[test]
    fn test_status_serde_uses_display_names() {
        let json = serde_json::to_string(&TicketStatus::UnderReview).unwrap();
        assert_eq!(json, "\"Under Review\"");
        let parsed: TicketStatus = serde_json::from_str("\"In Progress\"").unwrap();
        assert_eq!(parsed, TicketStatus::InProgress);
    }

    #[test]
    fn test_department_list_is_closed() {
        assert_eq!(Department::ALL.len(), 14);
        assert_eq!(Department::ALL[0], Department::default());
        let parsed: Result<Department, _> = serde_json::from_str("\"Astronomy\"");
        assert!(parsed.is_err());
    }
}
