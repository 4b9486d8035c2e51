//! Ordered collection of ticket records.

use std::collections::HashSet;

use super::types::{format_ticket_id, ticket_id_suffix, TicketRecord, COLUMNS, ID_BASE};
use super::TicketError;

/// The full ordered ticket table. Insertion order is the stored order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketTable {
    records: Vec<TicketRecord>,
}

impl TicketTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from records, rejecting duplicate ids.
    pub fn from_records(records: Vec<TicketRecord>) -> Result<Self, TicketError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id.as_str()) {
                return Err(TicketError::CorruptData(format!(
                    "duplicate ticket id {}",
                    record.id
                )));
            }
        }
        Ok(Self { records })
    }

    /// Declared column set, identical for empty and populated tables.
    pub fn columns(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    pub fn records(&self) -> &[TicketRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<TicketRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TicketRecord> {
        self.records.iter()
    }

    pub fn get(&self, id: &str) -> Option<&TicketRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Next id to assign: row count + 1100.
    ///
    /// Hand-edited files can hold larger suffixes than their row count; the
    /// id then continues after the largest one so it stays unique. A suffix
    /// already at `u64::MAX` leaves no id to continue with.
    pub fn next_id(&self) -> Result<String, TicketError> {
        let derived = self.records.len() as u64 + ID_BASE;
        let max_suffix = self
            .records
            .iter()
            .filter_map(|r| ticket_id_suffix(&r.id))
            .max();
        let after_max = match max_suffix {
            Some(max) => max.checked_add(1).ok_or_else(|| TicketError::InvalidValue {
                field: "id",
                value: format_ticket_id(max),
            })?,
            None => ID_BASE,
        };
        Ok(format_ticket_id(derived.max(after_max)))
    }

    /// Records ordered newest first by submission date, for display only.
    pub fn sorted_newest_first(&self) -> Vec<&TicketRecord> {
        let mut sorted: Vec<&TicketRecord> = self.records.iter().collect();
        sorted.sort_by(|a, b| b.date_submitted.cmp(&a.date_submitted));
        sorted
    }

    pub(crate) fn push(&mut self, record: TicketRecord) {
        self.records.push(record);
    }

    /// Confirm `edited` is an in-place edit of `self`: same rows, same order,
    /// same ids and submission dates.
    pub(crate) fn check_edit(&self, edited: &TicketTable) -> Result<(), TicketError> {
        if edited.len() != self.len() {
            let ticket_id = if edited.len() > self.len() {
                edited.records[self.len()].id.clone()
            } else {
                self.records[edited.len()].id.clone()
            };
            return Err(TicketError::ImmutableField {
                ticket_id,
                field: "row set",
            });
        }

        for (current, next) in self.records.iter().zip(edited.records.iter()) {
            if current.id != next.id {
                return Err(TicketError::ImmutableField {
                    ticket_id: current.id.clone(),
                    field: "id",
                });
            }
            if current.date_submitted != next.date_submitted {
                return Err(TicketError::ImmutableField {
                    ticket_id: current.id.clone(),
                    field: "date_submitted",
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticket::TicketSubmission;
    use chrono::NaiveDate;

    fn record(id: &str, day: u32) -> TicketRecord {
        TicketRecord::from_submission(
            id.to_string(),
            &TicketSubmission::default(),
            NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
        )
    }

    #[test]
    fn test_next_id_on_empty_table() {
        assert_eq!(TicketTable::new().next_id().unwrap(), "PROJECT-1100");
    }

    #[test]
    fn test_next_id_follows_row_count() {
        let table =
            TicketTable::from_records(vec![record("PROJECT-1100", 1), record("PROJECT-1101", 2)])
                .unwrap();
        assert_eq!(table.next_id().unwrap(), "PROJECT-1102");
    }

    #[test]
    fn test_next_id_skips_past_larger_suffix() {
        let table =
            TicketTable::from_records(vec![record("PROJECT-1100", 1), record("PROJECT-1150", 2)])
                .unwrap();
        assert_eq!(table.next_id().unwrap(), "PROJECT-1151");
    }

    #[test]
    fn test_next_id_exhausted_suffix() {
        let table = TicketTable::from_records(vec![record("PROJECT-18446744073709551615", 1)])
            .unwrap();
        let result = table.next_id();
        assert!(matches!(
            result,
            Err(TicketError::InvalidValue { field: "id", .. })
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result =
            TicketTable::from_records(vec![record("PROJECT-1100", 1), record("PROJECT-1100", 2)]);
        assert!(matches!(result, Err(TicketError::CorruptData(_))));
    }

    #[test]
    fn test_sorted_newest_first_keeps_stored_order() {
        let table = TicketTable::from_records(vec![
            record("PROJECT-1100", 3),
            record("PROJECT-1101", 9),
            record("PROJECT-1102", 1),
        ])
        .unwrap();

        let ids: Vec<&str> = table.sorted_newest_first().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["PROJECT-1101", "PROJECT-1100", "PROJECT-1102"]);
        assert_eq!(table.records()[0].id, "PROJECT-1100");
    }

    #[test]
    fn test_check_edit_rejects_id_change() {
        let table = TicketTable::from_records(vec![record("PROJECT-1100", 1)]).unwrap();
        let mut edited = table.clone();
        edited.records[0].id = "PROJECT-9999".to_string();

        let result = table.check_edit(&edited);
        assert!(matches!(result, Err(TicketError::ImmutableField { field: "id", .. })));
    }

    #[test]
    fn test_check_edit_rejects_date_change() {
        let table = TicketTable::from_records(vec![record("PROJECT-1100", 1)]).unwrap();
        let mut edited = table.clone();
        edited.records[0].date_submitted = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();

        let result = table.check_edit(&edited);
        assert!(matches!(
            result,
            Err(TicketError::ImmutableField { field: "date_submitted", .. })
        ));
    }

    #[test]
    fn test_check_edit_rejects_dropped_row() {
        let table =
            TicketTable::from_records(vec![record("PROJECT-1100", 1), record("PROJECT-1101", 2)])
                .unwrap();
        let edited = TicketTable::from_records(vec![record("PROJECT-1100", 1)]).unwrap();

        let result = table.check_edit(&edited);
        assert!(matches!(
            result,
            Err(TicketError::ImmutableField { ref ticket_id, field: "row set" }) if ticket_id == "PROJECT-1101"
        ));
    }

    #[test]
    fn test_check_edit_accepts_status_change() {
        let table = TicketTable::from_records(vec![record("PROJECT-1100", 1)]).unwrap();
        let mut edited = table.clone();
        edited.records[0].status = crate::ticket::TicketStatus::Completed;
        assert!(table.check_edit(&edited).is_ok());
    }
}
