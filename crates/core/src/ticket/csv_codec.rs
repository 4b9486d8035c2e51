//! CSV text format for the ticket table.
//!
//! Header row lists every declared column; each following line is one
//! record in table order. Quoting follows the `csv` crate's defaults, so
//! delimiters, quotes and embedded newlines inside free text survive a
//! round trip.

use csv::{ReaderBuilder, Trim, WriterBuilder};

use super::types::{TicketRecord, COLUMNS};
use super::{TicketError, TicketTable};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Serialize a table to CSV bytes. An empty table yields just the header.
pub fn serialize_table(table: &TicketTable) -> Result<Vec<u8>, TicketError> {
    // Header written by hand so empty tables still carry the column set.
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer
        .write_record(COLUMNS)
        .map_err(|e| TicketError::Encode(e.to_string()))?;

    for record in table.iter() {
        writer
            .serialize(record)
            .map_err(|e| TicketError::Encode(format!("{}: {}", record.id, e)))?;
    }

    writer
        .into_inner()
        .map_err(|e| TicketError::Encode(e.to_string()))
}

/// Parse CSV bytes into a table.
///
/// Empty input is an empty table. Columns missing from older files take
/// their schema defaults; unknown columns are ignored. Any malformed row
/// fails the whole parse.
pub fn parse_table(bytes: &[u8]) -> Result<TicketTable, TicketError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(TicketTable::new());
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::Headers)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| TicketError::CorruptData(format!("unreadable header: {}", e)))?;
    if !headers.iter().any(|h| h == COLUMNS[0]) {
        return Err(TicketError::CorruptData(format!(
            "header has no {} column",
            COLUMNS[0]
        )));
    }

    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<TicketRecord>().enumerate() {
        let record = row.map_err(|e| {
            // Row 1 is the header.
            TicketError::CorruptData(format!("row {}: {}", index + 2, e))
        })?;
        records.push(record);
    }

    TicketTable::from_records(records)
}
