//! Source document parser.
//!
//! Decodes the export as strict UTF-8, checks the header signature, then
//! turns each data row into an [`InputRecord`]. The whole document is
//! rejected at the first bad row; there is no partial result.

use crate::error::ParseError;
use crate::money::Amount;
use crate::record::{InputRecord, YearMonth};
use crate::schema::{Schema, COLUMN_COUNT};
use csv::{ReaderBuilder, StringRecord, Terminator, Trim};
use log::debug;
use std::str::FromStr;

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Parses a source document into records, in input order.
///
/// Lines end at `\n`; a `\r` before it is trimmed with the rest of the
/// trailing whitespace, while a lone `\r` is ordinary field content.
/// Blank and whitespace-only lines are skipped. An empty document, or one
/// holding only blank lines, yields no records.
pub fn parse(bytes: &[u8], schema: &Schema) -> Result<Vec<InputRecord>, ParseError> {
    let text = std::str::from_utf8(bytes).map_err(|e| ParseError::Encoding {
        offset: e.valid_up_to(),
    })?;
    let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);

    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .terminator(Terminator::Any(b'\n'))
        .from_reader(text.as_bytes());
    let mut rows = csv_reader
        .records()
        .filter(|result| !matches!(result, Ok(row) if is_blank(row)));

    let header = match rows.next() {
        Some(result) => result.map_err(|e| csv_error(text, e))?,
        None => return Ok(Vec::new()),
    };
    check_header(&header, schema)?;

    let mut records = Vec::new();
    for result in rows {
        let row = result.map_err(|e| csv_error(text, e))?;

        if row.len() != COLUMN_COUNT {
            return Err(ParseError::MalformedRow {
                line: line_of(text, &row),
                expected: COLUMN_COUNT,
                found: row.len(),
            });
        }

        let record = parse_row(&row, schema).map_err(|(field, value)| {
            ParseError::InvalidField {
                line: line_of(text, &row),
                field,
                value,
            }
        })?;
        debug!(
            "Row {}: {} / {} {} paid={} refunded={}",
            records.len() + 1,
            record.recipient_name,
            record.provider_name,
            record.period,
            record.amount_paid,
            record.amount_refunded
        );
        records.push(record);
    }

    Ok(records)
}

/// A whitespace-only line reads as a single empty field once trimmed.
fn is_blank(row: &StringRecord) -> bool {
    row.len() <= 1 && row.iter().all(str::is_empty)
}

fn check_header(header: &StringRecord, schema: &Schema) -> Result<(), ParseError> {
    let matches = header.len() == schema.input_header.len()
        && header
            .iter()
            .zip(&schema.input_header)
            .all(|(found, expected)| found == expected.trim());

    if matches {
        Ok(())
    } else {
        Err(ParseError::SchemaMismatch {
            expected: format!("v{} {}", schema.version, schema.input_header_line()),
            found: header.iter().collect::<Vec<_>>().join(","),
        })
    }
}

/// Builds a record from a row already known to have `COLUMN_COUNT` fields.
///
/// On failure returns the offending column name and its value.
fn parse_row(row: &StringRecord, schema: &Schema) -> Result<InputRecord, (&'static str, String)> {
    let field = |idx: usize| row.get(idx).unwrap_or_default();
    let invalid = |idx: usize, name: &'static str| (name, field(idx).to_string());

    let category = schema
        .input_categories
        .lookup(field(2))
        .ok_or_else(|| invalid(2, "category"))?;
    let amount_paid = Amount::from_str(field(3)).map_err(|_| invalid(3, "amount_paid"))?;
    let amount_refunded =
        Amount::from_str(field(4)).map_err(|_| invalid(4, "amount_refunded"))?;
    let period = YearMonth::from_str(field(5)).map_err(|_| invalid(5, "period"))?;

    Ok(InputRecord {
        recipient_name: field(0).to_string(),
        provider_name: field(1).to_string(),
        category,
        amount_paid,
        amount_refunded,
        period,
    })
}

fn line_of(text: &str, row: &StringRecord) -> u64 {
    row.position().map_or(0, |p| line_at(text, p.byte()))
}

/// 1-based physical line of the first content byte at or after `offset`.
///
/// The reader may report a record as starting at the terminator or blank
/// lines that precede it, so those are skipped before counting.
fn line_at(text: &str, offset: u64) -> u64 {
    let bytes = text.as_bytes();
    let mut pos = usize::try_from(offset).map_or(bytes.len(), |o| o.min(bytes.len()));
    while pos < bytes.len() && matches!(bytes[pos], b'\r' | b'\n') {
        pos += 1;
    }
    1 + bytes[..pos].iter().filter(|&&b| b == b'\n').count() as u64
}

fn csv_error(text: &str, err: csv::Error) -> ParseError {
    let line = err.position().map_or(0, |p| line_at(text, p.byte()));
    ParseError::Csv {
        line,
        message: err.to_string(),
    }
}
