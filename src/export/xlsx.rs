//! Single-sheet XLSX export.

use rust_xlsxwriter::{Format, Workbook, Worksheet};
use serde_json::Value;

use crate::charts::NO_DATA_MESSAGE;
use crate::data::DataPoint;
use crate::error::Result;

const MIN_COLUMN_WIDTH: usize = 10;
const COLUMN_PADDING: usize = 2;
const MAX_SHEET_NAME: usize = 31;

/// Width of a column, in characters, for a header: header length plus padding, at least 10.
pub fn column_width(header: &str) -> usize {
    (header.chars().count() + COLUMN_PADDING).max(MIN_COLUMN_WIDTH)
}

fn sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(MAX_SHEET_NAME)
        .collect();
    let cleaned = cleaned.trim_matches('\'').trim().to_string();
    if cleaned.is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned
    }
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, value: Option<&Value>) -> Result<()> {
    match value {
        None | Some(Value::Null) => {}
        Some(Value::Number(n)) => match n.as_f64() {
            Some(number) => {
                worksheet.write_number(row, col, number)?;
            }
            None => {
                worksheet.write_string(row, col, n.to_string())?;
            }
        },
        Some(Value::String(s)) => {
            worksheet.write_string(row, col, s)?;
        }
        Some(Value::Bool(b)) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        Some(other) => {
            worksheet.write_string(row, col, other.to_string())?;
        }
    }
    Ok(())
}

/// Builds a workbook with one sheet named after `name`.
///
/// Row 0 holds the bold headers (keys of the first record); numbers stay numeric cells.  An
/// empty dataset produces a sheet holding only the "no data" message.
pub fn to_xlsx(records: &[DataPoint], name: &str) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name(name))?;

    match records.first() {
        None => {
            log::warn!("XLSX export requested for an empty dataset");
            worksheet.write_string(0, 0, NO_DATA_MESSAGE)?;
        }
        Some(first) => {
            let headers: Vec<&str> = first.keys().collect();
            let bold = Format::new().set_bold();
            for (col, header) in (0u16..).zip(&headers) {
                worksheet.write_string_with_format(0, col, *header, &bold)?;
                worksheet.set_column_width(col, column_width(header) as f64)?;
            }
            for (row, record) in (1u32..).zip(records) {
                for (col, header) in (0u16..).zip(&headers) {
                    write_cell(worksheet, row, col, record.get(header))?;
                }
            }
            log::debug!(
                "XLSX export: {} rows, {} columns",
                records.len(),
                headers.len()
            );
        }
    }

    Ok(workbook.save_to_buffer()?)
}
