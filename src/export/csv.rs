//! CSV serialization of records.
//!
//! The header comes from the keys of the first record and rows are separated by `\n` with no
//! trailing newline.  Fields holding a comma, a quote or a line break are quoted with inner
//! quotes doubled.

use std::io;

use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use serde_json::{Number, Value};

use crate::data::DataPoint;
use crate::error::Result;

fn field_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Serializes `records` to CSV text.  Empty input yields an empty string.
///
/// ```
/// use dashboard_report::data::DataPoint;
/// use dashboard_report::export::to_csv;
///
/// let rows = vec![DataPoint::new().with("a", 1).with("b", "x,y")];
/// assert_eq!(to_csv(&rows)?, "a,b\n1,\"x,y\"");
/// # Ok::<(), dashboard_report::ReportError>(())
/// ```
pub fn to_csv(records: &[DataPoint]) -> Result<String> {
    let Some(first) = records.first() else {
        log::warn!("CSV export requested for an empty dataset");
        return Ok(String::new());
    };
    let headers: Vec<&str> = first.keys().collect();

    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());
    writer.write_record(&headers)?;
    for record in records {
        writer.write_record(headers.iter().map(|key| field_text(record.get(key))))?;
    }

    let bytes = writer.into_inner().map_err(|err| err.into_error())?;
    let mut text =
        String::from_utf8(bytes).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    if text.ends_with('\n') {
        text.pop();
    }
    log::debug!("CSV export: {} rows, {} columns", records.len(), headers.len());
    Ok(text)
}

fn parse_field(field: &str) -> Value {
    if let Ok(int) = field.parse::<i64>() {
        return Value::Number(int.into());
    }
    match field.parse::<f64>().ok().and_then(Number::from_f64) {
        Some(number) => Value::Number(number),
        None => Value::String(field.to_string()),
    }
}

/// Reads CSV text with a header row back into records.
///
/// Integers and floats become JSON numbers; everything else stays text.
pub fn parse_csv(text: &str) -> Result<Vec<DataPoint>> {
    let mut reader = ReaderBuilder::new().from_reader(text.as_bytes());
    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        records.push(
            headers
                .iter()
                .zip(row.iter())
                .map(|(key, field)| (key.to_string(), parse_field(field)))
                .collect(),
        );
    }
    Ok(records)
}
