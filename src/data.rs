//! Render-only view models built from the JSON records returned by the dashboard API.
//!
//! A [`DataPoint`] is a thin wrapper around an ordered JSON object.  Field order follows the
//! source document, which matters for exports that derive their header row from the first
//! record.  Values are looked up lazily through [`DataPoint::number`] and [`DataPoint::text`] so
//! that charts and tables can share the same records without converting them up front.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// A single record: field name to number or string.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataPoint(Map<String, Value>);

impl DataPoint {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field and returns the updated record.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Returns the raw JSON value stored under `field`.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Iterates over field names in source order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of fields in the record.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the field as a finite number.
    ///
    /// JSON numbers are returned directly; strings are accepted when they parse as a finite
    /// number after trimming.  Everything else is `None`.
    pub fn number(&self, field: &str) -> Option<f64> {
        match self.0.get(field)? {
            Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    /// Returns the field as a number, treating missing and non-numeric values as zero.
    pub fn number_or_zero(&self, field: &str) -> f64 {
        self.number(field).unwrap_or(0.0)
    }

    /// Returns the field as display text.  Empty strings and nulls count as absent.
    pub fn text(&self, field: &str) -> Option<String> {
        match self.0.get(field)? {
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Whether the field holds a JSON number (numeric strings do not count).
    pub fn is_numeric(&self, field: &str) -> bool {
        matches!(self.0.get(field), Some(Value::Number(_)))
    }
}

impl From<Map<String, Value>> for DataPoint {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for DataPoint {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Decodes a JSON array of objects into records.
///
/// Non-object array entries are skipped with a warning rather than failing the whole batch.
pub fn records_from_json(input: &str) -> Result<Vec<DataPoint>> {
    let value: Value = serde_json::from_str(input)?;
    Ok(records_from_value(value))
}

/// Converts an already decoded JSON value into records.
///
/// Accepts an array of objects, or a single object which becomes one record.
pub fn records_from_value(value: Value) -> Vec<DataPoint> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match item {
                Value::Object(map) => Some(DataPoint(map)),
                other => {
                    log::warn!("skipping non-object record #{index}: {other}");
                    None
                }
            })
            .collect(),
        Value::Object(map) => vec![DataPoint(map)],
        other => {
            log::warn!("expected an array of records, got {other}");
            Vec::new()
        }
    }
}

/// One way of deriving a label from a record.
#[derive(Clone, Debug, PartialEq)]
enum LabelSource {
    Field(String),
    Synthesized(String),
}

/// Ordered list of label accessors; the first one producing a non-empty value wins.
///
/// ```
/// use dashboard_report::data::{DataPoint, LabelChain};
///
/// let chain = LabelChain::field("label")
///     .or_field("segment_client")
///     .or_synthesized("Segment");
/// let record = DataPoint::new().with("segment_client", "Premium");
/// assert_eq!(chain.resolve(&record, 0), "Premium");
/// assert_eq!(chain.resolve(&DataPoint::new(), 2), "Segment 3");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct LabelChain {
    sources: Vec<LabelSource>,
    max_chars: Option<usize>,
}

impl LabelChain {
    /// Starts a chain with an explicit label field.
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            sources: vec![LabelSource::Field(name.into())],
            max_chars: None,
        }
    }

    /// Appends a fallback field.
    pub fn or_field(mut self, name: impl Into<String>) -> Self {
        self.sources.push(LabelSource::Field(name.into()));
        self
    }

    /// Appends a synthesized `"{prefix} {n}"` fallback, `n` being the 1-based record position.
    pub fn or_synthesized(mut self, prefix: impl Into<String>) -> Self {
        self.sources.push(LabelSource::Synthesized(prefix.into()));
        self
    }

    /// Truncates resolved labels to at most `max_chars` characters, ellipsis included.
    pub fn truncated(mut self, max_chars: usize) -> Self {
        self.max_chars = Some(max_chars);
        self
    }

    /// Builds a chain from field names followed by a synthesized fallback.
    pub fn from_fields<I, S>(fields: I, prefix: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sources: fields
                .into_iter()
                .map(|f| LabelSource::Field(f.into()))
                .chain(std::iter::once(LabelSource::Synthesized(prefix.into())))
                .collect(),
            max_chars: None,
        }
    }

    /// Resolves the label for the record at position `index`.
    pub fn resolve(&self, point: &DataPoint, index: usize) -> String {
        let label = self
            .sources
            .iter()
            .find_map(|source| match source {
                LabelSource::Field(name) => point.text(name),
                LabelSource::Synthesized(prefix) => Some(format!("{} {}", prefix, index + 1)),
            })
            .unwrap_or_else(|| format!("Segment {}", index + 1));

        match self.max_chars {
            Some(max) => truncate_label(&label, max),
            None => label,
        }
    }
}

impl Default for LabelChain {
    fn default() -> Self {
        Self::field("label").or_synthesized("Segment")
    }
}

/// Shortens `label` to `max_chars` characters, replacing the tail with an ellipsis.
pub fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut truncated: String = label.chars().take(max_chars - 1).collect();
    truncated.push('…');
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn number_accepts_numeric_strings() {
        let point = DataPoint::new()
            .with("a", 12)
            .with("b", " 3.5 ")
            .with("c", "n/a")
            .with("d", true);
        assert_eq!(point.number("a"), Some(12.0));
        assert_eq!(point.number("b"), Some(3.5));
        assert_eq!(point.number("c"), None);
        assert_eq!(point.number("d"), None);
        assert_eq!(point.number_or_zero("missing"), 0.0);
    }

    #[test]
    fn text_treats_blank_as_missing() {
        let point = DataPoint::new().with("label", "  ").with("n", 4);
        assert_eq!(point.text("label"), None);
        assert_eq!(point.text("n").as_deref(), Some("4"));
    }

    #[test]
    fn chain_prefers_first_non_empty_field() {
        let chain = LabelChain::field("label").or_field("segment_client");
        let point = DataPoint::new()
            .with("label", "")
            .with("segment_client", "PME");
        assert_eq!(chain.resolve(&point, 0), "PME");
    }

    #[test]
    fn chain_truncates_with_ellipsis() {
        let chain = LabelChain::field("label").truncated(6);
        let point = DataPoint::new().with("label", "Grandes entreprises");
        assert_eq!(chain.resolve(&point, 0), "Grand…");
    }

    #[test]
    fn records_keep_field_order() {
        let records = records_from_value(json!([{ "z": 1, "a": 2 }, 5]));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].keys().collect::<Vec<_>>(), vec!["z", "a"]);
    }
}
