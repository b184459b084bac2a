//! Number formatting for tables, KPI cards and chart labels.

use serde_json::Value;

/// Separators used when printing numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NumberFormat {
    /// Inserted between groups of three integer digits.
    pub thousands: char,
    /// Separates the integer part from the fraction.
    pub decimal: char,
}

impl Default for NumberFormat {
    /// French conventions, matching the dashboard API field names and labels.
    fn default() -> Self {
        Self {
            thousands: ' ',
            decimal: ',',
        }
    }
}

impl NumberFormat {
    /// Formats `value` with at most `max_decimals` fraction digits, trailing zeros removed.
    pub fn number(&self, value: f64, max_decimals: usize) -> String {
        if !value.is_finite() {
            return "-".to_string();
        }
        let rendered = format!("{:.*}", max_decimals, value.abs());
        let (int_part, frac_part) = match rendered.split_once('.') {
            Some((int_part, frac)) => (int_part, frac.trim_end_matches('0')),
            None => (rendered.as_str(), ""),
        };

        let mut out = String::with_capacity(rendered.len() + int_part.len() / 3 + 1);
        let negative = value < 0.0 && (int_part != "0" || !frac_part.is_empty());
        if negative {
            out.push('-');
        }
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                out.push(self.thousands);
            }
            out.push(ch);
        }
        if !frac_part.is_empty() {
            out.push(self.decimal);
            out.push_str(frac_part);
        }
        out
    }

    /// Formats a percentage with one decimal, e.g. `42,5 %`.
    pub fn percent(&self, value: f64) -> String {
        format!("{} %", self.number(value, 1))
    }

    /// Formats a table cell.  Numbers get separators; other values print as text.
    pub fn cell(&self, value: Option<&Value>) -> String {
        match value {
            None | Some(Value::Null) => String::new(),
            Some(Value::Number(n)) => match n.as_f64() {
                Some(v) => self.number(v, 2),
                None => n.to_string(),
            },
            Some(Value::String(s)) => s.clone(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(other) => other.to_string(),
        }
    }
}

/// Formats `value` using [`NumberFormat::default`].
pub fn format_number(value: f64, max_decimals: usize) -> String {
    NumberFormat::default().number(value, max_decimals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_number(1_234_567.0, 0), "1 234 567");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(-45_000.5, 2), "-45 000,5");
    }

    #[test]
    fn drops_trailing_zeros() {
        assert_eq!(format_number(12.50, 2), "12,5");
        assert_eq!(format_number(12.0, 2), "12");
        assert_eq!(format_number(-0.001, 2), "0");
    }

    #[test]
    fn formats_percent() {
        let format = NumberFormat {
            thousands: ',',
            decimal: '.',
        };
        assert_eq!(format.percent(42.46), "42.5 %");
    }
}
