//! Canonical text rendering of query result cells.
//!
//! Numbers never use exponent notation: integers print as plain decimals and
//! floats as fixed-point with trailing zeros (and a dangling `.`) removed.

use encoding_rs::Encoding;

use crate::data::Value;

pub fn format_float(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{value:.6}");
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Renders one cell. Blobs are read as text in `encoding`.
pub fn format_value(value: &Value, encoding: &'static Encoding) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => format_float(*f),
        Value::Text(s) => s.clone(),
        Value::Blob(bytes) => encoding.decode_without_bom_handling(bytes).0.into_owned(),
    }
}

pub fn format_row(row: &[Value], encoding: &'static Encoding) -> Vec<String> {
    row.iter().map(|value| format_value(value, encoding)).collect()
}
