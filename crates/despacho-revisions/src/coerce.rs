//! Column type coercion for provider records.

use chrono::NaiveDate;
use despacho_types::{Record, Value};

/// Converts numeric text to numbers and the date field to a date.
///
/// Only plain `YYYY-MM-DD` text becomes a date; timestamps keep their time
/// of day as text. Values that do not parse are left untouched, as are
/// non-text values.
pub fn coerce_record(record: &mut Record, date_field: &str) {
    for (name, value) in record.iter_mut() {
        let Value::Text(text) = value else {
            continue;
        };
        if name == date_field {
            if let Ok(date) = NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d") {
                *value = Value::Date(date);
            }
        } else if let Some(number) = parse_number(text) {
            *value = Value::Number(number);
        }
    }
}

/// Applies [`coerce_record`] to every record.
pub fn coerce_records(records: &mut [Record], date_field: &str) {
    for record in records {
        coerce_record(record, date_field);
    }
}

fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}
