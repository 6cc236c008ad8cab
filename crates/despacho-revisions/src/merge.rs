//! Restricting value records to their resolved revision windows.

use despacho_types::{Month, Record, ResolvedVersionWindow, Value};
use std::collections::BTreeMap;

/// Keeps the values that fall inside a resolved window and tags them with
/// the window's label.
///
/// A value is kept when some window contains its date, both ends included.
/// If the value already carries `version_field`, the window's label must also
/// equal it. Values without a readable date or without a matching window are
/// dropped. Relative order is preserved.
#[must_use]
pub fn merge(
    values: Vec<Record>,
    windows: &BTreeMap<Month, Vec<ResolvedVersionWindow>>,
    date_field: &str,
    version_field: &str,
) -> Vec<Record> {
    let windows: Vec<&ResolvedVersionWindow> = windows.values().flatten().collect();
    let before = values.len();

    let merged: Vec<Record> = values
        .into_iter()
        .filter_map(|mut record| {
            let date = record.date(date_field)?;
            let carried = record.get(version_field).map(Value::to_string);
            let window = windows.iter().find(|w| {
                w.contains(date)
                    && carried
                        .as_deref()
                        .is_none_or(|label| label == w.version_label)
            })?;
            record.insert(version_field, window.version_label.as_str());
            Some(record)
        })
        .collect();

    tracing::debug!(kept = merged.len(), dropped = before - merged.len(), "merged values");
    merged
}
