//! Navigation of provider JSON responses into flat records.

use despacho_types::{Record, Value};
use serde_json::Value as Json;
use thiserror::Error;

/// Errors that can occur while reading a response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A node on the record path was not an object.
    #[error("Expected a JSON object at '{0}'")]
    NotAnObject(String),

    /// The record list was not an array.
    #[error("Expected a JSON array at '{0}'")]
    NotAnArray(String),

    /// A required node is absent.
    #[error("Missing '{0}' in response")]
    Missing(String),
}

/// Reads the array of record objects found at `path`.
///
/// A missing node anywhere on the path reads as no records; the providers
/// omit empty collections rather than sending `[]`.
///
/// # Errors
///
/// Returns an error if a node on the path has the wrong JSON type.
pub fn records_at(response: &Json, path: &[&str]) -> Result<Vec<Record>, ParseError> {
    let mut node = response;
    for (depth, key) in path.iter().enumerate() {
        let Some(object) = node.as_object() else {
            return Err(ParseError::NotAnObject(path[..depth].join(".")));
        };
        match object.get(*key) {
            Some(Json::Null) | None => return Ok(Vec::new()),
            Some(child) => node = child,
        }
    }

    let location = path.join(".");
    let items = node
        .as_array()
        .ok_or_else(|| ParseError::NotAnArray(location.clone()))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_object()
                .map(Record::from_json_object)
                .ok_or_else(|| ParseError::NotAnObject(format!("{location}[{index}]")))
        })
        .collect()
}

/// Flattens a list of items that each carry a nested record list.
///
/// For every object in `response[items_key]`, each entry of
/// `item[records_key]` becomes one record with nested objects flattened, and
/// `item[meta_key]` is attached to it under `meta_key`. Items without the
/// record list contribute nothing.
///
/// # Errors
///
/// Returns an error if an item or entry is not an object, or a list is not an
/// array.
pub fn normalize_items(
    response: &Json,
    items_key: &str,
    records_key: &str,
    meta_key: &str,
) -> Result<Vec<Record>, ParseError> {
    let Some(object) = response.as_object() else {
        return Err(ParseError::NotAnObject(String::new()));
    };
    let items = match object.get(items_key) {
        None | Some(Json::Null) => return Ok(Vec::new()),
        Some(Json::Array(items)) => items,
        Some(_) => return Err(ParseError::NotAnArray(items_key.to_string())),
    };

    let mut records = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let location = format!("{items_key}[{index}]");
        let item = item
            .as_object()
            .ok_or_else(|| ParseError::NotAnObject(location.clone()))?;
        let meta = item.get(meta_key).map(Value::from_json);

        let entries = match item.get(records_key) {
            None | Some(Json::Null) => continue,
            Some(Json::Array(entries)) => entries,
            Some(_) => return Err(ParseError::NotAnArray(format!("{location}.{records_key}"))),
        };

        for (entry_index, entry) in entries.iter().enumerate() {
            let entry = entry.as_object().ok_or_else(|| {
                ParseError::NotAnObject(format!("{location}.{records_key}[{entry_index}]"))
            })?;
            let mut record = Record::from_json_object(entry);
            if let Some(meta) = &meta {
                record.insert(meta_key, meta.clone());
            }
            records.push(record);
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_records_at_nested_path() {
        let response = json!({
            "success": true,
            "result": {"records": [
                {"Fecha": "2024-01-01", "Valor": "10.5"},
                {"Fecha": "2024-01-02", "Valor": "11"}
            ]}
        });
        let records = records_at(&response, &["result", "records"]).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].text("Valor"), Some("11"));
    }

    #[test]
    fn test_records_at_missing_is_empty() {
        let response = json!({"success": false, "result": null});
        assert!(records_at(&response, &["result", "records"]).unwrap().is_empty());
    }

    #[test]
    fn test_records_at_wrong_shape() {
        let response = json!({"result": {"records": {"a": 1}}});
        assert_eq!(
            records_at(&response, &["result", "records"]),
            Err(ParseError::NotAnArray("result.records".to_string()))
        );

        let response = json!({"result": {"records": [1]}});
        assert_eq!(
            records_at(&response, &["result", "records"]),
            Err(ParseError::NotAnObject("result.records[0]".to_string()))
        );

        let response = json!({"result": "oops"});
        assert_eq!(
            records_at(&response, &["result", "records"]),
            Err(ParseError::NotAnObject("result".to_string()))
        );
    }

    #[test]
    fn test_normalize_items_attaches_meta() {
        let response = json!({
            "Items": [
                {
                    "Date": "2024-01-01",
                    "HourlyEntities": [
                        {"Id": "Sistema", "Values": {"code": "Sistema", "Hour01": "1.5"}}
                    ]
                },
                {
                    "Date": "2024-01-02",
                    "HourlyEntities": [
                        {"Id": "Sistema", "Values": {"code": "Sistema", "Hour01": "2.5"}}
                    ]
                },
                {"Date": "2024-01-03"}
            ]
        });

        let records = normalize_items(&response, "Items", "HourlyEntities", "Date").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text("Values_Hour01"), Some("1.5"));
        assert_eq!(records[0].text("Values_code"), Some("Sistema"));
        assert_eq!(records[1].text("Date"), Some("2024-01-02"));
    }

    #[test]
    fn test_normalize_items_without_items() {
        let records = normalize_items(&json!({}), "Items", "DailyEntities", "Date").unwrap();
        assert!(records.is_empty());
    }
}
