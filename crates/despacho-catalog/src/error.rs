//! Catalog error types.

use thiserror::Error;

/// Errors raised while loading or querying a catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The catalog document is not valid JSON of the expected shape.
    #[error("Invalid catalog document: {0}")]
    Json(#[from] serde_json::Error),

    /// No variable is registered under this code.
    #[error("Unknown variable '{0}'")]
    UnknownVariable(String),

    /// No maestra is registered under this code.
    #[error("Unknown maestra '{0}'")]
    UnknownMaestra(String),

    /// The XM inventory has no such metric and entity pair.
    #[error("Unknown metric '{metric}' for entity '{entity}'")]
    UnknownMetric {
        /// Requested metric id.
        metric: String,
        /// Requested entity.
        entity: String,
    },

    /// An inventory row lacks a required field.
    #[error("Inventory row #{index} has no '{field}'")]
    MalformedInventory {
        /// Row position.
        index: usize,
        /// Missing field.
        field: &'static str,
    },
}
