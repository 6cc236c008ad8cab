//! Provider catalogs for the despacho market-data client.
//!
//! Both providers publish a catalog describing what can be requested:
//!
//! - [`VariableCatalog`] - SIMEM variables and maestras, keyed by code
//! - [`MetricInventory`] - XM metric/entity pairs and their entity types
//!
//! Each implements [`despacho_types::SchemaLookup`], which is how the
//! retrieval clients learn a dataset's date, version and filter fields.
//!
//! # Example
//!
//! ```
//! use despacho_catalog::VariableCatalog;
//! use despacho_types::SchemaLookup;
//!
//! let catalog = VariableCatalog::from_json_str(
//!     r#"{"variable": {"PB_Nal": {"dataset_id": "EC6945", "date_column": "FechaHora"}}}"#,
//! )
//! .unwrap();
//!
//! let schema = catalog.schema("PB_Nal").unwrap();
//! assert_eq!(schema.dataset_id, "EC6945");
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/despacho/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod metrics;
mod variables;

pub use error::CatalogError;
pub use metrics::{LIST_ENTITY_TYPE, MetricInventory, MetricSpec};
pub use variables::{VariableCatalog, VariableSpec};
