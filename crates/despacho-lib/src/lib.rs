//! Async Rust client for the XM and SIMEM electricity-market data APIs.
//!
//! This is a facade crate that re-exports functionality from the despacho
//! workspace crates and adds the high-level clients:
//!
//! - [`XmClient`] - Metric/entity requests against the XM statistics API
//! - [`SimemClient`] - Dataset reads against the SIMEM public data API
//! - [`VariableReader`] - Catalog variables, resolved to one revision per month
//!
//! # Quick Start
//!
//! ```no_run
//! use despacho_lib::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let range = DateRange::new(
//!         chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!         chrono::NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
//!     )?;
//!
//!     let reader = VariableReader::connect(SimemClient::with_defaults()?).await?;
//!     let data = reader.read("PB_Nal", range, &VersionSelector::latest()).await?;
//!     println!("{} records, mean {:?}", data.records.len(), data.describe().mean);
//!
//!     let xm = XmClient::with_defaults().await?;
//!     let prices = xm.request_data("PrecBolsNaci", "Sistema", range, &[]).await?;
//!     println!("{} daily prices", prices.len());
//!
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/despacho/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod simem;
mod variable;
mod xm;

pub use config::{SimemConfig, XmConfig};
pub use error::{DespachoError, Result};
pub use simem::{CatalogKind, SimemClient, validate_dataset_id};
pub use variable::{STANDARD_VALUE_COLUMN, Summary, VariableData, VariableReader};
pub use xm::XmClient;

// Re-export core types
pub use despacho_types::*;

// Re-export catalogs
pub use despacho_catalog::{
    CatalogError, LIST_ENTITY_TYPE, MetricInventory, MetricSpec, VariableCatalog, VariableSpec,
};

// Re-export fetch functionality
pub use despacho_fetch::{
    ClientConfig, ColumnFilter, DatasetInfo, Endpoint, EndpointError, FetchError, HttpTransport,
    PageBatch, PageError, ParseError, Request, SimemEndpoint, Transport, TransportError,
    XmEndpoint, assemble, fetch_pages, fetch_pages_resilient, fetch_range, url,
};

// Re-export revision handling
pub use despacho_revisions::{
    VersionLabels, VersionResolver, coerce_record, coerce_records, merge, resolve,
};

/// Prelude module for convenient imports.
///
/// ```
/// use despacho_lib::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        DespachoError, Result, SimemClient, SimemConfig, Summary, VariableData, VariableReader,
        XmClient, XmConfig,
    };

    pub use despacho_types::{
        DateRange, DateRangeError, Granularity, Month, Page, Record, Value, VersionSelector,
    };

    pub use despacho_fetch::{ClientConfig, ColumnFilter, HttpTransport, Transport};

    pub use despacho_revisions::{VersionResolver, merge};
}
