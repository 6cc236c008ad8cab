//! Data fetching for the despacho market-data client.
//!
//! This crate provides the retrieval pipeline:
//!
//! - [`Transport`] - The request seam, with [`HttpTransport`] as the network implementation
//! - [`url::build_url`] - Constructs provider URLs
//! - [`XmEndpoint`] / [`SimemEndpoint`] - Provider requests and response navigation
//! - [`fetch_pages`] - Concurrent, order-preserving page download
//! - [`assemble`] - Page batches to one record sequence

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/despacho/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod endpoint;
mod pages;
pub mod parse;
mod simem;
mod transport;
pub mod url;
mod xm;

pub use client::{ClientConfig, HttpTransport};
pub use endpoint::{Endpoint, EndpointError};
pub use pages::{
    FetchError, PageBatch, PageError, assemble, fetch_pages, fetch_pages_resilient, fetch_range,
};
pub use parse::ParseError;
pub use simem::{ColumnFilter, DatasetInfo, SimemEndpoint};
pub use transport::{Request, Transport, TransportError};
pub use xm::{INVENTORY_METRIC, XmEndpoint};
