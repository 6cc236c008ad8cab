//! Core types for the despacho market-data client.
//!
//! This crate provides the fundamental data structures used throughout despacho:
//!
//! - [`DateRange`] - Date range for data retrieval, split into [`Page`]s
//! - [`Granularity`] - Native dataset resolution and its paging limit
//! - [`Record`] - A flat observation row of [`Value`]s
//! - [`RevisionRecord`] - A published revision of a historical period
//! - [`ResolvedVersionWindow`] - The revision selected for a [`Month`]
//! - [`VersionSelector`] - Which revision a caller asks for
//! - [`DatasetSchema`] - Field layout supplied through [`SchemaLookup`]

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/despacho/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod date_range;
mod error;
mod granularity;
mod record;
mod revision;
mod schema;
mod selector;

pub use date_range::{DateRange, Month, Page, PageIterator, slice};
pub use error::{DateRangeError, RevisionError, SliceError};
pub use granularity::{Granularity, GranularityParseError};
pub use record::{FIELD_SEPARATOR, Record, Value, parse_date};
pub use revision::{ResolvedVersionWindow, RevisionFields, RevisionRecord};
pub use schema::{DatasetSchema, SchemaLookup};
pub use selector::VersionSelector;
