//! Versioned-record reconciliation for the despacho market-data client.
//!
//! This crate turns published revisions into the windows a caller asked for
//! and restricts value records to them:
//!
//! - [`VersionResolver`] - Per-month revision selection
//! - [`merge`] - Value records restricted to their resolved windows
//! - [`coerce_record`] - Numeric and date coercion of provider text

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/despacho/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod coerce;
mod merge;
mod resolver;

pub use coerce::{coerce_record, coerce_records};
pub use merge::merge;
pub use resolver::{VersionLabels, VersionResolver, resolve};
