//! Error types shared across the despacho crates.

use chrono::NaiveDate;
use thiserror::Error;

/// Error for invalid date ranges.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    /// Start date is after end date.
    #[error("Invalid date range: {start} > {end}")]
    InvalidRange {
        /// The start date.
        start: NaiveDate,
        /// The end date.
        end: NaiveDate,
    },
}

/// Error returned when a date range cannot be split into request pages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SliceError {
    /// The paging resolution is zero days, usually because the dataset
    /// declares no usable granularity.
    #[error("Invalid paging resolution: {0} days")]
    InvalidResolution(u32),
}

/// Error returned when a record cannot be read as a revision.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RevisionError {
    /// A revision record is missing a required field or holds an unreadable value.
    #[error("Malformed revision record #{index}: field '{field}' {reason}")]
    MalformedRevision {
        /// Position of the record in the revision input.
        index: usize,
        /// The offending field name.
        field: String,
        /// What was wrong with it.
        reason: String,
    },
}

impl RevisionError {
    pub(crate) fn missing(index: usize, field: &str) -> Self {
        Self::MalformedRevision {
            index,
            field: field.to_string(),
            reason: "is missing".to_string(),
        }
    }

    pub(crate) fn unreadable(index: usize, field: &str, value: impl std::fmt::Display) -> Self {
        Self::MalformedRevision {
            index,
            field: field.to_string(),
            reason: format!("has unreadable value '{value}'"),
        }
    }
}
