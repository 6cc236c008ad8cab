//! Error types for the high-level clients.

use despacho_catalog::CatalogError;
use despacho_fetch::{EndpointError, FetchError, ParseError, TransportError, url::UrlError};
use despacho_types::{DateRangeError, Granularity, RevisionError};
use thiserror::Error;

/// Result type alias using [`DespachoError`].
pub type Result<T> = std::result::Result<T, DespachoError>;

/// Errors that can occur while retrieving market data.
#[derive(Error, Debug)]
pub enum DespachoError {
    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// A configured URL is unusable.
    #[error(transparent)]
    Url(#[from] UrlError),

    /// An endpoint could not be built.
    #[error(transparent)]
    Endpoint(#[from] EndpointError),

    /// A single request failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A response could not be read.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A paged download failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A revision record was malformed.
    #[error(transparent)]
    Revision(#[from] RevisionError),

    /// A catalog lookup failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A date range was invalid.
    #[error(transparent)]
    DateRange(#[from] DateRangeError),

    /// The dataset id is not a SIMEM id.
    #[error("Invalid dataset id: {0:?}")]
    InvalidDatasetId(String),

    /// The dataset declares no granularity that can be paged.
    #[error("Dataset {dataset_id} has no pageable granularity ({granularity})")]
    InvalidResolution {
        /// Dataset id.
        dataset_id: String,
        /// The declared granularity.
        granularity: Granularity,
    },
}
