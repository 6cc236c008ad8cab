//! Provider endpoints: how a page becomes a request, and a response becomes records.

use despacho_types::{Granularity, Page, Record};
use serde_json::Value as Json;
use thiserror::Error;

use crate::{ParseError, Request, url::UrlError};

/// Errors raised while configuring an endpoint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EndpointError {
    /// The configured base URL is unusable.
    #[error(transparent)]
    Url(#[from] UrlError),

    /// The provider has no endpoint for this granularity.
    #[error("No endpoint serves {0} data")]
    UnsupportedGranularity(Granularity),
}

/// A paged provider endpoint.
///
/// Implementations are immutable values: the same page always produces the
/// same request.
pub trait Endpoint: Send + Sync {
    /// Builds the request for one page.
    fn request(&self, page: &Page) -> Request;

    /// Extracts the records of one page's response.
    ///
    /// # Errors
    ///
    /// Returns an error if the response does not have the provider's shape.
    fn records(&self, response: &Json) -> Result<Vec<Record>, ParseError>;
}

impl<E: Endpoint + ?Sized> Endpoint for &E {
    fn request(&self, page: &Page) -> Request {
        (**self).request(page)
    }

    fn records(&self, response: &Json) -> Result<Vec<Record>, ParseError> {
        (**self).records(response)
    }
}
