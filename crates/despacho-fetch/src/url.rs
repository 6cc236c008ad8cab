//! Provider URL construction.

use thiserror::Error;
use url::Url;

/// Default base URL of the XM statistics API.
pub const XM_BASE_URL: &str = "https://servapibi.xm.com.co";

/// Default base URL of the SIMEM public data API.
pub const SIMEM_BASE_URL: &str = "https://www.simem.co/backend-files/api";

/// Default location of the SIMEM variable catalog.
pub const SIMEM_VARIABLES_URL: &str =
    "https://www.simem.co/backend-datos/vars/listado_variables.json";

/// Errors raised when a configured base URL is unusable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UrlError {
    /// The URL does not parse.
    #[error("Invalid base URL '{url}': {source}")]
    Invalid {
        /// The rejected URL.
        url: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },

    /// The URL cannot carry path segments (e.g. `mailto:`).
    #[error("Base URL '{0}' cannot carry a path")]
    NotABase(String),
}

/// Parses and validates a base URL so later [`build_url`] calls cannot fail.
///
/// # Errors
///
/// Returns an error if the URL does not parse or cannot carry a path.
pub fn parse_base(url: &str) -> Result<Url, UrlError> {
    let parsed = Url::parse(url).map_err(|source| UrlError::Invalid {
        url: url.to_string(),
        source,
    })?;
    if parsed.cannot_be_a_base() {
        return Err(UrlError::NotABase(url.to_string()));
    }
    Ok(parsed)
}

/// Builds a request URL from a base, one path segment and query parameters.
///
/// The base is never modified; calling this twice with the same arguments
/// yields the same URL. Parameters are form-encoded in the given order.
///
/// # Example
///
/// ```
/// use despacho_fetch::url::{build_url, parse_base};
///
/// let base = parse_base("https://servapibi.xm.com.co").unwrap();
/// let url = build_url(&base, "hourly", &[]);
/// assert_eq!(url.as_str(), "https://servapibi.xm.com.co/hourly");
/// ```
#[must_use]
pub fn build_url(base: &Url, path_segment: &str, params: &[(&str, &str)]) -> Url {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(path_segment);
    }
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params.iter().copied());
    }
    url
}
