//! The SIMEM public data API.

use chrono::NaiveDate;
use despacho_types::{Granularity, Page, Record, Value};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use url::Url;

use crate::{
    Endpoint, ParseError, Request,
    parse::records_at,
    url::build_url,
};

const PUBLIC_DATA_PATH: &str = "PublicData";
const RECORDS_PATH: [&str; 2] = ["result", "records"];

/// Restricts a SIMEM request to rows whose `column` holds one of `values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFilter {
    /// Destination column name.
    pub column: String,
    /// Accepted values.
    pub values: Vec<String>,
}

impl ColumnFilter {
    /// Creates a filter.
    #[must_use]
    pub fn new(column: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            column: column.into(),
            values,
        }
    }
}

/// A SIMEM dataset request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimemEndpoint {
    base: Url,
    dataset_id: String,
    filter: Option<ColumnFilter>,
    report_failures: bool,
}

impl SimemEndpoint {
    /// Creates an endpoint for a dataset.
    #[must_use]
    pub fn new(base: &Url, dataset_id: impl Into<String>) -> Self {
        Self {
            base: base.clone(),
            dataset_id: dataset_id.into(),
            filter: None,
            report_failures: true,
        }
    }

    /// Restricts the request with a column filter.
    #[must_use]
    pub fn with_filter(mut self, filter: Option<ColumnFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// Stops logging `success: false` responses. The catalog datasets answer
    /// that way routinely.
    #[must_use]
    pub const fn quiet(mut self) -> Self {
        self.report_failures = false;
        self
    }

    /// Returns the dataset id.
    #[must_use]
    pub fn dataset_id(&self) -> &str {
        &self.dataset_id
    }

    /// Builds the request URL for a date span.
    #[must_use]
    pub fn url(&self, start: NaiveDate, end: NaiveDate) -> Url {
        let start = start.to_string();
        let end = end.to_string();
        let mut params = vec![
            ("startdate", start.as_str()),
            ("enddate", end.as_str()),
            ("datasetId", self.dataset_id.as_str()),
        ];
        let values = self.filter.as_ref().map(|f| f.values.join(","));
        if let (Some(filter), Some(values)) = (&self.filter, &values) {
            params.push(("columnDestinyName", filter.column.as_str()));
            params.push(("values", values.as_str()));
        }
        build_url(&self.base, PUBLIC_DATA_PATH, &params)
    }

    /// Builds the metadata request, pinned to a single reference date.
    #[must_use]
    pub fn info_request(&self, reference_date: NaiveDate) -> Request {
        Request::get(self.url(reference_date, reference_date))
    }
}

impl Endpoint for SimemEndpoint {
    fn request(&self, page: &Page) -> Request {
        Request::get(self.url(page.start, page.end))
    }

    fn records(&self, response: &Json) -> Result<Vec<Record>, ParseError> {
        if self.report_failures && response.get("success") != Some(&Json::Bool(true)) {
            tracing::warn!(
                dataset_id = %self.dataset_id,
                provider_message = response.get("message").and_then(Json::as_str).unwrap_or_default(),
                "provider reported an unsuccessful request"
            );
        }
        records_at(response, &RECORDS_PATH)
    }
}

/// Descriptive metadata of a SIMEM dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    /// Dataset id.
    pub dataset_id: String,
    /// Human-readable dataset name.
    pub name: String,
    /// Native granularity.
    pub granularity: Granularity,
    /// Granularity as labelled by the provider (e.g. `Horaria`).
    pub granularity_label: String,
    /// Column the provider filters dates on.
    pub date_filter: String,
    /// Column descriptions.
    pub columns: Vec<Record>,
    /// Remaining metadata fields.
    pub metadata: Record,
}

impl DatasetInfo {
    /// Reads dataset metadata from a SIMEM response.
    ///
    /// Unknown granularity labels read as [`Granularity::Unspecified`].
    ///
    /// # Errors
    ///
    /// Returns an error if `result.metadata` is missing or malformed.
    pub fn from_response(dataset_id: impl Into<String>, response: &Json) -> Result<Self, ParseError> {
        let result = response
            .get("result")
            .and_then(Json::as_object)
            .ok_or_else(|| ParseError::Missing("result".to_string()))?;
        let metadata = result
            .get("metadata")
            .ok_or_else(|| ParseError::Missing("result.metadata".to_string()))?
            .as_object()
            .ok_or_else(|| ParseError::NotAnObject("result.metadata".to_string()))?;
        let metadata = Record::from_json_object(metadata);

        let granularity_label = metadata
            .get("granularity")
            .map(Value::to_string)
            .unwrap_or_default();
        let text = |key: &str| {
            result
                .get(key)
                .and_then(Json::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Ok(Self {
            dataset_id: dataset_id.into(),
            name: text("name"),
            granularity: Granularity::from_label(&granularity_label),
            granularity_label,
            date_filter: text("filterDate"),
            columns: records_at(response, &["result", "columns"])?,
            metadata,
        })
    }

    /// Returns the paging resolution in days.
    #[must_use]
    pub const fn resolution(&self) -> u32 {
        self.granularity.resolution_days()
    }
}
