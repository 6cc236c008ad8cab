//! High-level client for the SIMEM public data API.

use chrono::{NaiveDate, Utc};
use despacho_catalog::VariableCatalog;
use despacho_fetch::{
    ClientConfig, ColumnFilter, DatasetInfo, Endpoint, HttpTransport, Request, SimemEndpoint,
    Transport, fetch_range, url::parse_base,
};
use despacho_types::{DateRange, Page, Record};
use url::Url;

use crate::{DespachoError, Result, SimemConfig};

const MAX_DATASET_ID_LEN: usize = 6;

/// The catalog datasets SIMEM publishes about itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    /// Every published dataset.
    Datasets,
    /// Every published variable.
    Variables,
}

/// Client for the SIMEM public data API.
#[derive(Debug)]
pub struct SimemClient<T = HttpTransport> {
    transport: T,
    base: Url,
    config: SimemConfig,
}

impl SimemClient<HttpTransport> {
    /// Creates a client for the public API with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_defaults() -> Result<Self> {
        let transport = HttpTransport::new(ClientConfig::default())?;
        Self::new(transport, SimemConfig::default())
    }
}

impl<T: Transport> SimemClient<T> {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn new(transport: T, config: SimemConfig) -> Result<Self> {
        Ok(Self {
            base: parse_base(&config.base_url)?,
            transport,
            config,
        })
    }

    /// Returns the transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &SimemConfig {
        &self.config
    }

    /// Fetches the metadata of a dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is malformed, the request fails or the
    /// response carries no metadata.
    #[tracing::instrument(skip(self))]
    pub async fn dataset_info(&self, dataset_id: &str) -> Result<DatasetInfo> {
        let dataset_id = validate_dataset_id(dataset_id)?;
        let request = SimemEndpoint::new(&self.base, dataset_id).info_request(self.config.reference_date);
        let response = self.transport.send(&request).await?;
        let info = DatasetInfo::from_response(dataset_id, &response)?;
        tracing::debug!(name = %info.name, granularity = %info.granularity, "dataset metadata");
        Ok(info)
    }

    /// Reads a dataset over a date range, paged at its declared granularity.
    ///
    /// # Errors
    ///
    /// Returns [`DespachoError::InvalidResolution`] if the dataset declares no
    /// pageable granularity, or an error if any request fails.
    pub async fn read(
        &self,
        dataset_id: &str,
        range: DateRange,
        filter: Option<ColumnFilter>,
    ) -> Result<Vec<Record>> {
        let info = self.dataset_info(dataset_id).await?;
        self.read_dataset(&info, range, filter).await
    }

    /// Reads a dataset whose metadata is already known.
    ///
    /// # Errors
    ///
    /// Returns [`DespachoError::InvalidResolution`] if the dataset declares no
    /// pageable granularity, or an error if any request fails.
    #[tracing::instrument(skip(self, info, filter), fields(dataset_id = %info.dataset_id))]
    pub async fn read_dataset(
        &self,
        info: &DatasetInfo,
        range: DateRange,
        filter: Option<ColumnFilter>,
    ) -> Result<Vec<Record>> {
        if !info.granularity.is_pageable() {
            return Err(DespachoError::InvalidResolution {
                dataset_id: info.dataset_id.clone(),
                granularity: info.granularity,
            });
        }
        let endpoint = SimemEndpoint::new(&self.base, info.dataset_id.as_str()).with_filter(filter);
        Ok(fetch_range(
            &self.transport,
            &endpoint,
            range,
            info.resolution(),
            self.config.concurrency,
        )
        .await?)
    }

    /// Reads one of the catalog datasets, from the reference date to today.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn catalog(&self, kind: CatalogKind) -> Result<Vec<Record>> {
        self.catalog_until(kind, Utc::now().date_naive()).await
    }

    /// Reads one of the catalog datasets up to `end`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn catalog_until(&self, kind: CatalogKind, end: NaiveDate) -> Result<Vec<Record>> {
        let dataset_id = match kind {
            CatalogKind::Datasets => &self.config.catalog_dataset_id,
            CatalogKind::Variables => &self.config.variable_inventory_id,
        };
        let endpoint = SimemEndpoint::new(&self.base, dataset_id.as_str()).quiet();
        let page = Page::new(self.config.reference_date, end);
        let response = self.transport.send(&endpoint.request(&page)).await?;
        Ok(endpoint.records(&response)?)
    }

    /// Downloads the variable catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the document is malformed.
    pub async fn variable_catalog(&self) -> Result<VariableCatalog> {
        let response = self
            .transport
            .send(&Request::get(self.config.variables_url.as_str()))
            .await?;
        let catalog = VariableCatalog::from_json(response)?;
        tracing::info!(variables = catalog.len(), "loaded variable catalog");
        Ok(catalog)
    }
}

/// Checks a SIMEM dataset id: at most six alphanumeric characters once
/// trimmed.
///
/// # Errors
///
/// Returns [`DespachoError::InvalidDatasetId`] otherwise.
pub fn validate_dataset_id(dataset_id: &str) -> Result<&str> {
    let trimmed = dataset_id.trim();
    if trimmed.is_empty()
        || trimmed.chars().count() > MAX_DATASET_ID_LEN
        || !trimmed.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(DespachoError::InvalidDatasetId(dataset_id.to_string()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use despacho_fetch::TransportError;
    use despacho_types::Granularity;
    use serde_json::{Value as Json, json};
    use std::sync::Mutex;

    /// Serves metadata for `HOURLY` and `NOGRAN`, and one record per page.
    #[derive(Default)]
    struct FakeSimem {
        urls: Mutex<Vec<String>>,
    }

    fn param(url: &str, name: &str) -> Option<String> {
        Url::parse(url)
            .ok()?
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    #[async_trait]
    impl Transport for FakeSimem {
        async fn send(&self, request: &Request) -> std::result::Result<Json, TransportError> {
            self.urls.lock().unwrap().push(request.url.clone());
            if request.url.ends_with("variables.json") {
                return Ok(json!({"variable": {"GReal": {"dataset_id": "E17D25"}}}));
            }
            let start = param(&request.url, "startdate").unwrap_or_default();
            let dataset = param(&request.url, "datasetId").unwrap_or_default();
            let granularity = if dataset == "NOGRAN" { "" } else { "Horaria" };
            Ok(json!({
                "success": true,
                "result": {
                    "name": dataset,
                    "metadata": {"granularity": granularity},
                    "records": [{"Fecha": start, "Valor": 1.0}]
                }
            }))
        }
    }

    fn client() -> SimemClient<FakeSimem> {
        let config = SimemConfig::default().with_variables_url("https://simem.test/variables.json");
        SimemClient::new(FakeSimem::default(), config).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_validate_dataset_id() {
        assert_eq!(validate_dataset_id(" EC6945 ").unwrap(), "EC6945");
        assert!(validate_dataset_id("e007fb").is_ok());
        assert!(validate_dataset_id("EC69451").is_err());
        assert!(validate_dataset_id("EC-694").is_err());
        assert!(validate_dataset_id("   ").is_err());
    }

    #[tokio::test]
    async fn test_dataset_info_is_pinned_to_reference_date() {
        let client = client();
        let info = client.dataset_info("HOURLY").await.unwrap();
        assert_eq!(info.granularity, Granularity::Hourly);

        let urls = client.transport.urls.lock().unwrap();
        assert_eq!(param(&urls[0], "startdate").as_deref(), Some("1990-01-01"));
        assert_eq!(param(&urls[0], "enddate").as_deref(), Some("1990-01-01"));
    }

    #[tokio::test]
    async fn test_read_pages_in_order() {
        let client = client();
        let range = DateRange::new(date(2024, 1, 1), date(2024, 3, 15)).unwrap();
        let records = client.read("HOURLY", range, None).await.unwrap();

        let starts: Vec<&str> = records.iter().filter_map(|r| r.text("Fecha")).collect();
        assert_eq!(starts, vec!["2024-01-01", "2024-02-01", "2024-03-03"]);
    }

    #[tokio::test]
    async fn test_read_without_granularity() {
        let client = client();
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 2)).unwrap();
        let result = client.read("NOGRAN", range, None).await;
        assert!(matches!(
            result,
            Err(DespachoError::InvalidResolution {
                granularity: Granularity::Unspecified,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_catalog_spans_from_reference_date() {
        let client = client();
        let records = client
            .catalog_until(CatalogKind::Variables, date(2024, 6, 1))
            .await
            .unwrap();
        assert_eq!(records.len(), 1);

        let urls = client.transport.urls.lock().unwrap();
        assert_eq!(param(&urls[0], "datasetId").as_deref(), Some("a5a6c4"));
        assert_eq!(param(&urls[0], "startdate").as_deref(), Some("1990-01-01"));
        assert_eq!(param(&urls[0], "enddate").as_deref(), Some("2024-06-01"));
    }

    #[tokio::test]
    async fn test_variable_catalog() {
        let catalog = client().variable_catalog().await.unwrap();
        assert_eq!(catalog.variable("GReal").unwrap().dataset_id, "E17D25");
    }
}
