//! High-level client for the XM statistics API.

use despacho_catalog::{MetricInventory, MetricSpec};
use despacho_fetch::{
    ClientConfig, Endpoint, HttpTransport, Transport, XmEndpoint, fetch_range, url::parse_base,
};
use despacho_revisions::coerce_records;
use despacho_types::{DateRange, Record};
use url::Url;

use crate::{Result, XmConfig};

const DATE_FIELD: &str = "Date";

/// Client for the XM statistics API.
///
/// The metric inventory is loaded once at construction and every request is
/// checked against it.
#[derive(Debug)]
pub struct XmClient<T = HttpTransport> {
    transport: T,
    base: Url,
    config: XmConfig,
    inventory: MetricInventory,
}

impl XmClient<HttpTransport> {
    /// Connects to the public API with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the inventory
    /// cannot be fetched.
    pub async fn with_defaults() -> Result<Self> {
        let transport = HttpTransport::new(ClientConfig::default())?;
        Self::connect(transport, XmConfig::default()).await
    }
}

impl<T: Transport> XmClient<T> {
    /// Creates a client and loads the metric inventory.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the inventory cannot be
    /// fetched.
    pub async fn connect(transport: T, config: XmConfig) -> Result<Self> {
        let base = parse_base(&config.base_url)?;
        let inventory = fetch_inventory(&transport, &base).await?;
        tracing::info!(metrics = inventory.len(), "loaded XM metric inventory");
        Ok(Self {
            transport,
            base,
            config,
            inventory,
        })
    }

    /// Creates a client around an inventory already at hand.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn with_inventory(transport: T, config: XmConfig, inventory: MetricInventory) -> Result<Self> {
        Ok(Self {
            base: parse_base(&config.base_url)?,
            transport,
            config,
            inventory,
        })
    }

    /// Returns the metric inventory.
    #[must_use]
    pub const fn inventory(&self) -> &MetricInventory {
        &self.inventory
    }

    /// Returns the metrics offered, optionally narrowed to one metric id.
    #[must_use]
    pub fn collections<'a>(&'a self, metric_id: Option<&'a str>) -> Vec<&'a MetricSpec> {
        self.inventory
            .all()
            .filter(|m| metric_id.is_none_or(|id| m.metric_id == id))
            .collect()
    }

    /// Retrieves a metric for an entity over a date range.
    ///
    /// Dated metrics are paged at their granularity's resolution, capped by
    /// the metric's declared maximum span. List metrics are fetched with a
    /// single request and ignore the range. Numeric text is converted to
    /// numbers and `Date` to a date.
    ///
    /// `filters` narrows the request to the given entity codes; an empty
    /// slice requests every code.
    ///
    /// # Errors
    ///
    /// Returns an error if the metric/entity pair is not offered, its
    /// granularity is not served by XM, or a request fails.
    #[tracing::instrument(skip(self, filters), fields(filters = filters.len()))]
    pub async fn request_data(
        &self,
        metric_id: &str,
        entity: &str,
        range: DateRange,
        filters: &[String],
    ) -> Result<Vec<Record>> {
        let spec = self.inventory.require(metric_id, entity)?;

        let mut records = if spec.is_list() {
            let endpoint = XmEndpoint::list(&self.base, metric_id, Some(entity.to_string()));
            let response = self.transport.send(&endpoint.undated_request()).await?;
            endpoint.records(&response)?
        } else {
            let granularity = spec.granularity();
            let endpoint = XmEndpoint::new(&self.base, granularity, metric_id, entity)?
                .with_filter(filters.to_vec());
            let resolution = match spec.max_days {
                Some(max_days) if max_days > 0 => max_days.min(granularity.resolution_days()),
                _ => granularity.resolution_days(),
            };
            fetch_range(
                &self.transport,
                &endpoint,
                range,
                resolution,
                self.config.concurrency,
            )
            .await?
        };

        coerce_records(&mut records, DATE_FIELD);
        Ok(records)
    }
}

async fn fetch_inventory<T: Transport>(transport: &T, base: &Url) -> Result<MetricInventory> {
    let endpoint = XmEndpoint::inventory(base);
    let response = transport.send(&endpoint.undated_request()).await?;
    let records = endpoint.records(&response)?;
    Ok(MetricInventory::from_records(&records)?)
}
