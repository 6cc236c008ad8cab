//! The XM statistics API.
//!
//! Every XM call is a JSON POST to `{base}/{hourly|daily|monthly|annual|lists}`.
//! Responses wrap observations as `Items[].<EntityType>[]`, with the item's
//! `Date` applying to every entity under it.

use despacho_types::{Granularity, Page, Record};
use serde_json::{Map, Value as Json};
use url::Url;

use crate::{
    Endpoint, EndpointError, ParseError, Request,
    parse::normalize_items,
    url::build_url,
};

/// Metric id of the XM metric inventory list.
pub const INVENTORY_METRIC: &str = "ListadoMetricas";

const LIST_PATH: &str = "lists";
const LIST_ENTITIES_KEY: &str = "ListEntities";
const ITEMS_KEY: &str = "Items";
const DATE_KEY: &str = "Date";

/// An XM metric/entity request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmEndpoint {
    url: String,
    metric_id: String,
    entity: Option<String>,
    filter: Vec<String>,
    records_key: &'static str,
    ranged: bool,
}

impl XmEndpoint {
    /// Creates a date-ranged endpoint for a metric at the given granularity.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError::UnsupportedGranularity`] for granularities XM
    /// does not serve.
    pub fn new(
        base: &Url,
        granularity: Granularity,
        metric_id: impl Into<String>,
        entity: impl Into<String>,
    ) -> Result<Self, EndpointError> {
        let (Some(path), Some(records_key)) = (granularity.xm_path(), granularity.xm_entities_key())
        else {
            return Err(EndpointError::UnsupportedGranularity(granularity));
        };
        Ok(Self {
            url: build_url(base, path, &[]).into(),
            metric_id: metric_id.into(),
            entity: Some(entity.into()),
            filter: Vec::new(),
            records_key,
            ranged: true,
        })
    }

    /// Creates an endpoint for one of XM's undated lists.
    #[must_use]
    pub fn list(base: &Url, metric_id: impl Into<String>, entity: Option<String>) -> Self {
        Self {
            url: build_url(base, LIST_PATH, &[]).into(),
            metric_id: metric_id.into(),
            entity,
            filter: Vec::new(),
            records_key: LIST_ENTITIES_KEY,
            ranged: false,
        }
    }

    /// Creates the endpoint of the metric inventory.
    #[must_use]
    pub fn inventory(base: &Url) -> Self {
        Self::list(base, INVENTORY_METRIC, None)
    }

    /// Restricts the request to the given entity codes.
    #[must_use]
    pub fn with_filter(mut self, filter: Vec<String>) -> Self {
        self.filter = filter;
        self
    }

    /// Returns the request URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns true if requests carry a date range and should be paged.
    #[must_use]
    pub const fn is_ranged(&self) -> bool {
        self.ranged
    }

    /// Builds the JSON body for a page. Undated endpoints ignore the page.
    #[must_use]
    pub fn body(&self, page: &Page) -> Json {
        self.body_for(self.ranged.then_some(page))
    }

    /// Builds a request without a date range, as the lists endpoint expects.
    #[must_use]
    pub fn undated_request(&self) -> Request {
        Request::post(self.url.clone(), self.body_for(None))
    }

    fn body_for(&self, page: Option<&Page>) -> Json {
        let mut body = Map::new();
        body.insert("MetricId".into(), Json::from(self.metric_id.as_str()));
        if let Some(page) = page {
            body.insert("StartDate".into(), Json::from(page.start.to_string()));
            body.insert("EndDate".into(), Json::from(page.end.to_string()));
        }
        if let Some(entity) = &self.entity {
            body.insert("Entity".into(), Json::from(entity.as_str()));
        }
        if page.is_some() {
            body.insert("Filter".into(), Json::from(self.filter.clone()));
        }
        Json::Object(body)
    }
}

impl Endpoint for XmEndpoint {
    fn request(&self, page: &Page) -> Request {
        Request::post(self.url.clone(), self.body(page))
    }

    fn records(&self, response: &Json) -> Result<Vec<Record>, ParseError> {
        normalize_items(response, ITEMS_KEY, self.records_key, DATE_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::{XM_BASE_URL, parse_base};
    use chrono::NaiveDate;
    use serde_json::json;

    fn page() -> Page {
        Page::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
    }

    #[test]
    fn test_ranged_request() {
        let base = parse_base(XM_BASE_URL).unwrap();
        let endpoint = XmEndpoint::new(&base, Granularity::Hourly, "Gene", "Recurso")
            .unwrap()
            .with_filter(vec!["TBST".to_string()]);

        let request = endpoint.request(&page());
        assert_eq!(request.url, "https://servapibi.xm.com.co/hourly");
        assert_eq!(
            request.body,
            Some(json!({
                "MetricId": "Gene",
                "StartDate": "2024-01-01",
                "EndDate": "2024-01-31",
                "Entity": "Recurso",
                "Filter": ["TBST"]
            }))
        );
    }

    #[test]
    fn test_inventory_request_has_no_dates() {
        let base = parse_base(XM_BASE_URL).unwrap();
        let endpoint = XmEndpoint::inventory(&base);
        assert!(!endpoint.is_ranged());
        assert_eq!(endpoint.url(), "https://servapibi.xm.com.co/lists");
        assert_eq!(
            endpoint.request(&page()).body,
            Some(json!({"MetricId": "ListadoMetricas"}))
        );
        assert_eq!(endpoint.undated_request(), endpoint.request(&page()));
    }

    #[test]
    fn test_weekly_is_unsupported() {
        let base = parse_base(XM_BASE_URL).unwrap();
        assert_eq!(
            XmEndpoint::new(&base, Granularity::Weekly, "Gene", "Sistema"),
            Err(EndpointError::UnsupportedGranularity(Granularity::Weekly))
        );
    }

    #[test]
    fn test_daily_records() {
        let base = parse_base(XM_BASE_URL).unwrap();
        let endpoint = XmEndpoint::new(&base, Granularity::Daily, "PrecBolsNaci", "Sistema")
            .unwrap();
        let response = json!({
            "Items": [{
                "Date": "2024-01-01",
                "DailyEntities": [{"Id": "Sistema", "Value": 812.3}]
            }]
        });

        let records = endpoint.records(&response).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date("Date"), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(records[0].get("Value").and_then(|v| v.as_f64()), Some(812.3));
    }
}
