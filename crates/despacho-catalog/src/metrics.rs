//! The XM metric inventory (`ListadoMetricas`).

use despacho_types::{DatasetSchema, Granularity, Record, SchemaLookup, Value};
use serde::{Deserialize, Serialize};

use crate::CatalogError;

/// Prefix XM puts on every inventory column.
const VALUES_PREFIX: &str = "Values_";

/// Entity type of metrics served from the undated lists endpoint.
pub const LIST_ENTITY_TYPE: &str = "ListsEntities";

/// One metric/entity pair offered by the XM API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSpec {
    /// Metric id, e.g. `Gene`.
    pub metric_id: String,
    /// Human-readable name.
    pub metric_name: String,
    /// Entity the metric is broken down by, e.g. `Recurso`.
    pub entity: String,
    /// Entity type, e.g. `HourlyEntities` or `ListsEntities`.
    pub entity_type: String,
    /// Largest span the provider accepts per request, when declared.
    pub max_days: Option<u32>,
    /// Units of measure.
    pub units: String,
    /// Free-text description.
    pub description: String,
}

impl MetricSpec {
    /// Returns the native granularity implied by the entity type.
    #[must_use]
    pub fn granularity(&self) -> Granularity {
        Granularity::from_label(&self.entity_type)
    }

    /// Returns true if the metric is an undated list.
    #[must_use]
    pub fn is_list(&self) -> bool {
        self.entity_type == LIST_ENTITY_TYPE
    }

    /// Returns the dataset schema of this metric.
    #[must_use]
    pub fn schema(&self) -> DatasetSchema {
        DatasetSchema::new(self.metric_id.clone(), self.granularity(), "Date")
            .with_dimensions(vec![self.entity.clone()])
    }

    fn from_record(record: &Record, index: usize) -> Result<Self, CatalogError> {
        let field = |name: &str| -> Option<&Value> {
            record
                .get(&format!("{VALUES_PREFIX}{name}"))
                .or_else(|| record.get(name))
                .filter(|v| !v.is_null())
        };
        let text = |name: &str| field(name).map(ToString::to_string).unwrap_or_default();
        let required = |name: &'static str| {
            field(name)
                .map(ToString::to_string)
                .ok_or(CatalogError::MalformedInventory { index, field: name })
        };

        let max_days = field("MaxDays").and_then(|v| match v {
            Value::Number(n) if *n >= 0.0 => Some(*n as u32),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        });

        Ok(Self {
            metric_id: required("MetricId")?,
            metric_name: text("MetricName"),
            entity: required("Entity")?,
            entity_type: required("Type")?,
            max_days,
            units: text("MetricUnits"),
            description: text("MetricDescription"),
        })
    }
}

/// The metrics offered by the XM API.
#[derive(Debug, Clone, Default)]
pub struct MetricInventory {
    metrics: Vec<MetricSpec>,
}

impl MetricInventory {
    /// Builds the inventory from the normalized `ListadoMetricas` records.
    ///
    /// Columns may carry XM's `Values_` prefix or not.
    ///
    /// # Errors
    ///
    /// Returns an error if a row lacks its metric id, entity or type.
    pub fn from_records(records: &[Record]) -> Result<Self, CatalogError> {
        let metrics = records
            .iter()
            .enumerate()
            .map(|(index, record)| MetricSpec::from_record(record, index))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { metrics })
    }

    /// Looks up a metric/entity pair.
    #[must_use]
    pub fn get(&self, metric_id: &str, entity: &str) -> Option<&MetricSpec> {
        self.metrics
            .iter()
            .find(|m| m.metric_id == metric_id && m.entity == entity)
    }

    /// Looks up a metric/entity pair, failing when it is not offered.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownMetric`] if the pair is not offered.
    pub fn require(&self, metric_id: &str, entity: &str) -> Result<&MetricSpec, CatalogError> {
        self.get(metric_id, entity)
            .ok_or_else(|| CatalogError::UnknownMetric {
                metric: metric_id.to_string(),
                entity: entity.to_string(),
            })
    }

    /// Returns every entity offered for a metric.
    pub fn entities(&self, metric_id: &str) -> impl Iterator<Item = &MetricSpec> {
        let metric_id = metric_id.to_string();
        self.metrics.iter().filter(move |m| m.metric_id == metric_id)
    }

    /// Returns all metrics.
    pub fn all(&self) -> impl Iterator<Item = &MetricSpec> {
        self.metrics.iter()
    }

    /// Returns the number of metric/entity pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Returns true if the inventory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

impl SchemaLookup for MetricInventory {
    /// Accepts `Metric/Entity`, or a bare metric id for its first entity.
    fn schema(&self, id: &str) -> Option<DatasetSchema> {
        let spec = match id.split_once('/') {
            Some((metric, entity)) => self.get(metric, entity),
            None => self.entities(id).next(),
        };
        spec.map(MetricSpec::schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(metric: &str, entity: &str, kind: &str) -> Record {
        Record::new()
            .with("Id", "Metrica")
            .with("Date", "2022-04-12")
            .with("Values_MetricId", metric)
            .with("Values_MetricName", format!("{metric} por {entity}"))
            .with("Values_Entity", entity)
            .with("Values_Type", kind)
            .with("Values_MaxDays", 31.0)
            .with("Values_MetricUnits", "kWh")
            .with("Values_MetricDescription", "")
    }

    fn inventory() -> MetricInventory {
        MetricInventory::from_records(&[
            row("Gene", "Sistema", "HourlyEntities"),
            row("Gene", "Recurso", "HourlyEntities"),
            row("PrecBolsNaci", "Sistema", "DailyEntities"),
            row("ListadoRecursos", "Sistema", "ListsEntities"),
        ])
        .unwrap()
    }

    #[test]
    fn test_inventory_lookup() {
        let inventory = inventory();
        assert_eq!(inventory.len(), 4);

        let gene = inventory.get("Gene", "Recurso").unwrap();
        assert_eq!(gene.granularity(), Granularity::Hourly);
        assert_eq!(gene.max_days, Some(31));
        assert_eq!(gene.units, "kWh");
        assert_eq!(inventory.entities("Gene").count(), 2);

        assert!(inventory.get("ListadoRecursos", "Sistema").unwrap().is_list());
        assert!(matches!(
            inventory.require("Gene", "Planeta"),
            Err(CatalogError::UnknownMetric { .. })
        ));
    }

    #[test]
    fn test_schema_lookup() {
        let inventory = inventory();
        let schema = inventory.schema("PrecBolsNaci/Sistema").unwrap();
        assert_eq!(schema.granularity, Granularity::Daily);
        assert_eq!(schema.date_field, "Date");
        assert_eq!(schema.resolution(), 31);

        assert_eq!(inventory.schema("Gene").unwrap().dimensions, vec!["Sistema"]);
        assert!(inventory.schema("Nada").is_none());
    }

    #[test]
    fn test_unprefixed_columns() {
        let record = Record::new()
            .with("MetricId", "Gene")
            .with("Entity", "Sistema")
            .with("Type", "HourlyEntities")
            .with("MaxDays", "60");
        let inventory = MetricInventory::from_records(&[record]).unwrap();
        assert_eq!(inventory.get("Gene", "Sistema").unwrap().max_days, Some(60));
    }

    #[test]
    fn test_missing_type() {
        let mut record = row("Gene", "Sistema", "HourlyEntities");
        record.remove("Values_Type");
        assert!(matches!(
            MetricInventory::from_records(&[record]),
            Err(CatalogError::MalformedInventory { index: 0, field: "Type" })
        ));
    }
}
