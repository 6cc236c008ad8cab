//! Dataset schemas and the lookup seam that supplies them.

use serde::{Deserialize, Serialize};

use crate::Granularity;

/// What the retrieval core needs to know about a dataset or metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSchema {
    /// Provider identifier of the dataset (SIMEM dataset id or XM metric id).
    pub dataset_id: String,
    /// Native granularity, which fixes the paging resolution.
    pub granularity: Granularity,
    /// Field holding each record's date.
    pub date_field: String,
    /// Field holding the revision label, for versioned datasets.
    pub version_field: Option<String>,
    /// Field holding the observed value.
    pub value_field: Option<String>,
    /// Dimension fields identifying a series within the dataset.
    pub dimensions: Vec<String>,
    /// Field the provider filters on when a variable code is requested.
    pub filter_field: Option<String>,
    /// Whether the first published revision of this dataset is the
    /// secondary (TX2) kind rather than TX1.
    pub earliest_is_secondary: bool,
}

impl DatasetSchema {
    /// Creates a schema with no version, value, dimension or filter fields.
    #[must_use]
    pub fn new(
        dataset_id: impl Into<String>,
        granularity: Granularity,
        date_field: impl Into<String>,
    ) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            granularity,
            date_field: date_field.into(),
            version_field: None,
            value_field: None,
            dimensions: Vec::new(),
            filter_field: None,
            earliest_is_secondary: false,
        }
    }

    /// Sets the granularity.
    #[must_use]
    pub const fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Sets the version field.
    #[must_use]
    pub fn with_version_field(mut self, field: impl Into<String>) -> Self {
        self.version_field = Some(field.into());
        self
    }

    /// Sets the value field.
    #[must_use]
    pub fn with_value_field(mut self, field: impl Into<String>) -> Self {
        self.value_field = Some(field.into());
        self
    }

    /// Sets the dimension fields.
    #[must_use]
    pub fn with_dimensions(mut self, dimensions: Vec<String>) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Sets the filter field.
    #[must_use]
    pub fn with_filter_field(mut self, field: impl Into<String>) -> Self {
        self.filter_field = Some(field.into());
        self
    }

    /// Sets whether the earliest revision is of the secondary kind.
    #[must_use]
    pub const fn with_earliest_secondary(mut self, earliest_is_secondary: bool) -> Self {
        self.earliest_is_secondary = earliest_is_secondary;
        self
    }

    /// Returns true if the dataset publishes revisions.
    #[must_use]
    pub const fn is_versioned(&self) -> bool {
        self.version_field.is_some()
    }

    /// Returns the paging resolution in days.
    #[must_use]
    pub const fn resolution(&self) -> u32 {
        self.granularity.resolution_days()
    }
}

/// Source of dataset schemas, keyed by dataset, metric or variable identifier.
pub trait SchemaLookup {
    /// Returns the schema for `id`, if known.
    fn schema(&self, id: &str) -> Option<DatasetSchema>;
}
