//! Client configuration.

use chrono::NaiveDate;
use despacho_fetch::url::{SIMEM_BASE_URL, SIMEM_VARIABLES_URL, XM_BASE_URL};
use despacho_revisions::VersionLabels;
use despacho_types::RevisionFields;
use serde::{Deserialize, Serialize};

const DEFAULT_CONCURRENCY: usize = 8;

/// Configuration for [`XmClient`](crate::XmClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmConfig {
    /// API root.
    pub base_url: String,
    /// Maximum pages in flight per call.
    pub concurrency: usize,
}

impl Default for XmConfig {
    fn default() -> Self {
        Self {
            base_url: XM_BASE_URL.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl XmConfig {
    /// Sets the API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the maximum pages in flight per call.
    #[must_use]
    pub const fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }
}

/// Configuration for [`SimemClient`](crate::SimemClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimemConfig {
    /// API root.
    pub base_url: String,
    /// Location of the variable catalog document.
    pub variables_url: String,
    /// Dataset listing every published dataset.
    pub catalog_dataset_id: String,
    /// Dataset listing every published variable.
    pub variable_inventory_id: String,
    /// Dataset of published settlement revisions.
    pub version_dataset_id: String,
    /// Daily revisions dataset, read for months the revisions dataset lacks.
    pub daily_version_dataset_id: String,
    /// Date that metadata and catalog requests are pinned to.
    pub reference_date: NaiveDate,
    /// Maximum pages in flight per call.
    pub concurrency: usize,
    /// Field names of the versions dataset.
    pub revision_fields: RevisionFields,
    /// Revision labels with special meaning.
    pub labels: VersionLabels,
}

impl Default for SimemConfig {
    fn default() -> Self {
        Self {
            base_url: SIMEM_BASE_URL.to_string(),
            variables_url: SIMEM_VARIABLES_URL.to_string(),
            catalog_dataset_id: "e007fb".to_string(),
            variable_inventory_id: "a5a6c4".to_string(),
            version_dataset_id: "24914F".to_string(),
            daily_version_dataset_id: "7a30a3".to_string(),
            reference_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap_or_default(),
            concurrency: DEFAULT_CONCURRENCY,
            revision_fields: RevisionFields::default(),
            labels: VersionLabels::default(),
        }
    }
}

impl SimemConfig {
    /// Sets the API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the location of the variable catalog document.
    #[must_use]
    pub fn with_variables_url(mut self, variables_url: impl Into<String>) -> Self {
        self.variables_url = variables_url.into();
        self
    }

    /// Sets the versions dataset.
    #[must_use]
    pub fn with_version_dataset(mut self, dataset_id: impl Into<String>) -> Self {
        self.version_dataset_id = dataset_id.into();
        self
    }

    /// Sets the daily revisions dataset.
    #[must_use]
    pub fn with_daily_version_dataset(mut self, dataset_id: impl Into<String>) -> Self {
        self.daily_version_dataset_id = dataset_id.into();
        self
    }

    /// Sets the maximum pages in flight per call.
    #[must_use]
    pub const fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets the revision labels.
    #[must_use]
    pub fn with_labels(mut self, labels: VersionLabels) -> Self {
        self.labels = labels;
        self
    }
}
