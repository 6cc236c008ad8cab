//! Catalog variables: the full versioned retrieval pipeline.

use chrono::NaiveDate;
use despacho_catalog::{VariableCatalog, VariableSpec};
use despacho_fetch::{ColumnFilter, HttpTransport, Transport};
use despacho_revisions::{VersionResolver, coerce_records, merge};
use despacho_types::{
    DateRange, Granularity, Month, Record, RevisionRecord, Value, VersionSelector,
};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::{Result, SimemClient};

/// Column the value is renamed to in standardized output.
pub const STANDARD_VALUE_COLUMN: &str = "Valor";

/// Reads catalog variables through a [`SimemClient`].
#[derive(Debug)]
pub struct VariableReader<T = HttpTransport> {
    client: SimemClient<T>,
    catalog: VariableCatalog,
}

impl<T: Transport> VariableReader<T> {
    /// Creates a reader over a catalog already at hand.
    #[must_use]
    pub const fn new(client: SimemClient<T>, catalog: VariableCatalog) -> Self {
        Self { client, catalog }
    }

    /// Creates a reader and downloads the variable catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be fetched.
    pub async fn connect(client: SimemClient<T>) -> Result<Self> {
        let catalog = client.variable_catalog().await?;
        Ok(Self::new(client, catalog))
    }

    /// Returns the variable catalog.
    #[must_use]
    pub const fn catalog(&self) -> &VariableCatalog {
        &self.catalog
    }

    /// Returns the underlying client.
    #[must_use]
    pub const fn client(&self) -> &SimemClient<T> {
        &self.client
    }

    /// Reads a variable over a date range.
    ///
    /// Shared datasets are filtered to the variable's code. For versioned
    /// variables the published revisions from the start of the range's
    /// first month are resolved against `selector` and only the values of
    /// the selected revision are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is unknown, the dataset cannot be paged
    /// or a request fails.
    pub async fn read(
        &self,
        code: &str,
        range: DateRange,
        selector: &VersionSelector,
    ) -> Result<VariableData> {
        let spec = self.catalog.require_variable(code)?.clone();
        self.read_spec(spec, range, selector).await
    }

    /// Reads a maestra over a date range, the same way as
    /// [`VariableReader::read`].
    ///
    /// # Errors
    ///
    /// Returns an error if the code is not a maestra, the dataset cannot be
    /// paged or a request fails.
    pub async fn read_maestra(
        &self,
        code: &str,
        range: DateRange,
        selector: &VersionSelector,
    ) -> Result<VariableData> {
        let spec = self.catalog.require_maestra(code)?.clone();
        self.read_spec(spec, range, selector).await
    }

    /// Reads a variable and summarizes it.
    ///
    /// # Errors
    ///
    /// See [`VariableReader::read`].
    pub async fn describe(
        &self,
        code: &str,
        range: DateRange,
        selector: &VersionSelector,
    ) -> Result<Summary> {
        Ok(self.read(code, range, selector).await?.describe())
    }

    #[tracing::instrument(skip(self, spec, selector), fields(code = %spec.code))]
    async fn read_spec(
        &self,
        spec: VariableSpec,
        range: DateRange,
        selector: &VersionSelector,
    ) -> Result<VariableData> {
        let info = self.client.dataset_info(&spec.dataset_id).await?;
        let filter = spec
            .var_column
            .as_ref()
            .map(|column| ColumnFilter::new(column.as_str(), vec![spec.code.clone()]));

        let mut records = self.client.read_dataset(&info, range, filter).await?;
        let date_column = spec.date_column.as_deref().unwrap_or(info.date_filter.as_str());
        coerce_records(&mut records, date_column);

        if let Some(version_column) = &spec.version_column {
            records = self
                .select_version(records, &spec, range, selector, date_column, version_column)
                .await?;
        }

        tracing::info!(records = records.len(), "read variable");
        Ok(VariableData {
            spec,
            granularity: info.granularity,
            range,
            records,
        })
    }

    async fn select_version(
        &self,
        records: Vec<Record>,
        spec: &VariableSpec,
        range: DateRange,
        selector: &VersionSelector,
        date_column: &str,
        version_column: &str,
    ) -> Result<Vec<Record>> {
        let config = self.client.config();
        let version_range = range.from_month_start();
        let published = self
            .client
            .read(&config.version_dataset_id, version_range, None)
            .await?;
        let mut revisions = RevisionRecord::from_records(&published, &config.revision_fields)?;
        revisions.extend(self.daily_revisions(&revisions, version_range).await?);

        let windows = VersionResolver::new(spec.earliest_is_secondary)
            .with_labels(config.labels.clone())
            .resolve(&revisions, version_range.months(), selector);
        tracing::debug!(revisions = revisions.len(), months = windows.len(), "resolved versions");

        Ok(merge(records, &windows, date_column, version_column))
    }

    /// Reads the daily revisions dataset for every month of `range` that
    /// `revisions` does not cover.
    async fn daily_revisions(
        &self,
        revisions: &[RevisionRecord],
        range: DateRange,
    ) -> Result<Vec<RevisionRecord>> {
        let config = self.client.config();
        let covered: BTreeSet<Month> = revisions.iter().map(RevisionRecord::month).collect();
        let missing: Vec<Month> = range
            .months()
            .into_iter()
            .filter(|month| !covered.contains(month))
            .collect();
        if missing.is_empty() {
            return Ok(Vec::new());
        }

        let reads = missing.iter().map(|month| async move {
            let whole_month = DateRange::new(month.first_day(), month.last_day())?;
            self.client
                .read(&config.daily_version_dataset_id, whole_month, None)
                .await
        });
        let published: Vec<Record> = try_join_all(reads).await?.into_iter().flatten().collect();
        let daily = RevisionRecord::from_records(&published, &config.revision_fields)?;
        tracing::debug!(missing = missing.len(), revisions = daily.len(), "read daily revisions");
        Ok(daily)
    }
}

/// The records of one variable, with the metadata needed to present them.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableData {
    /// The catalog entry.
    pub spec: VariableSpec,
    /// The dataset's granularity.
    pub granularity: Granularity,
    /// The requested range.
    pub range: DateRange,
    /// The retrieved records.
    pub records: Vec<Record>,
}

impl VariableData {
    /// Returns the records with the value column renamed to
    /// [`STANDARD_VALUE_COLUMN`] for variables of shared datasets.
    #[must_use]
    pub fn standardized(&self) -> Vec<Record> {
        let (Some(_), Some(value_column)) = (&self.spec.var_column, &self.spec.value_column) else {
            return self.records.clone();
        };
        self.records
            .iter()
            .cloned()
            .map(|mut record| {
                if let Some(value) = record.remove(value_column) {
                    record.insert(STANDARD_VALUE_COLUMN, value);
                }
                record
            })
            .collect()
    }

    /// Returns the records in the quality-check layout: `fecha`,
    /// `codigoMaestra`, `codigoVariable`, `maestra` and `valor`.
    #[must_use]
    pub fn quality_check(&self) -> Vec<Record> {
        let spec = &self.spec;
        let maestra = spec.maestra_column.clone().map_or(Value::Null, Value::Text);
        let field = |record: &Record, column: Option<&String>| {
            column
                .and_then(|c| record.get(c))
                .cloned()
                .unwrap_or(Value::Null)
        };

        self.records
            .iter()
            .map(|record| {
                let maestra_code = spec
                    .cod_maestra_column
                    .as_ref()
                    .map_or_else(|| maestra.clone(), |c| field(record, Some(c)));
                Record::new()
                    .with("fecha", field(record, spec.date_column.as_ref()))
                    .with("codigoMaestra", maestra_code)
                    .with("codigoVariable", field(record, spec.var_column.as_ref()))
                    .with("maestra", maestra.clone())
                    .with("valor", field(record, spec.value_column.as_ref()))
            })
            .collect()
    }

    /// Returns the values the summary is computed over.
    ///
    /// Versioned variables are first summed per timestamp and revision.
    fn summary_values(&self) -> Vec<Option<f64>> {
        let value = |record: &Record| {
            self.spec
                .value_column
                .as_deref()
                .and_then(|c| record.get(c))
                .and_then(Value::as_f64)
        };
        let (Some(date_column), Some(version_column)) =
            (&self.spec.date_column, &self.spec.version_column)
        else {
            return self.records.iter().map(value).collect();
        };

        let mut sums: BTreeMap<(String, String), f64> = BTreeMap::new();
        for record in &self.records {
            let key = |c: &str| record.get(c).map(ToString::to_string).unwrap_or_default();
            *sums
                .entry((key(date_column), key(version_column)))
                .or_default() += value(record).unwrap_or_default();
        }
        sums.into_values().map(Some).collect()
    }

    /// Summarizes the variable's values.
    #[must_use]
    pub fn describe(&self) -> Summary {
        Summary::from_values(
            self.spec.code.clone(),
            self.summary_values(),
            self.range,
            self.granularity,
        )
    }
}

/// Descriptive statistics of a variable over a range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Variable code.
    pub variable: String,
    /// Arithmetic mean.
    pub mean: Option<f64>,
    /// Median.
    pub median: Option<f64>,
    /// Sample standard deviation.
    pub std_dev: Option<f64>,
    /// Smallest value.
    pub min: Option<f64>,
    /// Largest value.
    pub max: Option<f64>,
    /// Rows without a numeric value.
    pub null_count: usize,
    /// Rows whose value is zero.
    pub zero_count: usize,
    /// First requested date.
    pub start_date: NaiveDate,
    /// Last requested date.
    pub end_date: NaiveDate,
    /// The dataset's granularity.
    pub granularity: Granularity,
}

impl Summary {
    /// Computes the statistics of `values`; `None` entries only count as
    /// nulls.
    ///
    /// Statistics of an empty sample are `None`, as is the standard
    /// deviation of a single value.
    #[must_use]
    pub fn from_values(
        variable: impl Into<String>,
        values: impl IntoIterator<Item = Option<f64>>,
        range: DateRange,
        granularity: Granularity,
    ) -> Self {
        let mut null_count = 0;
        let mut present: Vec<f64> = Vec::new();
        for value in values {
            match value {
                Some(v) if v.is_finite() => present.push(v),
                _ => null_count += 1,
            }
        }
        present.sort_by(f64::total_cmp);

        let n = present.len();
        let mean = (n > 0).then(|| present.iter().sum::<f64>() / n as f64);
        let median = match n {
            0 => None,
            _ if n % 2 == 1 => Some(present[n / 2]),
            _ => Some((present[n / 2 - 1] + present[n / 2]) / 2.0),
        };
        let std_dev = mean.filter(|_| n > 1).map(|mean| {
            let squares: f64 = present.iter().map(|v| (v - mean).powi(2)).sum();
            (squares / (n - 1) as f64).sqrt()
        });

        Self {
            variable: variable.into(),
            mean,
            median,
            std_dev,
            min: present.first().copied(),
            max: present.last().copied(),
            null_count,
            zero_count: present.iter().filter(|v| **v == 0.0).count(),
            start_date: range.start,
            end_date: range.end,
            granularity,
        }
    }
}
