//! The SIMEM variable catalog.

use despacho_types::{DatasetSchema, Granularity, SchemaLookup};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::CatalogError;

/// How a catalog variable (or maestra) maps onto its dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableSpec {
    /// Variable code, filled from the catalog key.
    #[serde(skip)]
    pub code: String,
    /// Human-readable name.
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    /// Dataset holding the variable.
    pub dataset_id: String,
    /// Column identifying the variable within a shared dataset.
    #[serde(default)]
    pub var_column: Option<String>,
    /// Column holding each row's date.
    #[serde(default)]
    pub date_column: Option<String>,
    /// Column holding the revision label, for versioned variables.
    #[serde(default)]
    pub version_column: Option<String>,
    /// Column holding the observed value.
    #[serde(default)]
    pub value_column: Option<String>,
    /// Dimension columns.
    #[serde(default, deserialize_with = "nullable")]
    pub dimensions: Vec<String>,
    /// Whether the first published revision is TX2 rather than TX1.
    #[serde(
        rename = "esTX2PrimeraVersion",
        default,
        deserialize_with = "flag"
    )]
    pub earliest_is_secondary: bool,
    /// Maestra the variable belongs to.
    #[serde(default)]
    pub maestra_column: Option<String>,
    /// Column holding the maestra code.
    #[serde(rename = "codMaestra_column", default)]
    pub cod_maestra_column: Option<String>,
}

impl VariableSpec {
    /// Returns the dataset schema for this variable.
    ///
    /// The catalog does not record granularity; callers refine it from the
    /// dataset's metadata.
    #[must_use]
    pub fn schema(&self) -> DatasetSchema {
        let mut schema = DatasetSchema::new(
            self.dataset_id.clone(),
            Granularity::Unspecified,
            self.date_column.clone().unwrap_or_default(),
        )
        .with_dimensions(self.dimensions.clone())
        .with_earliest_secondary(self.earliest_is_secondary);
        if let Some(version) = &self.version_column {
            schema = schema.with_version_field(version);
        }
        if let Some(value) = &self.value_column {
            schema = schema.with_value_field(value);
        }
        if let Some(column) = &self.var_column {
            schema = schema.with_filter_field(column);
        }
        schema
    }

    /// Returns true if the variable publishes revisions.
    #[must_use]
    pub const fn is_versioned(&self) -> bool {
        self.version_column.is_some()
    }

    /// Dimensions followed by the version and date columns, the full key of
    /// a row.
    #[must_use]
    pub fn key_columns(&self) -> Vec<&str> {
        self.dimensions
            .iter()
            .map(String::as_str)
            .chain(self.version_column.as_deref())
            .chain(self.date_column.as_deref())
            .collect()
    }
}

#[derive(Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    variable: BTreeMap<String, VariableSpec>,
    #[serde(default)]
    maestra: BTreeMap<String, VariableSpec>,
}

/// Registry of SIMEM variables and maestras.
#[derive(Debug, Clone, Default)]
pub struct VariableCatalog {
    variables: BTreeMap<String, VariableSpec>,
    maestras: BTreeMap<String, VariableSpec>,
}

impl VariableCatalog {
    /// Reads the catalog from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        Ok(Self::from_document(serde_json::from_str(json)?))
    }

    /// Reads the catalog from an already decoded JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed.
    pub fn from_json(json: serde_json::Value) -> Result<Self, CatalogError> {
        Ok(Self::from_document(serde_json::from_value(json)?))
    }

    fn from_document(document: CatalogDocument) -> Self {
        let keyed = |entries: BTreeMap<String, VariableSpec>| {
            entries
                .into_iter()
                .map(|(code, mut spec)| {
                    spec.code.clone_from(&code);
                    (code, spec)
                })
                .collect()
        };
        Self {
            variables: keyed(document.variable),
            maestras: keyed(document.maestra),
        }
    }

    /// Looks up a variable by code (case-sensitive, as the provider's codes are).
    #[must_use]
    pub fn variable(&self, code: &str) -> Option<&VariableSpec> {
        self.variables.get(code)
    }

    /// Looks up a variable, failing on unknown codes.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownVariable`] if the code is not registered.
    pub fn require_variable(&self, code: &str) -> Result<&VariableSpec, CatalogError> {
        self.variable(code)
            .ok_or_else(|| CatalogError::UnknownVariable(code.to_string()))
    }

    /// Looks up a maestra by code.
    #[must_use]
    pub fn maestra(&self, code: &str) -> Option<&VariableSpec> {
        self.maestras.get(code)
    }

    /// Looks up a maestra, failing on unknown codes.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownMaestra`] if the code is not registered.
    pub fn require_maestra(&self, code: &str) -> Result<&VariableSpec, CatalogError> {
        self.maestra(code)
            .ok_or_else(|| CatalogError::UnknownMaestra(code.to_string()))
    }

    /// Returns all variables in code order.
    pub fn variables(&self) -> impl Iterator<Item = &VariableSpec> {
        self.variables.values()
    }

    /// Returns all maestras in code order.
    pub fn maestras(&self) -> impl Iterator<Item = &VariableSpec> {
        self.maestras.values()
    }

    /// Returns the total number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Returns true if the catalog has no variables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Searches variables by code or name (case-insensitive).
    pub fn search(&self, pattern: &str) -> Vec<&VariableSpec> {
        let pattern = pattern.to_lowercase();
        self.variables
            .values()
            .filter(|v| {
                v.code.to_lowercase().contains(&pattern) || v.name.to_lowercase().contains(&pattern)
            })
            .collect()
    }
}

impl SchemaLookup for VariableCatalog {
    fn schema(&self, id: &str) -> Option<DatasetSchema> {
        self.variable(id)
            .or_else(|| self.maestra(id))
            .map(VariableSpec::schema)
    }
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The provider writes this flag as `0`/`1`, a boolean, or text.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        serde_json::Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "1" | "true"),
        _ => false,
    })
}
