//! Dataset granularity and the paging resolution it implies.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Native time resolution of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One value per hour.
    Hourly,
    /// One value per day.
    Daily,
    /// One value per week.
    Weekly,
    /// One value per month.
    Monthly,
    /// One value per year.
    Annual,
    /// No declared granularity; such datasets cannot be paged.
    #[default]
    Unspecified,
}

impl Granularity {
    /// Returns the maximum number of days a single request may span.
    ///
    /// Zero means the dataset cannot be paged.
    #[must_use]
    pub const fn resolution_days(&self) -> u32 {
        match self {
            Self::Hourly | Self::Daily => 31,
            Self::Weekly | Self::Monthly => 731,
            Self::Annual => 1827,
            Self::Unspecified => 0,
        }
    }

    /// Returns true if requests for this granularity can be paged.
    #[must_use]
    pub const fn is_pageable(&self) -> bool {
        self.resolution_days() > 0
    }

    /// Returns the XM API path segment serving this granularity.
    #[must_use]
    pub const fn xm_path(&self) -> Option<&'static str> {
        match self {
            Self::Hourly => Some("hourly"),
            Self::Daily => Some("daily"),
            Self::Monthly => Some("monthly"),
            Self::Annual => Some("annual"),
            Self::Weekly | Self::Unspecified => None,
        }
    }

    /// Returns the key under which XM nests the entities of this granularity.
    #[must_use]
    pub const fn xm_entities_key(&self) -> Option<&'static str> {
        match self {
            Self::Hourly => Some("HourlyEntities"),
            Self::Daily => Some("DailyEntities"),
            Self::Monthly => Some("MonthlyEntities"),
            Self::Annual => Some("AnnualEntities"),
            Self::Weekly | Self::Unspecified => None,
        }
    }

    /// Returns the granularity as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Annual => "annual",
            Self::Unspecified => "unspecified",
        }
    }

    /// Returns all granularities.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Hourly,
            Self::Daily,
            Self::Weekly,
            Self::Monthly,
            Self::Annual,
            Self::Unspecified,
        ]
    }

    /// Reads a provider label, mapping anything unrecognised to
    /// [`Granularity::Unspecified`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        label.parse().unwrap_or_default()
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = GranularityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hourly" | "horaria" | "hourlyentities" => Ok(Self::Hourly),
            "daily" | "diaria" | "dailyentities" => Ok(Self::Daily),
            "weekly" | "semanal" => Ok(Self::Weekly),
            "monthly" | "mensual" | "monthlyentities" => Ok(Self::Monthly),
            "annual" | "anual" | "yearly" | "annualentities" => Ok(Self::Annual),
            "unspecified" | "" => Ok(Self::Unspecified),
            _ => Err(GranularityParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown granularity label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GranularityParseError(String);

impl std::fmt::Display for GranularityParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid granularity '{}', expected one of: hourly, daily, weekly, monthly, annual",
            self.0
        )
    }
}

impl std::error::Error for GranularityParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_table() {
        assert_eq!(Granularity::Hourly.resolution_days(), 31);
        assert_eq!(Granularity::Daily.resolution_days(), 31);
        assert_eq!(Granularity::Weekly.resolution_days(), 731);
        assert_eq!(Granularity::Monthly.resolution_days(), 731);
        assert_eq!(Granularity::Annual.resolution_days(), 1827);
        assert_eq!(Granularity::Unspecified.resolution_days(), 0);
        assert!(!Granularity::Unspecified.is_pageable());
    }

    #[test]
    fn test_granularity_parse() {
        assert_eq!("Horaria".parse::<Granularity>().unwrap(), Granularity::Hourly);
        assert_eq!("Diaria".parse::<Granularity>().unwrap(), Granularity::Daily);
        assert_eq!("Mensual".parse::<Granularity>().unwrap(), Granularity::Monthly);
        assert_eq!(
            "AnnualEntities".parse::<Granularity>().unwrap(),
            Granularity::Annual
        );
        assert!("Quinceminutal".parse::<Granularity>().is_err());
        assert_eq!(Granularity::from_label("Quinceminutal"), Granularity::Unspecified);
    }

    #[test]
    fn test_xm_paths() {
        assert_eq!(Granularity::Hourly.xm_path(), Some("hourly"));
        assert_eq!(Granularity::Daily.xm_entities_key(), Some("DailyEntities"));
        assert_eq!(Granularity::Weekly.xm_path(), None);
    }
}
