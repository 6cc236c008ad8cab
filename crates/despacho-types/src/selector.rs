//! Version selection for revised datasets.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which revision of each month a caller wants.
///
/// Parsed once at the API boundary: integers select by offset, anything else
/// by label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VersionSelector {
    /// A specific revision label, such as `TXF` or `TX2`.
    ByLabel(String),
    /// Relative offset from the newest revision: 0 is the newest, 1 the one
    /// before it. Negative offsets ask for revisions newer than any published.
    ByOffset(i32),
}

impl VersionSelector {
    /// Selects the newest published revision.
    #[must_use]
    pub const fn latest() -> Self {
        Self::ByOffset(0)
    }

    /// Selects by label.
    #[must_use]
    pub fn label(label: impl Into<String>) -> Self {
        Self::ByLabel(label.into())
    }

    /// Selects by offset.
    #[must_use]
    pub const fn offset(n: i32) -> Self {
        Self::ByOffset(n)
    }
}

impl Default for VersionSelector {
    fn default() -> Self {
        Self::latest()
    }
}

impl std::fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ByLabel(label) => f.write_str(label),
            Self::ByOffset(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for VersionSelector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(s.parse::<i32>()
            .map_or_else(|_| Self::ByLabel(s.to_string()), Self::ByOffset))
    }
}

impl From<i32> for VersionSelector {
    fn from(n: i32) -> Self {
        Self::ByOffset(n)
    }
}

impl From<&str> for VersionSelector {
    fn from(label: &str) -> Self {
        Self::ByLabel(label.to_string())
    }
}
