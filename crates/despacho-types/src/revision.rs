//! Published revisions of historical periods and their resolved windows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Month, Record, RevisionError, Value};

/// Field names under which a revision record carries its attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionFields {
    /// First date covered by the revision.
    pub period_start: String,
    /// Last date covered by the revision.
    pub period_end: String,
    /// Date the revision was published.
    pub publication_date: String,
    /// Revision label (e.g. `TX1`, `TXR`, `TXF`).
    pub version_label: String,
    /// Flag marking the authoritative revision of its period.
    pub is_final: String,
}

impl Default for RevisionFields {
    /// Field names used by the SIMEM versions dataset.
    fn default() -> Self {
        Self {
            period_start: "FechaInicio".to_string(),
            period_end: "FechaFin".to_string(),
            publication_date: "FechaPublicacion".to_string(),
            version_label: "Version".to_string(),
            is_final: "EsMaximaVersion".to_string(),
        }
    }
}

/// A distinct published edition of the data for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionRecord {
    /// First date covered by this revision.
    pub period_start: NaiveDate,
    /// Last date covered by this revision.
    pub period_end: NaiveDate,
    /// When the revision was issued.
    pub publication_date: NaiveDate,
    /// Revision label.
    pub version_label: String,
    /// Whether this is the last revision for its period.
    pub is_final: bool,
}

impl RevisionRecord {
    /// Creates a revision record.
    #[must_use]
    pub fn new(
        version_label: impl Into<String>,
        period_start: NaiveDate,
        period_end: NaiveDate,
        publication_date: NaiveDate,
    ) -> Self {
        Self {
            period_start,
            period_end,
            publication_date,
            version_label: version_label.into(),
            is_final: false,
        }
    }

    /// Marks the revision as final.
    #[must_use]
    pub const fn with_final(mut self, is_final: bool) -> Self {
        self.is_final = is_final;
        self
    }

    /// Returns the month group this revision belongs to.
    #[must_use]
    pub fn month(&self) -> Month {
        Month::of(self.period_start)
    }

    /// Reads a revision out of a provider record.
    ///
    /// `index` is the record's position in its input and only feeds error
    /// messages.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::MalformedRevision`] if a date or the label is
    /// missing or unreadable. A missing final flag reads as `false`.
    pub fn from_record(
        record: &Record,
        fields: &RevisionFields,
        index: usize,
    ) -> Result<Self, RevisionError> {
        let date = |name: &str| -> Result<NaiveDate, RevisionError> {
            match record.get(name) {
                None | Some(Value::Null) => Err(RevisionError::missing(index, name)),
                Some(value) => value
                    .as_date()
                    .ok_or_else(|| RevisionError::unreadable(index, name, value)),
            }
        };

        let version_label = match record.get(&fields.version_label) {
            None | Some(Value::Null) => {
                return Err(RevisionError::missing(index, &fields.version_label));
            }
            Some(value) => value.to_string(),
        };

        Ok(Self {
            period_start: date(&fields.period_start)?,
            period_end: date(&fields.period_end)?,
            publication_date: date(&fields.publication_date)?,
            version_label,
            is_final: record.get(&fields.is_final).is_some_and(is_truthy),
        })
    }

    /// Reads every record of a versions dataset.
    ///
    /// # Errors
    ///
    /// Fails on the first malformed record.
    pub fn from_records(
        records: &[Record],
        fields: &RevisionFields,
    ) -> Result<Vec<Self>, RevisionError> {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| Self::from_record(record, fields, index))
            .collect()
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => *n != 0.0,
        Value::Text(s) => matches!(s.trim().to_lowercase().as_str(), "1" | "true" | "si" | "sí"),
        Value::Null | Value::Date(_) => false,
    }
}

/// The revision selected for a month, restricted to its period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedVersionWindow {
    /// Revision label carried into merged records.
    pub version_label: String,
    /// First date of the window (inclusive).
    pub period_start: NaiveDate,
    /// Last date of the window (inclusive).
    pub period_end: NaiveDate,
    /// Publication date of the revision.
    pub publication_date: NaiveDate,
    /// Per-month rank: 0 for the newest published revision, negative for
    /// older ones, positive for placeholders newer than anything published.
    pub rank: i32,
    /// True when the window was synthesized rather than published.
    pub synthetic: bool,
}

impl ResolvedVersionWindow {
    /// Builds a window from a published revision.
    #[must_use]
    pub fn from_revision(revision: &RevisionRecord, rank: i32) -> Self {
        Self {
            version_label: revision.version_label.clone(),
            period_start: revision.period_start,
            period_end: revision.period_end,
            publication_date: revision.publication_date,
            rank,
            synthetic: false,
        }
    }

    /// Returns true if `date` lies within the window, both ends included.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.period_start && date <= self.period_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn version_row() -> Record {
        Record::new()
            .with("Version", "TXR")
            .with("FechaInicio", "2024-01-01")
            .with("FechaFin", "2024-01-31")
            .with("FechaPublicacion", "2024-02-05T00:00:00")
            .with("EsMaximaVersion", 1.0)
    }

    #[test]
    fn test_from_record() {
        let revision =
            RevisionRecord::from_record(&version_row(), &RevisionFields::default(), 0).unwrap();
        assert_eq!(revision.version_label, "TXR");
        assert_eq!(revision.period_start, date(2024, 1, 1));
        assert_eq!(revision.period_end, date(2024, 1, 31));
        assert_eq!(revision.publication_date, date(2024, 2, 5));
        assert!(revision.is_final);
        assert_eq!(revision.month(), Month::new(2024, 1).unwrap());
    }

    #[test]
    fn test_numeric_label_and_missing_flag() {
        let mut row = version_row().with("Version", 0.0);
        row.remove("EsMaximaVersion");
        let revision = RevisionRecord::from_record(&row, &RevisionFields::default(), 0).unwrap();
        assert_eq!(revision.version_label, "0");
        assert!(!revision.is_final);
    }

    #[test]
    fn test_missing_publication_date() {
        let mut row = version_row();
        row.remove("FechaPublicacion");
        let records = vec![version_row(), row];
        let err = RevisionRecord::from_records(&records, &RevisionFields::default()).unwrap_err();
        assert_eq!(
            err,
            RevisionError::MalformedRevision {
                index: 1,
                field: "FechaPublicacion".to_string(),
                reason: "is missing".to_string(),
            }
        );
    }

    #[test]
    fn test_unreadable_date() {
        let row = version_row().with("FechaFin", "soon");
        let err = RevisionRecord::from_record(&row, &RevisionFields::default(), 3).unwrap_err();
        assert!(err.to_string().contains("FechaFin"));
        assert!(err.to_string().contains("#3"));
    }

    #[test]
    fn test_window_contains_both_ends() {
        let revision = RevisionRecord::new("TXF", date(2024, 1, 1), date(2024, 1, 31), date(2024, 3, 1));
        let window = ResolvedVersionWindow::from_revision(&revision, 0);
        assert!(window.contains(date(2024, 1, 1)));
        assert!(window.contains(date(2024, 1, 31)));
        assert!(!window.contains(date(2024, 2, 1)));
    }
}
