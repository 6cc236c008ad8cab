//! Per-month revision selection.

use chrono::{Days, NaiveDate};
use despacho_types::{Month, ResolvedVersionWindow, RevisionRecord, VersionSelector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Revision labels with special meaning to the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionLabels {
    /// The secondary-kind label, preferred over numeric rank.
    pub secondary: String,
    /// Label given to placeholders two or more steps newer than anything published.
    pub provisional: String,
    /// Label of the window synthesized for a month without revisions.
    pub missing: String,
    /// The interim label family.
    pub interim: Vec<String>,
}

impl Default for VersionLabels {
    fn default() -> Self {
        Self {
            secondary: "TX2".to_string(),
            provisional: "TX1".to_string(),
            missing: "0".to_string(),
            interim: vec!["TX1".to_string(), "TX2".to_string()],
        }
    }
}

impl VersionLabels {
    /// Returns true if `label` belongs to the interim family.
    #[must_use]
    pub fn is_interim(&self, label: &str) -> bool {
        self.interim.iter().any(|l| l == label)
    }
}

/// Selects, for each month, the revision windows matching a [`VersionSelector`].
#[derive(Debug, Clone, Default)]
pub struct VersionResolver {
    labels: VersionLabels,
    earliest_is_secondary: bool,
}

impl VersionResolver {
    /// Creates a resolver with the default labels.
    #[must_use]
    pub fn new(earliest_is_secondary: bool) -> Self {
        Self {
            labels: VersionLabels::default(),
            earliest_is_secondary,
        }
    }

    /// Replaces the label set.
    #[must_use]
    pub fn with_labels(mut self, labels: VersionLabels) -> Self {
        self.labels = labels;
        self
    }

    /// Returns the label set.
    #[must_use]
    pub const fn labels(&self) -> &VersionLabels {
        &self.labels
    }

    /// Resolves the windows of every month in `months` and every month that
    /// has revisions.
    ///
    /// A month without revisions gets exactly one synthetic window on the
    /// first day of the previous month; the selector is not applied to it.
    /// A month whose revisions include an interim label gets no window when
    /// a label selector matches nothing there.
    #[must_use]
    pub fn resolve(
        &self,
        revisions: &[RevisionRecord],
        months: impl IntoIterator<Item = Month>,
        selector: &VersionSelector,
    ) -> BTreeMap<Month, Vec<ResolvedVersionWindow>> {
        let mut groups: BTreeMap<Month, Vec<&RevisionRecord>> = BTreeMap::new();
        for revision in revisions {
            groups.entry(revision.month()).or_default().push(revision);
        }
        for month in months {
            groups.entry(month).or_default();
        }

        groups
            .into_iter()
            .map(|(month, group)| {
                let windows = if group.is_empty() {
                    tracing::debug!(%month, "no revisions published, synthesizing placeholder");
                    vec![self.missing_window(month)]
                } else {
                    self.resolve_month(group, selector)
                };
                (month, windows)
            })
            .collect()
    }

    fn resolve_month(
        &self,
        mut group: Vec<&RevisionRecord>,
        selector: &VersionSelector,
    ) -> Vec<ResolvedVersionWindow> {
        // stable: equal publication dates keep arrival order
        group.sort_by(|a, b| b.publication_date.cmp(&a.publication_date));
        let ranked: Vec<ResolvedVersionWindow> = group
            .into_iter()
            .zip(0_i32..)
            .map(|(revision, n)| ResolvedVersionWindow::from_revision(revision, -n))
            .collect();

        match selector {
            VersionSelector::ByOffset(n) => self.by_offset(&ranked, *n),
            VersionSelector::ByLabel(label) => self.by_label(&ranked, label),
        }
    }

    fn by_offset(&self, ranked: &[ResolvedVersionWindow], n: i32) -> Vec<ResolvedVersionWindow> {
        let (Some(newest), Some(oldest)) = (ranked.first(), ranked.last()) else {
            return Vec::new();
        };
        let has_interim = ranked.iter().any(|w| self.labels.is_interim(&w.version_label));
        let secondary = self.secondary_of(ranked);

        if self.earliest_is_secondary && has_interim && !secondary.is_empty() {
            return secondary;
        }

        let target = n.saturating_neg();
        if let Some(window) = ranked.iter().find(|w| w.rank == target) {
            return vec![window.clone()];
        }
        if target < oldest.rank {
            return vec![oldest.clone()];
        }

        // newer than anything published
        if has_interim {
            return if secondary.is_empty() {
                vec![newest.clone()]
            } else {
                secondary
            };
        }
        if target == 1 || self.earliest_is_secondary {
            vec![placeholder(newest, &self.labels.secondary, 1, target)]
        } else {
            vec![placeholder(newest, &self.labels.provisional, 2, target)]
        }
    }

    fn by_label(&self, ranked: &[ResolvedVersionWindow], label: &str) -> Vec<ResolvedVersionWindow> {
        let Some(newest) = ranked.first() else {
            return Vec::new();
        };

        let matches: Vec<ResolvedVersionWindow> = ranked
            .iter()
            .filter(|w| w.version_label == label)
            .cloned()
            .collect();
        if !matches.is_empty() {
            return matches;
        }

        // a published interim revision rules out placeholders
        if ranked.iter().any(|w| self.labels.is_interim(&w.version_label)) {
            return if self.labels.is_interim(label) {
                self.secondary_of(ranked)
            } else {
                Vec::new()
            };
        }

        if label == self.labels.secondary {
            vec![placeholder(newest, label, 1, 1)]
        } else {
            vec![placeholder(newest, label, 2, 2)]
        }
    }

    fn secondary_of(&self, ranked: &[ResolvedVersionWindow]) -> Vec<ResolvedVersionWindow> {
        ranked
            .iter()
            .filter(|w| w.version_label == self.labels.secondary)
            .cloned()
            .collect()
    }

    fn missing_window(&self, month: Month) -> ResolvedVersionWindow {
        let anchor = month.previous().first_day();
        ResolvedVersionWindow {
            version_label: self.labels.missing.clone(),
            period_start: anchor,
            period_end: anchor,
            publication_date: anchor,
            rank: 0,
            synthetic: true,
        }
    }
}

/// A not-yet-published revision of `newest`'s period.
fn placeholder(
    newest: &ResolvedVersionWindow,
    label: &str,
    days_after: u64,
    rank: i32,
) -> ResolvedVersionWindow {
    let publication_date: NaiveDate = newest
        .publication_date
        .checked_add_days(Days::new(days_after))
        .unwrap_or(newest.publication_date);
    ResolvedVersionWindow {
        version_label: label.to_string(),
        period_start: newest.period_start,
        period_end: newest.period_end,
        publication_date,
        rank,
        synthetic: true,
    }
}

/// Resolves revision windows with the default labels.
///
/// See [`VersionResolver::resolve`].
#[must_use]
pub fn resolve(
    revisions: &[RevisionRecord],
    months: impl IntoIterator<Item = Month>,
    selector: &VersionSelector,
    earliest_is_secondary: bool,
) -> BTreeMap<Month, Vec<ResolvedVersionWindow>> {
    VersionResolver::new(earliest_is_secondary).resolve(revisions, months, selector)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn no_months() -> Vec<Month> {
        Vec::new()
    }

    fn january() -> Month {
        Month::new(2024, 1).unwrap()
    }

    fn revision(label: &str, published: NaiveDate) -> RevisionRecord {
        RevisionRecord::new(label, date(2024, 1, 1), date(2024, 1, 31), published)
    }

    fn scenario_c() -> Vec<RevisionRecord> {
        vec![
            revision("TXR", date(2024, 1, 15)),
            revision("TXF", date(2024, 2, 1)),
        ]
    }

    fn labels_of(windows: &[ResolvedVersionWindow]) -> Vec<&str> {
        windows.iter().map(|w| w.version_label.as_str()).collect()
    }

    #[test]
    fn test_ranks_follow_publication_order() {
        let resolved = resolve(&scenario_c(), [january()], &VersionSelector::latest(), false);
        let windows = &resolved[&january()];
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].version_label, "TXF");
        assert_eq!(windows[0].rank, 0);
        assert!(!windows[0].synthetic);
    }

    #[test]
    fn test_offset_selects_exact_rank() {
        let revisions = vec![
            revision("TX1", date(2024, 2, 2)),
            revision("TXR", date(2024, 3, 5)),
            revision("TXF", date(2024, 5, 2)),
            revision("TXR2", date(2024, 4, 1)),
        ];
        for (n, expected) in [(0, "TXF"), (1, "TXR2"), (2, "TXR"), (3, "TX1")] {
            let resolved = resolve(&revisions, no_months(), &VersionSelector::offset(n), false);
            let windows = &resolved[&january()];
            assert_eq!(labels_of(windows), vec![expected]);
            assert_eq!(windows[0].rank, -n);
        }
    }

    #[test]
    fn test_offset_clamps_to_oldest() {
        let one = resolve(&scenario_c(), [january()], &VersionSelector::offset(1), false);
        let five = resolve(&scenario_c(), [january()], &VersionSelector::offset(5), false);
        assert_eq!(one[&january()][0].publication_date, date(2024, 1, 15));
        assert_eq!(five[&january()][0].publication_date, date(2024, 1, 15));
        assert_eq!(five[&january()][0].rank, -1);
    }

    #[test]
    fn test_missing_month_gets_one_placeholder() {
        let february = Month::new(2024, 2).unwrap();
        let resolved = resolve(
            &scenario_c(),
            [january(), february],
            &VersionSelector::label("TXF"),
            false,
        );

        let windows = &resolved[&february];
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].version_label, "0");
        assert_eq!(windows[0].period_start, date(2024, 1, 1));
        assert_eq!(windows[0].period_end, date(2024, 1, 1));
        assert_eq!(windows[0].publication_date, date(2024, 1, 1));
        assert_eq!(windows[0].rank, 0);
        assert!(windows[0].synthetic);
    }

    #[test]
    fn test_every_requested_month_resolves() {
        let months: Vec<Month> = (1..=6).filter_map(|m| Month::new(2023, m)).collect();
        let resolved = resolve(&[], months.clone(), &VersionSelector::latest(), false);
        assert_eq!(resolved.len(), 6);
        assert!(months.iter().all(|m| resolved[m].len() == 1));
    }

    #[test]
    fn test_newer_offset_synthesizes_placeholder() {
        let one = resolve(&scenario_c(), no_months(), &VersionSelector::offset(-1), false);
        let window = &one[&january()][0];
        assert_eq!(window.version_label, "TX2");
        assert_eq!(window.publication_date, date(2024, 2, 2));
        assert_eq!(window.period_start, date(2024, 1, 1));
        assert_eq!(window.period_end, date(2024, 1, 31));
        assert_eq!(window.rank, 1);
        assert!(window.synthetic);

        let two = resolve(&scenario_c(), no_months(), &VersionSelector::offset(-2), false);
        let window = &two[&january()][0];
        assert_eq!(window.version_label, "TX1");
        assert_eq!(window.publication_date, date(2024, 2, 3));
        assert_eq!(window.rank, 2);

        let flagged = resolve(&scenario_c(), no_months(), &VersionSelector::offset(-2), true);
        assert_eq!(flagged[&january()][0].version_label, "TX2");
        assert_eq!(flagged[&january()][0].publication_date, date(2024, 2, 2));
    }

    #[test]
    fn test_newer_offset_prefers_secondary() {
        let revisions = vec![
            revision("TX1", date(2024, 2, 2)),
            revision("TX2", date(2024, 2, 10)),
        ];
        let resolved = resolve(&revisions, no_months(), &VersionSelector::offset(-1), false);
        assert_eq!(labels_of(&resolved[&january()]), vec!["TX2"]);

        let only_tx1 = vec![revision("TX1", date(2024, 2, 2))];
        let resolved = resolve(&only_tx1, no_months(), &VersionSelector::offset(-1), false);
        assert_eq!(labels_of(&resolved[&january()]), vec!["TX1"]);
        assert!(!resolved[&january()][0].synthetic);
    }

    #[test]
    fn test_secondary_wins_when_flagged() {
        let revisions = vec![
            revision("TX2", date(2024, 2, 2)),
            revision("TXR", date(2024, 4, 2)),
            revision("TX1", date(2024, 1, 20)),
        ];

        let flagged = resolve(&revisions, no_months(), &VersionSelector::latest(), true);
        assert_eq!(labels_of(&flagged[&january()]), vec!["TX2"]);

        let unflagged = resolve(&revisions, no_months(), &VersionSelector::latest(), false);
        assert_eq!(labels_of(&unflagged[&january()]), vec!["TXR"]);
    }

    #[test]
    fn test_label_match_returns_all() {
        let revisions = vec![
            revision("TXR", date(2024, 3, 1)),
            revision("TXR", date(2024, 4, 1)),
            revision("TXF", date(2024, 5, 1)),
        ];
        let resolved = resolve(&revisions, no_months(), &VersionSelector::label("TXR"), false);
        let windows = &resolved[&january()];
        assert_eq!(labels_of(windows), vec!["TXR", "TXR"]);
        assert_eq!(windows[0].rank, -1);
        assert_eq!(windows[1].rank, -2);
    }

    #[test]
    fn test_interim_label_falls_back_to_secondary() {
        let revisions = vec![
            revision("TX2", date(2024, 2, 2)),
            revision("TXR", date(2024, 4, 2)),
        ];
        let resolved = resolve(&revisions, no_months(), &VersionSelector::label("TX1"), false);
        assert_eq!(labels_of(&resolved[&january()]), vec!["TX2"]);
    }

    #[test]
    fn test_interim_month_never_synthesizes_labels() {
        let only_tx1 = vec![revision("TX1", date(2024, 2, 2))];
        for label in ["TX2", "TXF"] {
            let resolved = resolve(&only_tx1, no_months(), &VersionSelector::label(label), false);
            assert!(resolved[&january()].is_empty(), "{label}");
        }

        let resolved = resolve(&only_tx1, no_months(), &VersionSelector::label("TX1"), false);
        assert_eq!(labels_of(&resolved[&january()]), vec!["TX1"]);
        assert!(!resolved[&january()][0].synthetic);
    }

    #[test]
    fn test_unpublished_label_synthesizes() {
        let tx2 = resolve(&scenario_c(), no_months(), &VersionSelector::label("TX2"), false);
        let window = &tx2[&january()][0];
        assert_eq!(window.version_label, "TX2");
        assert_eq!(window.publication_date, date(2024, 2, 2));
        assert!(window.synthetic);

        let tx1 = resolve(&scenario_c(), no_months(), &VersionSelector::label("TX1"), false);
        let window = &tx1[&january()][0];
        assert_eq!(window.version_label, "TX1");
        assert_eq!(window.publication_date, date(2024, 2, 3));
    }

    #[test]
    fn test_publication_ties_keep_arrival_order() {
        let revisions = vec![
            revision("A", date(2024, 2, 1)),
            revision("B", date(2024, 2, 1)),
        ];
        let resolved = resolve(&revisions, no_months(), &VersionSelector::offset(1), false);
        assert_eq!(labels_of(&resolved[&january()]), vec!["B"]);
    }

    #[test]
    fn test_months_include_year() {
        let mut revisions = scenario_c();
        revisions.push(RevisionRecord::new(
            "TXF",
            date(2023, 1, 1),
            date(2023, 1, 31),
            date(2023, 3, 1),
        ));
        let resolved = resolve(&revisions, no_months(), &VersionSelector::latest(), false);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[&Month::new(2023, 1).unwrap()][0].period_start, date(2023, 1, 1));
    }

    #[test]
    fn test_custom_labels() {
        let labels = VersionLabels {
            secondary: "A2".to_string(),
            provisional: "A1".to_string(),
            missing: "none".to_string(),
            interim: vec!["A1".to_string(), "A2".to_string()],
        };
        let resolver = VersionResolver::new(false).with_labels(labels);
        let resolved = resolver.resolve(&[], [january()], &VersionSelector::latest());
        assert_eq!(resolved[&january()][0].version_label, "none");
    }
}
