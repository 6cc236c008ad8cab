//! Date ranges, request pages and calendar months.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{DateRangeError, SliceError};

/// A range of dates for data retrieval.
///
/// Both bounds are inclusive. A range whose start lies after its end is
/// representable through [`DateRange::unchecked`] and simply covers no days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    /// Start date (inclusive).
    pub start: NaiveDate,
    /// End date (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a new date range, validating that start <= end.
    ///
    /// # Errors
    ///
    /// Returns an error if start > end.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateRangeError> {
        if start > end {
            return Err(DateRangeError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates a date range without validating the bounds.
    ///
    /// Inverted ranges are accepted and page to nothing.
    #[must_use]
    pub const fn unchecked(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Creates a date range for a single day.
    #[must_use]
    pub const fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Returns true if the range covers no days (start > end).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Returns the total number of days in the range.
    #[must_use]
    pub fn total_days(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        ((self.end - self.start).num_days() + 1) as usize
    }

    /// Returns true if the range contains the given date.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Returns the same range with its start moved back to the first day of
    /// its month.
    #[must_use]
    pub fn from_month_start(&self) -> Self {
        Self {
            start: Month::of(self.start).first_day(),
            end: self.end,
        }
    }

    /// Splits the range into request pages of at most `resolution` days.
    ///
    /// # Errors
    ///
    /// Returns [`SliceError::InvalidResolution`] if `resolution` is zero.
    pub fn pages(&self, resolution: u32) -> Result<PageIterator, SliceError> {
        if resolution == 0 {
            return Err(SliceError::InvalidResolution(resolution));
        }
        Ok(PageIterator::new(*self, resolution))
    }

    /// Returns every calendar month touched by the range, in order.
    #[must_use]
    pub fn months(&self) -> Vec<Month> {
        let mut months = Vec::new();
        if self.is_empty() {
            return months;
        }
        let last = Month::of(self.end);
        let mut current = Some(Month::of(self.start));
        while let Some(month) = current.filter(|m| *m <= last) {
            months.push(month);
            current = month.next();
        }
        months
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Splits `range` into consecutive closed pages of at most `resolution` days.
///
/// Convenience wrapper over [`DateRange::pages`].
///
/// # Errors
///
/// Returns [`SliceError::InvalidResolution`] if `resolution` is zero.
pub fn slice(range: DateRange, resolution: u32) -> Result<Vec<Page>, SliceError> {
    Ok(range.pages(resolution)?.collect())
}

/// One bounded sub-range of a larger date range, fetched by a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Page {
    /// First day of the page (inclusive).
    pub start: NaiveDate,
    /// Last day of the page (inclusive).
    pub end: NaiveDate,
}

impl Page {
    /// Creates a new page.
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Returns the number of days covered by the page.
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl std::fmt::Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Iterator over the request pages of a date range.
#[derive(Debug, Clone)]
pub struct PageIterator {
    next_start: Option<NaiveDate>,
    end: NaiveDate,
    resolution: u32,
}

impl PageIterator {
    fn new(range: DateRange, resolution: u32) -> Self {
        Self {
            next_start: (!range.is_empty()).then_some(range.start),
            end: range.end,
            resolution,
        }
    }
}

impl Iterator for PageIterator {
    type Item = Page;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next_start?;

        // Pages are closed intervals, so a page of N days ends N - 1 days after it starts.
        let end = start
            .checked_add_days(Days::new(u64::from(self.resolution - 1)))
            .map_or(self.end, |candidate| candidate.min(self.end));

        self.next_start = if end < self.end { end.succ_opt() } else { None };
        Some(Page::new(start, end))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let Some(start) = self.next_start else {
            return (0, Some(0));
        };
        let days = ((self.end - start).num_days() + 1) as usize;
        let pages = days.div_ceil(self.resolution as usize);
        (pages, Some(pages))
    }
}

impl ExactSizeIterator for PageIterator {}

/// A calendar month, the unit over which revisions are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Month(NaiveDate);

impl Month {
    /// Creates a month from a year and a 1-based month number.
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    /// Returns the month containing `date`.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self(date - Days::new(u64::from(date.day0())))
    }

    /// Returns the calendar year.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Returns the 1-based month number.
    #[must_use]
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Returns the first day of the month.
    #[must_use]
    pub const fn first_day(&self) -> NaiveDate {
        self.0
    }

    /// Returns the last day of the month.
    #[must_use]
    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .and_then(|next| next.first_day().pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Returns the following month, if representable.
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add_months(Months::new(1)).map(Self)
    }

    /// Returns the preceding month, saturating at the earliest representable one.
    #[must_use]
    pub fn previous(&self) -> Self {
        self.0
            .checked_sub_months(Months::new(1))
            .map_or(*self, Self)
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_range_new() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert_eq!(range.start, date(2024, 1, 1));
        assert_eq!(range.end, date(2024, 1, 31));
        assert_eq!(range.total_days(), 31);
    }

    #[test]
    fn test_date_range_invalid() {
        assert!(DateRange::new(date(2024, 1, 31), date(2024, 1, 1)).is_err());
        let inverted = DateRange::unchecked(date(2024, 1, 31), date(2024, 1, 1));
        assert!(inverted.is_empty());
        assert_eq!(inverted.total_days(), 0);
    }

    #[test]
    fn test_single_page() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 5)).unwrap();
        let pages = slice(range, 31).unwrap();
        assert_eq!(pages, vec![Page::new(date(2024, 1, 1), date(2024, 1, 5))]);
    }

    #[test]
    fn test_pages_leap_year_boundaries() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 3, 15)).unwrap();
        let pages = slice(range, 31).unwrap();
        assert_eq!(
            pages,
            vec![
                Page::new(date(2024, 1, 1), date(2024, 1, 31)),
                Page::new(date(2024, 2, 1), date(2024, 3, 2)),
                Page::new(date(2024, 3, 3), date(2024, 3, 15)),
            ]
        );
    }

    #[test]
    fn test_pages_tile_range() {
        let ranges = [
            (date(2020, 2, 29), date(2024, 12, 31)),
            (date(2023, 1, 1), date(2023, 1, 1)),
            (date(2023, 5, 17), date(2023, 6, 16)),
            (date(2023, 5, 17), date(2023, 6, 17)),
        ];
        for (start, end) in ranges {
            for resolution in [1, 7, 31, 731, 1827] {
                let range = DateRange::new(start, end).unwrap();
                let pages = slice(range, resolution).unwrap();

                assert_eq!(pages.first().unwrap().start, start);
                assert_eq!(pages.last().unwrap().end, end);
                for pair in pages.windows(2) {
                    assert_eq!(pair[1].start, pair[0].end.succ_opt().unwrap());
                }
                for page in &pages {
                    assert!(page.days() >= 1);
                    assert!(page.days() <= i64::from(resolution));
                }
                assert_eq!(range.pages(resolution).unwrap().len(), pages.len());
            }
        }
    }

    #[test]
    fn test_inverted_range_has_no_pages() {
        let range = DateRange::unchecked(date(2024, 3, 1), date(2024, 1, 1));
        assert!(slice(range, 31).unwrap().is_empty());
        assert!(range.months().is_empty());
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let range = DateRange::single_day(date(2024, 1, 1));
        assert_eq!(
            slice(range, 0).unwrap_err(),
            SliceError::InvalidResolution(0)
        );
    }

    #[test]
    fn test_months_touched() {
        let range = DateRange::new(date(2023, 11, 20), date(2024, 2, 1)).unwrap();
        let months: Vec<String> = range.months().iter().map(ToString::to_string).collect();
        assert_eq!(months, vec!["2023-11", "2023-12", "2024-01", "2024-02"]);
    }

    #[test]
    fn test_month_navigation() {
        let march = Month::of(date(2024, 3, 18));
        assert_eq!(march.first_day(), date(2024, 3, 1));
        assert_eq!(march.previous().last_day(), date(2024, 2, 29));
        assert_eq!(Month::new(2024, 1).unwrap().previous(), Month::new(2023, 12).unwrap());
        assert!(Month::new(2024, 13).is_none());
    }

    #[test]
    fn test_from_month_start() {
        let range = DateRange::new(date(2024, 2, 10), date(2024, 2, 20)).unwrap();
        assert_eq!(range.from_month_start().start, date(2024, 2, 1));
    }
}
