//! Concurrent page fetching and record assembly.

use despacho_types::{DateRange, Page, Record, SliceError};
use futures::stream::{self, StreamExt, TryStreamExt};
use thiserror::Error;

use crate::{Endpoint, ParseError, Transport, TransportError};

/// Why a single page failed.
#[derive(Error, Debug)]
pub enum PageError {
    /// The request could not be completed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response could not be read.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Errors that can occur while fetching a paged range.
#[derive(Error, Debug)]
pub enum FetchError {
    /// A page failed; the remaining requests were cancelled.
    #[error("Failed to fetch page {page}: {source}")]
    Page {
        /// The failed page.
        page: Page,
        /// The underlying failure.
        #[source]
        source: PageError,
    },

    /// The range could not be paged.
    #[error(transparent)]
    Slice(#[from] SliceError),
}

/// The records returned for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageBatch {
    /// The page requested.
    pub page: Page,
    /// The records in this batch.
    pub records: Vec<Record>,
    /// Whether this batch had an error that was skipped.
    pub had_error: bool,
}

impl PageBatch {
    /// Creates a new batch.
    #[must_use]
    pub const fn new(page: Page, records: Vec<Record>) -> Self {
        Self {
            page,
            records,
            had_error: false,
        }
    }

    /// Creates a batch that stands in for a failed page.
    #[must_use]
    pub const fn skipped_error(page: Page) -> Self {
        Self {
            page,
            records: Vec::new(),
            had_error: true,
        }
    }

    /// Returns true if the batch is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the number of records in the batch.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if this batch had an error that was skipped.
    #[must_use]
    pub const fn had_error(&self) -> bool {
        self.had_error
    }
}

async fn fetch_page<T, E>(transport: &T, endpoint: &E, page: Page) -> Result<PageBatch, PageError>
where
    T: Transport + ?Sized,
    E: Endpoint + ?Sized,
{
    let request = endpoint.request(&page);
    let response = transport.send(&request).await?;
    let records = endpoint.records(&response)?;
    tracing::debug!(%page, url = %request.url, records = records.len(), "fetched page");
    Ok(PageBatch::new(page, records))
}

/// Fetches every page concurrently and returns the batches in page order.
///
/// At most `concurrency` requests are in flight. The first failure is
/// returned as [`FetchError::Page`] and the requests still in flight are
/// dropped.
///
/// # Errors
///
/// Returns the first page failure.
pub async fn fetch_pages<T, E>(
    transport: &T,
    endpoint: &E,
    pages: &[Page],
    concurrency: usize,
) -> Result<Vec<PageBatch>, FetchError>
where
    T: Transport + ?Sized,
    E: Endpoint + ?Sized,
{
    let mut batches: Vec<(usize, PageBatch)> = stream::iter(pages.iter().copied().enumerate())
        .map(|(index, page)| async move {
            fetch_page(transport, endpoint, page)
                .await
                .map(|batch| (index, batch))
                .map_err(|source| FetchError::Page { page, source })
        })
        .buffer_unordered(concurrency.max(1))
        .try_collect()
        .await?;

    batches.sort_by_key(|(index, _)| *index);
    Ok(batches.into_iter().map(|(_, batch)| batch).collect())
}

/// Fetches every page concurrently, skipping failed pages instead of failing.
///
/// Failed pages come back as empty batches with `had_error` set, so callers
/// can tell a gap from a page without data.
pub async fn fetch_pages_resilient<T, E>(
    transport: &T,
    endpoint: &E,
    pages: &[Page],
    concurrency: usize,
) -> Vec<PageBatch>
where
    T: Transport + ?Sized,
    E: Endpoint + ?Sized,
{
    let mut batches: Vec<(usize, PageBatch)> = stream::iter(pages.iter().copied().enumerate())
        .map(|(index, page)| async move {
            let batch = match fetch_page(transport, endpoint, page).await {
                Ok(batch) => batch,
                Err(error) => {
                    tracing::warn!(%page, %error, "skipping failed page");
                    PageBatch::skipped_error(page)
                }
            };
            (index, batch)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    batches.sort_by_key(|(index, _)| *index);
    batches.into_iter().map(|(_, batch)| batch).collect()
}

/// Concatenates page batches into one record sequence, in page order.
///
/// Records are neither deduplicated nor reordered within a page.
#[must_use]
pub fn assemble(batches: impl IntoIterator<Item = PageBatch>) -> Vec<Record> {
    let mut batches: Vec<PageBatch> = batches.into_iter().collect();
    batches.sort_by_key(|batch| batch.page.start);
    batches.into_iter().flat_map(|batch| batch.records).collect()
}

/// Pages a date range, fetches every page and assembles the records.
///
/// # Errors
///
/// Returns an error if `resolution` is zero or a page fails.
pub async fn fetch_range<T, E>(
    transport: &T,
    endpoint: &E,
    range: DateRange,
    resolution: u32,
    concurrency: usize,
) -> Result<Vec<Record>, FetchError>
where
    T: Transport + ?Sized,
    E: Endpoint + ?Sized,
{
    let pages = despacho_types::slice(range, resolution)?;
    let batches = fetch_pages(transport, endpoint, &pages, concurrency).await?;
    let records = assemble(batches);
    tracing::info!(
        start = %range.start,
        end = %range.end,
        pages = pages.len(),
        records = records.len(),
        "fetched range"
    );
    Ok(records)
}
