//! Paged activity feed for a single subject.
//!
//! The feed re-fetches from the first page on every load and replaces its
//! records wholesale, so growing the page size is how "load more" works.

pub mod properties;

pub use properties::{
    display_label, display_properties, is_displayable, DISPLAY_ALLOW_LIST,
    MAX_DISPLAYED_PROPERTIES,
};

use crate::client::EventSource;
use crate::error::FeedError;
use crate::models::EventRecord;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Page size of a freshly scoped feed.
pub const INITIAL_PAGE_SIZE: usize = 10;

/// How much `request_more` grows the page size.
pub const PAGE_SIZE_INCREMENT: usize = 10;

/// Category value that disables filtering.
pub const ALL_CATEGORIES: &str = "All";

/// Load state of a feed, for the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FeedStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    /// The last load failed; records are from the load before it.
    Failed(String),
}

/// Outcome of a successful page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    pub loaded: usize,
    pub total_records: usize,
    pub page_size: usize,
}

/// Holds a feed's status at `Loading` for the duration of one request.
///
/// A load dropped before it settles (a cancelled or timed-out future)
/// puts the previous status back.
struct LoadingGuard<'a> {
    status: &'a mut FeedStatus,
    previous: Option<FeedStatus>,
}

impl<'a> LoadingGuard<'a> {
    fn enter(status: &'a mut FeedStatus) -> Self {
        let previous = std::mem::replace(status, FeedStatus::Loading);
        Self {
            status,
            previous: Some(previous),
        }
    }

    fn settle(mut self, next: FeedStatus) {
        self.previous = None;
        *self.status = next;
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            *self.status = previous;
        }
    }
}

/// Accumulated activity records for one subject.
///
/// Loads take `&mut self`, so at most one request per feed is in flight.
pub struct ActivityFeed<S> {
    source: S,
    subject_id: String,
    page_size: usize,
    records: Vec<EventRecord>,
    total_records: usize,
    selected_category: String,
    status: FeedStatus,
}

impl<S: EventSource> ActivityFeed<S> {
    /// Create an empty feed scoped to `subject_id`.
    pub fn new(source: S, subject_id: impl Into<String>) -> Self {
        Self {
            source,
            subject_id: subject_id.into(),
            page_size: INITIAL_PAGE_SIZE,
            records: Vec::new(),
            total_records: 0,
            selected_category: ALL_CATEGORIES.to_string(),
            status: FeedStatus::Idle,
        }
    }

    /// Re-scope the feed to another subject, dropping everything loaded.
    pub fn set_subject(&mut self, subject_id: impl Into<String>) {
        self.subject_id = subject_id.into();
        self.page_size = INITIAL_PAGE_SIZE;
        self.records.clear();
        self.total_records = 0;
        self.selected_category = ALL_CATEGORIES.to_string();
        self.status = FeedStatus::Idle;
        debug!("Feed re-scoped to {}", self.subject_id);
    }

    /// Fetch the first `page_size` events of `subject_id` and replace the
    /// loaded records with them.
    ///
    /// On failure the previously loaded records and totals are kept and the
    /// error is returned as-is. If the returned future is dropped mid-request
    /// the feed goes back to the status it had before the call.
    pub async fn load_page(
        &mut self,
        subject_id: &str,
        page_size: usize,
    ) -> Result<PageSummary, FeedError> {
        if subject_id.is_empty() {
            return Err(FeedError::InvalidRequest {
                message: "subject id must not be empty".to_string(),
            });
        }
        if page_size == 0 {
            return Err(FeedError::InvalidRequest {
                message: "page size must be positive".to_string(),
            });
        }
        if subject_id != self.subject_id {
            return Err(FeedError::SubjectMismatch {
                current: self.subject_id.clone(),
                requested: subject_id.to_string(),
            });
        }

        let guard = LoadingGuard::enter(&mut self.status);
        info!("Loading up to {} events for {}", page_size, subject_id);

        match self.source.fetch_events(subject_id, 1, page_size).await {
            Ok(page) => {
                let mut records = page.data;
                if records.len() > page_size {
                    warn!(
                        "Source returned {} events for a page of {}; truncating",
                        records.len(),
                        page_size
                    );
                    records.truncate(page_size);
                }

                self.records = records;
                self.total_records = page.total_records;
                self.page_size = page_size;
                guard.settle(FeedStatus::Ready);

                Ok(PageSummary {
                    loaded: self.records.len(),
                    total_records: self.total_records,
                    page_size,
                })
            }
            Err(e) => {
                warn!("Failed to load events for {}: {}", subject_id, e);
                guard.settle(FeedStatus::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    /// [`load_page`](Self::load_page) with a deadline; expiry counts as a
    /// transport failure.
    pub async fn load_page_within(
        &mut self,
        subject_id: &str,
        page_size: usize,
        deadline: Duration,
    ) -> Result<PageSummary, FeedError> {
        match tokio::time::timeout(deadline, self.load_page(subject_id, page_size)).await {
            Ok(result) => result,
            Err(_) => {
                let err = FeedError::Timeout(deadline);
                warn!("Loading events for {} timed out", subject_id);
                self.status = FeedStatus::Failed(err.to_string());
                Err(err)
            }
        }
    }

    /// Reload the current subject at the current page size.
    pub async fn refresh(&mut self) -> Result<PageSummary, FeedError> {
        let subject_id = self.subject_id.clone();
        self.load_page(&subject_id, self.page_size).await
    }

    /// Grow the page size by [`PAGE_SIZE_INCREMENT`] if the server has more
    /// records than requested so far. Returns the resulting page size.
    pub fn request_more(&mut self) -> usize {
        if self.has_more() {
            self.page_size += PAGE_SIZE_INCREMENT;
            debug!("Page size for {} grown to {}", self.subject_id, self.page_size);
        }
        self.page_size
    }

    /// Request more and load the grown page in one step.
    ///
    /// Returns `Ok(None)` when everything is loaded already. Unlike calling
    /// [`request_more`](Self::request_more) first, a failed load leaves the
    /// page size where it was.
    pub async fn load_more(&mut self) -> Result<Option<PageSummary>, FeedError> {
        if !self.has_more() {
            return Ok(None);
        }
        let subject_id = self.subject_id.clone();
        let target = self.page_size + PAGE_SIZE_INCREMENT;
        self.load_page(&subject_id, target).await.map(Some)
    }

    /// Whether the server holds more events than the current page size.
    pub fn has_more(&self) -> bool {
        self.page_size < self.total_records
    }

    /// `"All"` followed by each distinct record category in first-seen order.
    pub fn available_categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut categories = vec![ALL_CATEGORIES.to_string()];

        for record in &self.records {
            if seen.insert(record.category.as_str()) {
                categories.push(record.category.clone());
            }
        }

        categories
    }

    /// Records in `category`, or all records for `"All"`, in load order.
    pub fn filtered_records(&self, category: &str) -> Vec<&EventRecord> {
        self.records
            .iter()
            .filter(|r| category == ALL_CATEGORIES || r.category == category)
            .collect()
    }

    /// Select the category used by [`visible_records`](Self::visible_records).
    ///
    /// The selection is validated now but kept even if a later load no
    /// longer contains the category.
    pub fn select_category(&mut self, category: &str) -> Result<(), FeedError> {
        if category != ALL_CATEGORIES && !self.records.iter().any(|r| r.category == category) {
            return Err(FeedError::UnknownCategory {
                category: category.to_string(),
            });
        }
        self.selected_category = category.to_string();
        Ok(())
    }

    /// Records in the selected category.
    pub fn visible_records(&self) -> Vec<&EventRecord> {
        self.filtered_records(&self.selected_category)
    }

    /// Category chosen with [`select_category`](Self::select_category).
    pub fn selected_category(&self) -> &str {
        &self.selected_category
    }

    /// Subject the feed is scoped to.
    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    /// Page size of the last successful load, or as grown by `request_more`.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Loaded records, in the order the server sent them.
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Total reported by the server on the last successful load.
    pub fn total_records(&self) -> usize {
        self.total_records
    }

    /// Current load state.
    pub fn status(&self) -> &FeedStatus {
        &self.status
    }

    /// Whether a load is in flight.
    pub fn is_loading(&self) -> bool {
        self.status == FeedStatus::Loading
    }
}
