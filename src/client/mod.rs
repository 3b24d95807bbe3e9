//! Data sources for profile events and orders.
//!
//! The feed only sees the [`EventSource`] trait; [`ProfileApiClient`] is the
//! HTTP implementation used by the CLI.

pub mod api;

pub use api::ProfileApiClient;

use crate::error::FeedError;
use crate::models::{EventPage, OrderRecord};
use async_trait::async_trait;

/// Supplies pages of events for a subject.
///
/// Pages are cumulative: a request for `page = 1, page_size = N` returns the
/// first `N` events, and the server tolerates `N` exceeding its total.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn fetch_events(
        &self,
        subject_id: &str,
        page: usize,
        page_size: usize,
    ) -> Result<EventPage, FeedError>;
}

/// Supplies a subject's order history.
#[async_trait]
pub trait OrderSource: Send + Sync {
    async fn fetch_order_history(&self, subject_id: &str) -> Result<Vec<OrderRecord>, FeedError>;
}

#[async_trait]
impl<'a, T: EventSource + ?Sized> EventSource for &'a T {
    async fn fetch_events(
        &self,
        subject_id: &str,
        page: usize,
        page_size: usize,
    ) -> Result<EventPage, FeedError> {
        (**self).fetch_events(subject_id, page, page_size).await
    }
}
