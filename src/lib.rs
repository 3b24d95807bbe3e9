//! profile-feed - paged activity log and order history for profile dashboards.
//!
//! [`feed::ActivityFeed`] accumulates a subject's events from an
//! [`client::EventSource`], growing its page size ten at a time and
//! re-fetching from the first page on each load. It derives filter categories
//! from what is loaded and projects each event onto a fixed allow-list of
//! displayable properties. [`orders`] summarizes order history the same way,
//! and [`report`] renders both as Markdown or JSON.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod feed;
pub mod models;
pub mod orders;
pub mod report;

pub use client::{EventSource, OrderSource, ProfileApiClient};
pub use error::FeedError;
pub use feed::{ActivityFeed, FeedStatus, PageSummary};
pub use models::{EventPage, EventRecord, OrderRecord, PropertyValue};
