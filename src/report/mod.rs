//! Report models and rendering.

pub mod generator;

pub use generator::{
    generate_activity_markdown, generate_json_report, generate_orders_markdown, write_output,
    RenderOptions,
};

use crate::client::EventSource;
use crate::feed::{display_label, display_properties, ActivityFeed};
use crate::models::EventRecord;
use crate::orders::OrderSummary;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A snapshot of an activity feed, ready to render.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityReport {
    pub profile_id: String,
    pub generated_at: DateTime<Utc>,
    /// Category the entries are filtered to.
    pub filter: String,
    pub categories: Vec<String>,
    pub total_records: usize,
    pub loaded_records: usize,
    pub page_size: usize,
    pub has_more: bool,
    pub entries: Vec<ActivityEntry>,
}

/// One rendered activity event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub category: String,
    pub timestamp: Option<DateTime<Utc>>,
    /// The event's `$value`, when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub properties: Vec<DisplayProperty>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayProperty {
    pub key: String,
    pub label: String,
    pub value: String,
}

impl ActivityEntry {
    pub fn from_record(record: &EventRecord) -> Self {
        Self {
            id: record.id.clone(),
            category: record.category.clone(),
            timestamp: record.timestamp,
            value: record.headline_value().map(|v| v.to_string()),
            properties: display_properties(record)
                .into_iter()
                .map(|(key, value)| DisplayProperty {
                    key: key.to_string(),
                    label: display_label(key),
                    value,
                })
                .collect(),
        }
    }
}

impl ActivityReport {
    /// Snapshot the feed's currently visible records.
    pub fn from_feed<S: EventSource>(feed: &ActivityFeed<S>) -> Self {
        Self {
            profile_id: feed.subject_id().to_string(),
            generated_at: Utc::now(),
            filter: feed.selected_category().to_string(),
            categories: feed.available_categories(),
            total_records: feed.total_records(),
            loaded_records: feed.records().len(),
            page_size: feed.page_size(),
            has_more: feed.has_more(),
            entries: feed
                .visible_records()
                .into_iter()
                .map(ActivityEntry::from_record)
                .collect(),
        }
    }

    /// Events on the server that are not loaded yet.
    pub fn remaining(&self) -> usize {
        self.total_records.saturating_sub(self.loaded_records)
    }
}

/// A profile's order history, ready to render.
#[derive(Debug, Clone, Serialize)]
pub struct OrderReport {
    pub profile_id: String,
    pub generated_at: DateTime<Utc>,
    pub orders: Vec<OrderSummary>,
}

impl OrderReport {
    pub fn new(profile_id: impl Into<String>, orders: Vec<OrderSummary>) -> Self {
        Self {
            profile_id: profile_id.into(),
            generated_at: Utc::now(),
            orders,
        }
    }
}
