//! Error types for loading profile feeds.

use std::time::Duration;

/// Errors raised while loading or querying a feed.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Profile API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Feed is scoped to subject `{current}`, not `{requested}`")]
    SubjectMismatch { current: String, requested: String },

    #[error("Category `{category}` is not present in the loaded records")]
    UnknownCategory { category: String },
}

impl FeedError {
    /// Whether this is a load failure the caller should show as "unable to load".
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FeedError::Transport(_)
                | FeedError::Timeout(_)
                | FeedError::Api { .. }
                | FeedError::Decode(_)
        )
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(e: reqwest::Error) -> Self {
        FeedError::Transport(Box::new(e))
    }
}
