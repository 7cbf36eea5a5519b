use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Schema error in feed '{feed}': {reason}")]
    Schema { feed: String, reason: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),
}

impl FeedError {
    pub fn fetch(url: impl Into<String>, reason: impl Into<String>) -> Self {
        FeedError::Fetch {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn schema(feed: impl Into<String>, reason: impl Into<String>) -> Self {
        FeedError::Schema {
            feed: feed.into(),
            reason: reason.into(),
        }
    }

    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            FeedError::Fetch { .. } => "fetch",
            FeedError::Schema { .. } => "schema",
            FeedError::Configuration(_) => "configuration",
            FeedError::Io(_) => "io",
            FeedError::Toml(_) => "toml",
        }
    }
}

pub type Result<T> = std::result::Result<T, FeedError>;
