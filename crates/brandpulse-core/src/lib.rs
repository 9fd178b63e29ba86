//! Shared records, schema validation and configuration for brandpulse.

pub mod app_config;
pub mod config;
pub mod posts;
pub mod sentiment;
pub mod synthetic;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use posts::{load_posts, read_posts, write_posts, Post, REQUIRED_COLUMNS, TIMESTAMP_FORMAT};
pub use sentiment::Sentiment;
pub use synthetic::{generate_posts, SyntheticConfig};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("config validation failed: {0}")]
    Validation(String),
}

/// Input-schema errors raised while loading a post corpus.
///
/// Every variant aborts the load; no partially validated corpus is returned.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("post {post_id} has invalid sentiment {value:?}; expected Positive, Negative or Neutral")]
    InvalidSentiment { post_id: String, value: String },

    #[error("post {post_id} has invalid created_at {value:?}: {reason}")]
    InvalidTimestamp {
        post_id: String,
        value: String,
        reason: String,
    },

    #[error("duplicate post_id: {0}")]
    DuplicatePostId(String),
}
