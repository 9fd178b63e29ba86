use brandpulse_core::Sentiment;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentimentError {
    /// A class cannot be represented in both partitions of the split.
    #[error(
        "insufficient data for {label}: {count} examples cannot be split into non-empty train and held-out partitions"
    )]
    InsufficientData { label: Sentiment, count: usize },

    #[error("feature extraction error: {0}")]
    Features(String),

    #[error("texts and labels differ in length: {texts} texts, {labels} labels")]
    LengthMismatch { texts: usize, labels: usize },

    #[error("pipeline has not been fitted")]
    NotFitted,

    #[error("aggregation invariant violated for brand '{brand}': {reason}")]
    Aggregation { brand: String, reason: String },

    #[error("model artifact error: {0}")]
    Artifact(#[from] serde_json::Error),

    /// A model artifact parsed but its parts disagree on dimensions.
    #[error("inconsistent model artifact: {0}")]
    InvalidArtifact(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
