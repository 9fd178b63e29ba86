use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-wide settings for the training and reporting commands.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Directory holding the raw corpus and the brand summary.
    pub data_dir: PathBuf,
    /// Where the refit pipeline is written.
    pub model_path: PathBuf,
    /// Seed for the stratified split and the synthetic generator.
    pub seed: u64,
    /// Held-out share of each class, in `(0, 1)`.
    pub test_fraction: f64,
    /// Absolute document-frequency floor.
    pub min_df: usize,
    /// Document-frequency ceiling as a fraction of the corpus, in `(0, 1]`.
    pub max_df: f64,
    pub max_iter: usize,
    /// Inverse L2 regularization strength.
    pub regularization_c: f64,
    pub tolerance: f64,
}

impl AppConfig {
    /// Filter used when `RUST_LOG` is unset. The test environment only
    /// reports warnings so fitting runs stay quiet.
    #[must_use]
    pub fn default_log_filter(&self) -> &str {
        match self.env {
            Environment::Test => "warn",
            Environment::Development | Environment::Production => &self.log_level,
        }
    }

    #[must_use]
    pub fn posts_path(&self) -> PathBuf {
        self.data_dir.join("social_posts_raw.csv")
    }

    #[must_use]
    pub fn summary_path(&self) -> PathBuf {
        self.data_dir.join("brand_sentiment_summary.csv")
    }
}
