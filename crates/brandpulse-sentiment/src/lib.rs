//! Sentiment learning pipeline for brandpulse.
//!
//! Extracts TF-IDF unigram/bigram features from post text, trains a
//! multinomial logistic-regression classifier, evaluates it on a stratified
//! held-out split, refits on the full corpus for deployment, and aggregates
//! ground-truth labels into a per-brand sentiment summary.

pub mod aggregate;
pub mod classifier;
pub mod error;
pub mod features;
pub mod metrics;
pub mod pipeline;
pub mod split;
pub mod training;

mod optim;
mod stop_words;

pub use aggregate::{aggregate, BrandSentimentRow, BrandSentimentSummary};
pub use classifier::{ClassifierConfig, FitReport, SoftmaxClassifier};
pub use error::SentimentError;
pub use features::{analyze, FeatureConfig, SparseVector, TfidfVectorizer};
pub use metrics::{ClassMetrics, ClassificationReport, ConfusionMatrix};
pub use pipeline::{PipelineConfig, SentimentPipeline};
pub use split::{stratified_split, StratifiedSplit};
pub use training::{
    train_and_evaluate, EvaluationReport, TrainingConfig, TrainingOutcome, METRICS_CAVEAT,
};
