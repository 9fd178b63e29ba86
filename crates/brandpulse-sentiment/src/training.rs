//! Train/evaluate/refit orchestration.
//!
//! 1. Stratified split of the labeled corpus.
//! 2. Fit a fresh pipeline on the training partition only.
//! 3. Score the held-out partition.
//! 4. Drop that pipeline and refit a new one on every post.
//!
//! The returned pipeline is the full-corpus refit. The metrics describe the
//! evaluation-split pipeline, which is never returned; see
//! [`EvaluationReport::caveat`].

use brandpulse_core::{AppConfig, Post, Sentiment};
use serde::Serialize;

use crate::classifier::{ClassifierConfig, FitReport};
use crate::error::SentimentError;
use crate::features::FeatureConfig;
use crate::metrics::{ClassificationReport, ConfusionMatrix};
use crate::pipeline::{PipelineConfig, SentimentPipeline};
use crate::split::stratified_split;

pub const METRICS_CAVEAT: &str = "metrics were measured on a pipeline fitted to the training \
     split only; the delivered pipeline was refit on the full corpus and has not itself been \
     evaluated on held-out data";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingConfig {
    pub seed: u64,
    /// Held-out share of each class.
    pub test_fraction: f64,
    pub pipeline: PipelineConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            test_fraction: 0.2,
            pipeline: PipelineConfig::default(),
        }
    }
}

impl TrainingConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            seed: config.seed,
            test_fraction: config.test_fraction,
            pipeline: PipelineConfig {
                features: FeatureConfig {
                    min_df: config.min_df,
                    max_df: config.max_df,
                },
                classifier: ClassifierConfig {
                    regularization_c: config.regularization_c,
                    max_iter: config.max_iter,
                    tolerance: config.tolerance,
                },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub train_size: usize,
    pub test_size: usize,
    pub accuracy: f64,
    pub confusion: ConfusionMatrix,
    pub classification: ClassificationReport,
    /// Optimiser outcome for the evaluation-split fit.
    pub fit: FitReport,
    pub caveat: &'static str,
}

#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub evaluation: EvaluationReport,
    /// Fitted on every post; this is what gets persisted.
    pub pipeline: SentimentPipeline,
    pub refit: FitReport,
}

/// Run the full protocol over `posts`.
///
/// # Errors
///
/// Returns [`SentimentError::InsufficientData`] from the split before any
/// fitting happens, or any error raised while fitting either pipeline.
pub fn train_and_evaluate(
    posts: &[Post],
    config: &TrainingConfig,
) -> Result<TrainingOutcome, SentimentError> {
    let texts: Vec<&str> = posts.iter().map(|p| p.text.as_str()).collect();
    let labels: Vec<Sentiment> = posts.iter().map(|p| p.sentiment).collect();

    let split = stratified_split(&labels, config.test_fraction, config.seed)?;
    let pick_texts = |rows: &[usize]| rows.iter().map(|&i| texts[i]).collect::<Vec<&str>>();
    let pick_labels = |rows: &[usize]| rows.iter().map(|&i| labels[i]).collect::<Vec<_>>();

    let evaluation = {
        let mut pipeline = SentimentPipeline::new(config.pipeline);
        let fit = pipeline.fit(&pick_texts(&split.train), &pick_labels(&split.train))?;

        let truth = pick_labels(&split.test);
        let predicted = pipeline.predict(&pick_texts(&split.test))?;
        let confusion = ConfusionMatrix::from_labels(&truth, &predicted)?;
        let classification = ClassificationReport::from_confusion(&confusion);

        tracing::info!(
            train = split.train.len(),
            test = split.test.len(),
            accuracy = confusion.accuracy(),
            "held-out evaluation complete"
        );

        EvaluationReport {
            train_size: split.train.len(),
            test_size: split.test.len(),
            accuracy: confusion.accuracy(),
            confusion,
            classification,
            fit,
            caveat: METRICS_CAVEAT,
        }
    };

    let mut pipeline = SentimentPipeline::new(config.pipeline);
    let refit = pipeline.fit(&texts, &labels)?;
    tracing::info!(documents = texts.len(), "refit on full corpus complete");

    Ok(TrainingOutcome {
        evaluation,
        pipeline,
        refit,
    })
}

#[cfg(test)]
#[path = "training_test.rs"]
mod tests;
