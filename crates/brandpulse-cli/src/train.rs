//! `train`: evaluate, refit, persist the pipeline and the brand summary.

use std::path::PathBuf;

use anyhow::Context;
use brandpulse_core::{load_posts, AppConfig};
use brandpulse_sentiment::{aggregate, train_and_evaluate, EvaluationReport, TrainingConfig};

/// Input and output locations for one training run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TrainPaths {
    pub(crate) input: PathBuf,
    pub(crate) model: PathBuf,
    pub(crate) summary: PathBuf,
}

impl TrainPaths {
    /// Flags win over the configured locations.
    pub(crate) fn resolve(
        config: &AppConfig,
        input: Option<PathBuf>,
        model: Option<PathBuf>,
        summary: Option<PathBuf>,
    ) -> Self {
        Self {
            input: input.unwrap_or_else(|| config.posts_path()),
            model: model.unwrap_or_else(|| config.model_path.clone()),
            summary: summary.unwrap_or_else(|| config.summary_path()),
        }
    }
}

pub(crate) fn run_train(config: &AppConfig, paths: &TrainPaths, json: bool) -> anyhow::Result<()> {
    let posts = load_posts(&paths.input)
        .with_context(|| format!("failed to load posts from {}", paths.input.display()))?;
    tracing::info!(posts = posts.len(), path = %paths.input.display(), "corpus loaded");

    let training = TrainingConfig::from_app_config(config);
    let outcome = train_and_evaluate(&posts, &training).context("training failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.evaluation)?);
    } else {
        print!("{}", format_evaluation(&outcome.evaluation));
    }

    outcome
        .pipeline
        .save(&paths.model)
        .with_context(|| format!("failed to save model to {}", paths.model.display()))?;

    let summary = aggregate(&posts).context("failed to aggregate brand sentiment")?;
    summary
        .save(&paths.summary)
        .with_context(|| format!("failed to write summary to {}", paths.summary.display()))?;

    if !outcome.refit.converged {
        tracing::warn!(
            iterations = outcome.refit.iterations,
            "deployed model stopped at the iteration cap"
        );
    }
    println!("model saved to {}", paths.model.display());
    println!("brand summary saved to {}", paths.summary.display());
    Ok(())
}

pub(crate) fn format_evaluation(report: &EvaluationReport) -> String {
    format!(
        "held-out evaluation ({} train / {} test)\n\
         accuracy: {:.3}\n\n\
         classification report:\n{}\n\
         confusion matrix (rows = truth, columns = predicted):\n{}\n\
         note: {}\n",
        report.train_size,
        report.test_size,
        report.accuracy,
        report.classification,
        report.confusion,
        report.caveat,
    )
}
