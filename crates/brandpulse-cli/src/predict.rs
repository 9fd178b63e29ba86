//! `predict`: classify free text with a saved pipeline.

use std::path::PathBuf;

use anyhow::Context;
use brandpulse_core::{AppConfig, Sentiment};
use brandpulse_sentiment::SentimentPipeline;

pub(crate) fn run_predict(
    config: &AppConfig,
    model: Option<PathBuf>,
    texts: &[String],
) -> anyhow::Result<()> {
    let model = model.unwrap_or_else(|| config.model_path.clone());
    let pipeline = SentimentPipeline::load(&model)
        .with_context(|| format!("failed to load model from {}", model.display()))?;

    let labels = pipeline.predict(texts)?;
    let probabilities = pipeline.predict_proba(texts)?;

    for ((text, label), proba) in texts.iter().zip(&labels).zip(&probabilities) {
        println!("{}", format_prediction(text, *label, proba));
    }
    Ok(())
}

/// `Label  [Positive 0.812 Negative 0.094 Neutral 0.094]  text`
pub(crate) fn format_prediction(
    text: &str,
    label: Sentiment,
    proba: &[f64; Sentiment::COUNT],
) -> String {
    let scores: Vec<String> = Sentiment::ALL
        .iter()
        .map(|l| format!("{} {:.3}", l.as_str(), proba[l.index()]))
        .collect();
    format!("{:<9}[{}]  {text}", label.as_str(), scores.join(" "))
}
