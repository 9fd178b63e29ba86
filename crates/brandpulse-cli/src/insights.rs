//! `insights`: summary table plus best and most negative brands.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Context;
use brandpulse_core::AppConfig;
use brandpulse_sentiment::{BrandSentimentRow, BrandSentimentSummary};

pub(crate) fn run_insights(config: &AppConfig, summary: Option<PathBuf>) -> anyhow::Result<()> {
    let path = summary.unwrap_or_else(|| config.summary_path());
    let summary = BrandSentimentSummary::load(&path)
        .with_context(|| format!("failed to load summary from {}", path.display()))?;

    if summary.is_empty() {
        println!("summary at {} has no brands", path.display());
        return Ok(());
    }
    print!("{}", format_insights(&summary));
    Ok(())
}

pub(crate) fn format_insights(summary: &BrandSentimentSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:>8} {:>8} {:>8} {:>6} {:>8} {:>8} {:>8}",
        "brand", "Positive", "Negative", "Neutral", "total", "pos_pct", "neg_pct", "neu_pct"
    );
    for row in summary.rows() {
        let _ = writeln!(
            out,
            "{:<12} {:>8} {:>8} {:>8} {:>6} {:>8.3} {:>8.3} {:>8.3}",
            row.brand,
            row.positive,
            row.negative,
            row.neutral,
            row.total_posts,
            row.positive_pct,
            row.negative_pct,
            row.neutral_pct
        );
    }

    if let Some(best) = summary.best_brand() {
        let _ = writeln!(out, "\nBest overall sentiment: {}", describe(best));
    }
    if let Some(worst) = summary.most_negative_brand() {
        let _ = writeln!(out, "Most negative sentiment: {}", describe(worst));
    }
    out
}

fn describe(row: &BrandSentimentRow) -> String {
    format!(
        "{} ({:.1}% positive, {:.1}% negative)",
        row.brand,
        row.positive_pct * 100.0,
        row.negative_pct * 100.0
    )
}
