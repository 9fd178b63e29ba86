//! Per-brand sentiment summary built from ground-truth labels.

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;

use brandpulse_core::{Post, Sentiment};
use serde::{Deserialize, Serialize};

use crate::error::SentimentError;
use crate::pipeline::io_error;

/// Allowed drift of the rounded percentages from 1.0. Three values rounded to
/// three decimals can be off by at most one unit in the last place.
const PCT_SUM_TOLERANCE: f64 = 0.001 + 1e-9;

/// One summary row. Field names on disk are the reporting contract:
/// `brand,Positive,Negative,Neutral,total_posts,positive_pct,negative_pct,neutral_pct`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandSentimentRow {
    pub brand: String,
    #[serde(rename = "Positive")]
    pub positive: usize,
    #[serde(rename = "Negative")]
    pub negative: usize,
    #[serde(rename = "Neutral")]
    pub neutral: usize,
    pub total_posts: usize,
    pub positive_pct: f64,
    pub negative_pct: f64,
    pub neutral_pct: f64,
}

impl BrandSentimentRow {
    /// Build a row from label counts in [`Sentiment::ALL`] order.
    ///
    /// Percentages are `round(count / total, 3)` and `0.0` when `total` is 0.
    #[must_use]
    pub fn from_counts(brand: &str, counts: [usize; Sentiment::COUNT]) -> Self {
        let total: usize = counts.iter().sum();
        let pct = |label: Sentiment| percentage(counts[label.index()], total);
        Self {
            brand: brand.to_string(),
            positive: counts[Sentiment::Positive.index()],
            negative: counts[Sentiment::Negative.index()],
            neutral: counts[Sentiment::Neutral.index()],
            total_posts: total,
            positive_pct: pct(Sentiment::Positive),
            negative_pct: pct(Sentiment::Negative),
            neutral_pct: pct(Sentiment::Neutral),
        }
    }

    #[must_use]
    pub fn count(&self, label: Sentiment) -> usize {
        match label {
            Sentiment::Positive => self.positive,
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
        }
    }

    #[must_use]
    pub fn pct(&self, label: Sentiment) -> f64 {
        match label {
            Sentiment::Positive => self.positive_pct,
            Sentiment::Negative => self.negative_pct,
            Sentiment::Neutral => self.neutral_pct,
        }
    }

    /// Check the row invariants.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Aggregation`] if the counts do not sum to
    /// `total_posts`, or a non-empty row's percentages do not sum to 1.
    pub fn validate(&self) -> Result<(), SentimentError> {
        let sum = self.positive + self.negative + self.neutral;
        if sum != self.total_posts {
            return Err(self.violation(format!(
                "label counts sum to {sum} but total_posts is {}",
                self.total_posts
            )));
        }

        let pct_sum = self.positive_pct + self.negative_pct + self.neutral_pct;
        if self.total_posts == 0 {
            if pct_sum.abs() > f64::EPSILON {
                return Err(self.violation(format!(
                    "brand has no posts but percentages sum to {pct_sum}"
                )));
            }
        } else if (pct_sum - 1.0).abs() > PCT_SUM_TOLERANCE {
            return Err(self.violation(format!("percentages sum to {pct_sum}, expected 1.0")));
        }
        Ok(())
    }

    fn violation(&self, reason: String) -> SentimentError {
        SentimentError::Aggregation {
            brand: self.brand.clone(),
            reason,
        }
    }
}

/// Summary table, one row per brand, ordered by brand name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrandSentimentSummary {
    rows: Vec<BrandSentimentRow>,
}

/// Count ground-truth labels per brand and derive percentages.
///
/// Model predictions play no part. Every brand in `posts` gets a row and every
/// label gets a column, zero-filled where a brand has no posts of that label.
///
/// # Errors
///
/// Returns [`SentimentError::Aggregation`] if any row breaks its invariants.
pub fn aggregate(posts: &[Post]) -> Result<BrandSentimentSummary, SentimentError> {
    let mut counts: BTreeMap<&str, [usize; Sentiment::COUNT]> = BTreeMap::new();
    for post in posts {
        counts.entry(post.brand.as_str()).or_default()[post.sentiment.index()] += 1;
    }

    let rows = counts
        .into_iter()
        .map(|(brand, counts)| BrandSentimentRow::from_counts(brand, counts))
        .collect();
    let summary = BrandSentimentSummary::from_rows(rows)?;

    tracing::info!(
        posts = posts.len(),
        brands = summary.rows.len(),
        "brand sentiment aggregated"
    );
    Ok(summary)
}

impl BrandSentimentSummary {
    /// Validate and sort rows by brand.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Aggregation`] for the first invalid row.
    pub fn from_rows(mut rows: Vec<BrandSentimentRow>) -> Result<Self, SentimentError> {
        for row in &rows {
            row.validate()?;
        }
        rows.sort_by(|a, b| a.brand.cmp(&b.brand));
        Ok(Self { rows })
    }

    #[must_use]
    pub fn rows(&self) -> &[BrandSentimentRow] {
        &self.rows
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn get(&self, brand: &str) -> Option<&BrandSentimentRow> {
        self.rows.iter().find(|row| row.brand == brand)
    }

    /// Highest `positive_pct`; ties go to the alphabetically first brand.
    #[must_use]
    pub fn best_brand(&self) -> Option<&BrandSentimentRow> {
        self.max_by_pct(Sentiment::Positive)
    }

    /// Highest `negative_pct`; ties go to the alphabetically first brand.
    #[must_use]
    pub fn most_negative_brand(&self) -> Option<&BrandSentimentRow> {
        self.max_by_pct(Sentiment::Negative)
    }

    fn max_by_pct(&self, label: Sentiment) -> Option<&BrandSentimentRow> {
        self.rows.iter().min_by(|a, b| {
            b.pct(label)
                .total_cmp(&a.pct(label))
                .then_with(|| a.brand.cmp(&b.brand))
        })
    }

    /// # Errors
    ///
    /// Returns [`SentimentError::Csv`] if writing fails.
    pub fn write_csv<W: Write>(&self, sink: W) -> Result<(), SentimentError> {
        let mut writer = csv::Writer::from_writer(sink);
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// Read a summary written by [`write_csv`](Self::write_csv), re-checking
    /// every row.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Csv`] for malformed input or
    /// [`SentimentError::Aggregation`] for rows that break the invariants.
    pub fn read_csv<R: Read>(source: R) -> Result<Self, SentimentError> {
        let mut reader = csv::Reader::from_reader(source);
        let rows = reader
            .deserialize::<BrandSentimentRow>()
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_rows(rows)
    }

    /// # Errors
    ///
    /// Returns [`SentimentError::Io`] or [`SentimentError::Csv`].
    pub fn save(&self, path: &Path) -> Result<(), SentimentError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        let file = std::fs::File::create(path).map_err(|e| io_error(path, e))?;
        self.write_csv(file)?;
        tracing::info!(path = %path.display(), "brand sentiment summary saved");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`SentimentError::Io`], [`SentimentError::Csv`] or
    /// [`SentimentError::Aggregation`].
    pub fn load(path: &Path) -> Result<Self, SentimentError> {
        let file = std::fs::File::open(path).map_err(|e| io_error(path, e))?;
        Self::read_csv(file)
    }
}

#[allow(clippy::cast_precision_loss)]
fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round3(count as f64 / total as f64)
}

/// Three decimals, exact halves to even.
fn round3(value: f64) -> f64 {
    (value * 1000.0).round_ties_even() / 1000.0
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod tests;
