//! Held-out evaluation metrics: accuracy, confusion matrix and per-class scores.

use std::fmt;

use brandpulse_core::Sentiment;
use serde::{Deserialize, Serialize};

use crate::error::SentimentError;

const N: usize = Sentiment::COUNT;

/// Counts indexed `[true label][predicted label]` in [`Sentiment::ALL`] order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    counts: [[usize; N]; N],
}

impl ConfusionMatrix {
    /// # Errors
    ///
    /// Returns [`SentimentError::LengthMismatch`] if the slices differ in length.
    pub fn from_labels(
        truth: &[Sentiment],
        predicted: &[Sentiment],
    ) -> Result<Self, SentimentError> {
        if truth.len() != predicted.len() {
            return Err(SentimentError::LengthMismatch {
                texts: predicted.len(),
                labels: truth.len(),
            });
        }
        let mut counts = [[0; N]; N];
        for (t, p) in truth.iter().zip(predicted) {
            counts[t.index()][p.index()] += 1;
        }
        Ok(Self { counts })
    }

    #[must_use]
    pub fn get(&self, truth: Sentiment, predicted: Sentiment) -> usize {
        self.counts[truth.index()][predicted.index()]
    }

    #[must_use]
    pub fn row(&self, truth: Sentiment) -> [usize; N] {
        self.counts[truth.index()]
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    #[must_use]
    pub fn correct(&self) -> usize {
        (0..N).map(|i| self.counts[i][i]).sum()
    }

    /// Fraction of exact matches; `0.0` for an empty matrix.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        ratio(self.correct(), self.total())
    }

    /// Number of true examples of `label`.
    #[must_use]
    pub fn support(&self, label: Sentiment) -> usize {
        self.counts[label.index()].iter().sum()
    }

    fn predicted_count(&self, label: Sentiment) -> usize {
        self.counts.iter().map(|row| row[label.index()]).sum()
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>10}", "")?;
        for label in Sentiment::ALL {
            write!(f, " {:>9}", label.as_str())?;
        }
        writeln!(f)?;
        for label in Sentiment::ALL {
            write!(f, "{:>10}", label.as_str())?;
            for count in self.row(label) {
                write!(f, " {count:>9}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class precision/recall/F1 plus macro and support-weighted averages.
///
/// Undefined ratios (no predictions or no support for a class) are `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub per_class: [ClassMetrics; N],
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    #[must_use]
    pub fn from_confusion(matrix: &ConfusionMatrix) -> Self {
        let per_class = Sentiment::ALL.map(|label| {
            let tp = matrix.get(label, label);
            let precision = ratio(tp, matrix.predicted_count(label));
            let recall = ratio(tp, matrix.support(label));
            ClassMetrics {
                precision,
                recall,
                f1: harmonic_mean(precision, recall),
                support: matrix.support(label),
            }
        });

        let total = matrix.total();
        #[allow(clippy::cast_precision_loss)]
        let average = |weight: &dyn Fn(&ClassMetrics) -> f64, denominator: f64| ClassMetrics {
            precision: per_class.iter().map(|m| m.precision * weight(m)).sum::<f64>() / denominator,
            recall: per_class.iter().map(|m| m.recall * weight(m)).sum::<f64>() / denominator,
            f1: per_class.iter().map(|m| m.f1 * weight(m)).sum::<f64>() / denominator,
            support: total,
        };

        #[allow(clippy::cast_precision_loss)]
        let macro_avg = average(&|_| 1.0, N as f64);
        #[allow(clippy::cast_precision_loss)]
        let weighted_avg = if total == 0 {
            ClassMetrics {
                precision: 0.0,
                recall: 0.0,
                f1: 0.0,
                support: 0,
            }
        } else {
            average(&|m| m.support as f64, total as f64)
        };

        Self {
            per_class,
            accuracy: matrix.accuracy(),
            macro_avg,
            weighted_avg,
        }
    }

    #[must_use]
    pub fn class(&self, label: Sentiment) -> &ClassMetrics {
        &self.per_class[label.index()]
    }
}

impl fmt::Display for ClassificationReport {
    /// Fixed-width table with three decimals.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const WIDTH: usize = 12;
        writeln!(
            f,
            "{:>WIDTH$}  {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for label in Sentiment::ALL {
            write_row(f, label.as_str(), self.class(label))?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>WIDTH$}  {:>9} {:>9} {:>9.3} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        write_row(f, "macro avg", &self.macro_avg)?;
        write_row(f, "weighted avg", &self.weighted_avg)
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, name: &str, m: &ClassMetrics) -> fmt::Result {
    writeln!(
        f,
        "{:>12}  {:>9.3} {:>9.3} {:>9.3} {:>9}",
        name, m.precision, m.recall, m.f1, m.support
    )
}

#[allow(clippy::cast_precision_loss)]
fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn harmonic_mean(precision: f64, recall: f64) -> f64 {
    if precision + recall <= 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}
