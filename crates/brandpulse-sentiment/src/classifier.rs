//! Multinomial logistic regression over sparse TF-IDF vectors.
//!
//! Per-class linear scores are turned into probabilities with a softmax. The
//! objective is the mean cross-entropy plus `‖W‖² / (2·C·n)`; intercepts are
//! not penalised. Fitting uses L-BFGS and always terminates at `max_iter`.

use brandpulse_core::Sentiment;
use ndarray::{s, Array1, Array2, ArrayView1};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::SentimentError;
use crate::features::SparseVector;
use crate::optim::Lbfgs;

const N_CLASSES: usize = Sentiment::COUNT;
const LBFGS_MEMORY: usize = 10;
/// Samples per gradient work unit. Fixed so partial sums combine identically
/// regardless of how many rayon workers run them.
const GRADIENT_CHUNK: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Inverse regularization strength; smaller values regularize more.
    pub regularization_c: f64,
    pub max_iter: usize,
    pub tolerance: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            regularization_c: 1.0,
            max_iter: 1000,
            tolerance: 1e-4,
        }
    }
}

/// Outcome of one optimisation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    pub iterations: usize,
    /// `false` when the iteration cap was hit first.
    pub converged: bool,
    pub final_loss: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftmaxClassifier {
    n_features: usize,
    /// `classes × features`, rows in [`Sentiment::ALL`] order.
    coefficients: Array2<f64>,
    intercepts: Array1<f64>,
}

impl SoftmaxClassifier {
    /// Fit a fresh model.
    ///
    /// Reaching `max_iter` is not an error: a warning is logged and the best
    /// coefficients found so far are kept, with `FitReport::converged` unset.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::LengthMismatch`] if `features` and `labels`
    /// differ in length, or [`SentimentError::Features`] if there is nothing
    /// to train on.
    pub fn fit(
        config: &ClassifierConfig,
        features: &[SparseVector],
        labels: &[Sentiment],
        n_features: usize,
    ) -> Result<(Self, FitReport), SentimentError> {
        if features.len() != labels.len() {
            return Err(SentimentError::LengthMismatch {
                texts: features.len(),
                labels: labels.len(),
            });
        }
        if features.is_empty() || n_features == 0 {
            return Err(SentimentError::Features(
                "classifier needs at least one sample and one feature".to_string(),
            ));
        }

        let objective = Objective {
            features,
            labels,
            n_features,
            penalty: penalty_scale(config.regularization_c, features.len()),
        };
        let solver = Lbfgs {
            memory: LBFGS_MEMORY,
            max_iter: config.max_iter,
            tolerance: config.tolerance,
        };
        let minimum = solver.minimize(
            |theta| objective.evaluate(theta),
            Array1::zeros(N_CLASSES * (n_features + 1)),
        );

        if minimum.converged {
            tracing::debug!(
                iterations = minimum.iterations,
                loss = minimum.value,
                "classifier converged"
            );
        } else {
            tracing::warn!(
                iterations = minimum.iterations,
                max_iter = config.max_iter,
                loss = minimum.value,
                "classifier stopped before converging; keeping best coefficients"
            );
        }

        let model = Self::from_parameters(&minimum.point, n_features);
        let report = FitReport {
            iterations: minimum.iterations,
            converged: minimum.converged,
            final_loss: minimum.value,
        };
        Ok((model, report))
    }

    /// Per-class linear scores `w_k·x + b_k`.
    #[must_use]
    pub fn decision_scores(&self, vector: &SparseVector) -> [f64; N_CLASSES] {
        let mut scores = [0.0; N_CLASSES];
        for ((score, row), intercept) in scores
            .iter_mut()
            .zip(self.coefficients.rows())
            .zip(&self.intercepts)
        {
            *score = intercept + vector.dot(row);
        }
        scores
    }

    #[must_use]
    pub fn predict_proba(&self, features: &[SparseVector]) -> Vec<[f64; N_CLASSES]> {
        features
            .iter()
            .map(|vector| softmax(self.decision_scores(vector)))
            .collect()
    }

    #[must_use]
    pub fn predict(&self, features: &[SparseVector]) -> Vec<Sentiment> {
        self.predict_proba(features)
            .iter()
            .map(most_probable)
            .collect()
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    #[must_use]
    pub fn coefficients(&self, label: Sentiment) -> ArrayView1<'_, f64> {
        self.coefficients.row(label.index())
    }

    #[must_use]
    pub fn intercept(&self, label: Sentiment) -> f64 {
        self.intercepts[label.index()]
    }

    /// Check that the stored matrices agree with `n_features`. Needed for
    /// models read back from disk, which may have been edited by hand.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::InvalidArtifact`] describing the first
    /// mismatch found.
    pub fn check_shape(&self) -> Result<(), SentimentError> {
        let expected = (N_CLASSES, self.n_features);
        if self.coefficients.dim() != expected {
            return Err(SentimentError::InvalidArtifact(format!(
                "coefficient matrix is {:?}, expected {expected:?}",
                self.coefficients.dim()
            )));
        }
        if self.intercepts.len() != N_CLASSES {
            return Err(SentimentError::InvalidArtifact(format!(
                "{} intercepts, expected {N_CLASSES}",
                self.intercepts.len()
            )));
        }
        Ok(())
    }

    /// Unpack the flat optimiser vector: `K·d` weights, then `K` intercepts.
    fn from_parameters(theta: &Array1<f64>, n_features: usize) -> Self {
        let weights_len = N_CLASSES * n_features;
        let coefficients =
            Array2::from_shape_fn((N_CLASSES, n_features), |(class, feature)| {
                theta[class * n_features + feature]
            });
        let intercepts = theta.slice(s![weights_len..]).to_owned();
        Self {
            n_features,
            coefficients,
            intercepts,
        }
    }
}

/// Label with the highest probability. Exact ties go to the label that comes
/// first in [`Sentiment::ALL`], i.e. `Positive > Negative > Neutral`.
#[must_use]
pub fn most_probable(probabilities: &[f64; N_CLASSES]) -> Sentiment {
    let mut best = 0;
    for (index, p) in probabilities.iter().enumerate().skip(1) {
        if *p > probabilities[best] {
            best = index;
        }
    }
    Sentiment::ALL[best]
}

#[must_use]
pub fn softmax(scores: [f64; N_CLASSES]) -> [f64; N_CLASSES] {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut out = scores.map(|s| (s - max).exp());
    let total: f64 = out.iter().sum();
    for p in &mut out {
        *p /= total;
    }
    out
}

#[allow(clippy::cast_precision_loss)]
fn penalty_scale(regularization_c: f64, n_samples: usize) -> f64 {
    1.0 / (regularization_c * n_samples as f64)
}

struct Objective<'a> {
    features: &'a [SparseVector],
    labels: &'a [Sentiment],
    n_features: usize,
    /// `1 / (C·n)`: multiplies `½‖W‖²` in the value and `W` in the gradient.
    penalty: f64,
}

impl Objective<'_> {
    #[allow(clippy::cast_precision_loss)]
    fn evaluate(&self, theta: &Array1<f64>) -> (f64, Array1<f64>) {
        let model = SoftmaxClassifier::from_parameters(theta, self.n_features);

        let partials: Vec<ChunkGradient> = self
            .features
            .par_chunks(GRADIENT_CHUNK)
            .zip(self.labels.par_chunks(GRADIENT_CHUNK))
            .map(|(xs, ys)| self.chunk_gradient(&model, xs, ys))
            .collect();

        let mut total = ChunkGradient::zeros(self.n_features);
        for partial in partials {
            total.loss += partial.loss;
            total.weights += &partial.weights;
            total.intercepts += &partial.intercepts;
        }

        let n = self.features.len() as f64;
        let mut loss = total.loss / n;
        let mut weights = total.weights / n;
        let intercepts = total.intercepts / n;

        loss += 0.5 * self.penalty * model.coefficients.mapv(|w| w * w).sum();
        weights.scaled_add(self.penalty, &model.coefficients);

        let gradient = weights.iter().chain(&intercepts).copied().collect();
        (loss, gradient)
    }

    /// Summed cross-entropy and gradient over one chunk, before averaging.
    fn chunk_gradient(
        &self,
        model: &SoftmaxClassifier,
        features: &[SparseVector],
        labels: &[Sentiment],
    ) -> ChunkGradient {
        let mut out = ChunkGradient::zeros(self.n_features);

        for (vector, label) in features.iter().zip(labels) {
            let probabilities = softmax(model.decision_scores(vector));
            let truth = label.index();
            out.loss -= probabilities[truth].max(f64::MIN_POSITIVE).ln();

            for (class, p) in probabilities.iter().enumerate() {
                let residual = p - if class == truth { 1.0 } else { 0.0 };
                let mut row = out.weights.row_mut(class);
                for &(feature, weight) in vector.entries() {
                    row[feature] += residual * weight;
                }
                out.intercepts[class] += residual;
            }
        }

        out
    }
}

struct ChunkGradient {
    loss: f64,
    weights: Array2<f64>,
    intercepts: Array1<f64>,
}

impl ChunkGradient {
    fn zeros(n_features: usize) -> Self {
        Self {
            loss: 0.0,
            weights: Array2::zeros((N_CLASSES, n_features)),
            intercepts: Array1::zeros(N_CLASSES),
        }
    }
}

#[cfg(test)]
#[path = "classifier_test.rs"]
mod tests;
