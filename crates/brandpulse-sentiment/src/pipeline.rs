//! The deployable text-to-sentiment artifact: vectorizer plus classifier.

use std::path::Path;

use brandpulse_core::Sentiment;
use serde::{Deserialize, Serialize};

use crate::classifier::{ClassifierConfig, FitReport, SoftmaxClassifier};
use crate::error::SentimentError;
use crate::features::{FeatureConfig, TfidfVectorizer};

/// Hyper-parameters for both pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub features: FeatureConfig,
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FittedPipeline {
    vectorizer: TfidfVectorizer,
    classifier: SoftmaxClassifier,
    report: FitReport,
}

impl FittedPipeline {
    fn check_consistency(&self) -> Result<(), SentimentError> {
        let vocabulary = self.vectorizer.vocabulary().len();
        if self.vectorizer.idf().len() != vocabulary {
            return Err(SentimentError::InvalidArtifact(format!(
                "{} idf weights for a vocabulary of {vocabulary} terms",
                self.vectorizer.idf().len()
            )));
        }
        if let Some((term, index)) = self
            .vectorizer
            .vocabulary()
            .iter()
            .find(|(_, &index)| index >= vocabulary)
        {
            return Err(SentimentError::InvalidArtifact(format!(
                "term '{term}' has column {index}, past the {vocabulary}-term vocabulary"
            )));
        }
        if self.classifier.n_features() != vocabulary {
            return Err(SentimentError::InvalidArtifact(format!(
                "classifier expects {} features, vocabulary has {vocabulary}",
                self.classifier.n_features()
            )));
        }
        self.classifier.check_shape()
    }
}

/// TF-IDF features feeding a softmax classifier, fitted as one unit.
///
/// Starts empty. Each [`fit`](Self::fit) discards whatever state the pipeline
/// held and learns a new vocabulary and new coefficients from scratch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentPipeline {
    config: PipelineConfig,
    fitted: Option<FittedPipeline>,
}

impl SentimentPipeline {
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            fitted: None,
        }
    }

    /// Fit both stages on `texts`; the vectorizer sees nothing else.
    ///
    /// On error the pipeline is left unfitted.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::LengthMismatch`] or a feature-extraction error.
    pub fn fit<S: AsRef<str>>(
        &mut self,
        texts: &[S],
        labels: &[Sentiment],
    ) -> Result<FitReport, SentimentError> {
        self.fitted = None;
        if texts.len() != labels.len() {
            return Err(SentimentError::LengthMismatch {
                texts: texts.len(),
                labels: labels.len(),
            });
        }

        let (vectorizer, matrix) = TfidfVectorizer::fit_transform(self.config.features, texts)?;
        let (classifier, report) = SoftmaxClassifier::fit(
            &self.config.classifier,
            &matrix,
            labels,
            vectorizer.n_features(),
        )?;

        tracing::info!(
            documents = texts.len(),
            vocabulary = vectorizer.n_features(),
            iterations = report.iterations,
            converged = report.converged,
            "sentiment pipeline fitted"
        );

        self.fitted = Some(FittedPipeline {
            vectorizer,
            classifier,
            report,
        });
        Ok(report)
    }

    /// # Errors
    ///
    /// Returns [`SentimentError::NotFitted`] before the first successful fit.
    pub fn predict<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Sentiment>, SentimentError> {
        let fitted = self.fitted()?;
        Ok(fitted.classifier.predict(&fitted.vectorizer.transform(texts)))
    }

    /// Class probabilities in [`Sentiment::ALL`] order.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::NotFitted`] before the first successful fit.
    pub fn predict_proba<S: AsRef<str>>(
        &self,
        texts: &[S],
    ) -> Result<Vec<[f64; Sentiment::COUNT]>, SentimentError> {
        let fitted = self.fitted()?;
        Ok(fitted
            .classifier
            .predict_proba(&fitted.vectorizer.transform(texts)))
    }

    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[must_use]
    pub fn vectorizer(&self) -> Option<&TfidfVectorizer> {
        self.fitted.as_ref().map(|f| &f.vectorizer)
    }

    #[must_use]
    pub fn classifier(&self) -> Option<&SoftmaxClassifier> {
        self.fitted.as_ref().map(|f| &f.classifier)
    }

    #[must_use]
    pub fn fit_report(&self) -> Option<&FitReport> {
        self.fitted.as_ref().map(|f| &f.report)
    }

    /// Write the pipeline as JSON, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Io`] or [`SentimentError::Artifact`].
    pub fn save(&self, path: &Path) -> Result<(), SentimentError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        let file = std::fs::File::create(path).map_err(|e| io_error(path, e))?;
        serde_json::to_writer(std::io::BufWriter::new(file), self)?;
        tracing::info!(path = %path.display(), "sentiment pipeline saved");
        Ok(())
    }

    /// Read a pipeline written by [`save`](Self::save).
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Io`], [`SentimentError::Artifact`] for
    /// malformed JSON, or [`SentimentError::InvalidArtifact`] when the
    /// vectorizer and classifier disagree on the feature space.
    pub fn load(path: &Path) -> Result<Self, SentimentError> {
        let file = std::fs::File::open(path).map_err(|e| io_error(path, e))?;
        let pipeline: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        if let Some(fitted) = &pipeline.fitted {
            fitted.check_consistency()?;
        }
        tracing::debug!(
            path = %path.display(),
            fitted = pipeline.is_fitted(),
            "sentiment pipeline loaded"
        );
        Ok(pipeline)
    }

    fn fitted(&self) -> Result<&FittedPipeline, SentimentError> {
        self.fitted.as_ref().ok_or(SentimentError::NotFitted)
    }
}

pub(crate) fn io_error(path: &Path, source: std::io::Error) -> SentimentError {
    SentimentError::Io {
        path: path.display().to_string(),
        source,
    }
}
