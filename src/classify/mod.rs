//! Trainable defect classifier.
//!
//! Complements the lexical detectors with a model learned from the
//! analysis history: token-frequency centroids per defect class, scored
//! by cosine similarity. Models persist as JSON so they stay diffable.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::warnings::BugKind;

/// Errors from training, prediction or model persistence
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("training set is empty")]
    EmptyTrainingSet,
    #[error("model has not been trained")]
    NotTrained,
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("model serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A labeled code sample used for training
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSample {
    /// Source text of the sample
    pub code: String,
    /// Defect classes present in the sample
    pub kinds: Vec<BugKind>,
}

/// A scored prediction for one defect class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted defect class
    pub kind: BugKind,
    /// Cosine similarity against the class centroid, in [0, 1]
    pub confidence: f64,
    /// Description of the prediction
    pub description: String,
}

/// Classifies code against centroids learned from labeled samples
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BugClassifier {
    /// Token document frequencies over the training set
    document_frequency: HashMap<String, usize>,
    /// Number of samples the model was trained on
    samples_seen: usize,
    /// One centroid per defect class seen in training
    centroids: Vec<Centroid>,
    /// Minimum confidence for a prediction to be reported
    threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Centroid {
    kind: BugKind,
    weights: HashMap<String, f64>,
    samples: usize,
}

impl Default for BugClassifier {
    fn default() -> Self {
        Self::new(0.25)
    }
}

impl BugClassifier {
    /// Create an untrained classifier with the given report threshold.
    pub fn new(threshold: f64) -> Self {
        Self {
            document_frequency: HashMap::new(),
            samples_seen: 0,
            centroids: Vec::new(),
            threshold,
        }
    }

    pub fn is_trained(&self) -> bool {
        self.samples_seen > 0
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Train the model on labeled samples, replacing any prior state.
    pub fn train(&mut self, samples: &[TrainingSample]) -> Result<(), ModelError> {
        if samples.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }

        self.document_frequency.clear();
        self.centroids.clear();
        self.samples_seen = samples.len();

        let token_sets: Vec<HashMap<String, usize>> =
            samples.iter().map(|s| term_counts(&s.code)).collect();

        for counts in &token_sets {
            for token in counts.keys() {
                *self.document_frequency.entry(token.clone()).or_insert(0) += 1;
            }
        }

        let mut sums: HashMap<BugKind, (HashMap<String, f64>, usize)> = HashMap::new();
        for (sample, counts) in samples.iter().zip(&token_sets) {
            let vector = self.weigh(counts);
            for kind in &sample.kinds {
                let entry = sums
                    .entry(kind.clone())
                    .or_insert_with(|| (HashMap::new(), 0));
                for (token, weight) in &vector {
                    *entry.0.entry(token.clone()).or_insert(0.0) += weight;
                }
                entry.1 += 1;
            }
        }

        for (kind, (mut weights, count)) in sums {
            for weight in weights.values_mut() {
                *weight /= count as f64;
            }
            normalize(&mut weights);
            self.centroids.push(Centroid {
                kind,
                weights,
                samples: count,
            });
        }

        debug!(
            "trained on {} samples, {} classes, {} tokens",
            self.samples_seen,
            self.centroids.len(),
            self.document_frequency.len()
        );
        Ok(())
    }

    /// Score a piece of code against every trained class.
    pub fn predict(&self, code: &str) -> Result<Vec<Prediction>, ModelError> {
        if !self.is_trained() {
            return Err(ModelError::NotTrained);
        }

        let counts = term_counts(code);
        let mut vector = self.weigh(&counts);
        normalize(&mut vector);

        let mut predictions = Vec::new();
        for centroid in &self.centroids {
            let score = dot(&vector, &centroid.weights).clamp(0.0, 1.0);
            if score >= self.threshold {
                predictions.push(Prediction {
                    kind: centroid.kind.clone(),
                    confidence: score,
                    description: format!(
                        "Code resembles known {} samples (confidence {:.2})",
                        centroid.kind.as_str(),
                        score
                    ),
                });
            }
        }

        predictions.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(predictions)
    }

    /// Save the model as JSON.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a model saved by `save_to_file`.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let json = fs::read_to_string(path)?;
        let model = serde_json::from_str(&json)?;
        Ok(model)
    }

    /// Weight raw term counts by inverse document frequency.
    fn weigh(&self, counts: &HashMap<String, usize>) -> HashMap<String, f64> {
        let n = self.samples_seen as f64;
        counts
            .iter()
            .map(|(token, &count)| {
                let df = self
                    .document_frequency
                    .get(token)
                    .copied()
                    .unwrap_or(0) as f64;
                let idf = (n / (1.0 + df)).ln() + 1.0;
                (token.clone(), count as f64 * idf)
            })
            .collect()
    }
}

/// Token counts for a piece of code.
///
/// Identifiers and keywords carry most of the signal; the dereference
/// and indexing operators are kept as tokens of their own because they
/// distinguish pointer-heavy defect classes.
fn term_counts(code: &str) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    let bytes = code.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if b == b'_' || b.is_ascii_alphabetic() {
            let start = i;
            while i < bytes.len() && (bytes[i] == b'_' || bytes[i].is_ascii_alphanumeric()) {
                i += 1;
            }
            let token = code[start..i].to_ascii_lowercase();
            *counts.entry(token).or_insert(0) += 1;
            continue;
        }
        if b == b'-' && i + 1 < bytes.len() && bytes[i + 1] == b'>' {
            *counts.entry("->".to_string()).or_insert(0) += 1;
            i += 2;
            continue;
        }
        if b == b'[' || b == b'*' {
            *counts.entry((b as char).to_string()).or_insert(0) += 1;
        }
        i += 1;
    }

    counts
}

fn normalize(vector: &mut HashMap<String, f64>) {
    let norm = vector.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for weight in vector.values_mut() {
            *weight /= norm;
        }
    }
}

fn dot(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
    a.iter()
        .map(|(token, wa)| wa * b.get(token).copied().unwrap_or(0.0))
        .sum()
}
