use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{OscarError, Result};
use crate::models::NormalizedRow;

/// Numeric feature order expected by every artifact:
/// Withdrawal, Deposit, Balance, Amount, Month, Day.
pub const NUMERIC_FEATURES: usize = 6;

/// Narrow seam to the frozen classifier. One operation, so tests can
/// substitute a stub and alternative backends can slot in.
pub trait CategoryPredictor: Send + Sync {
    fn predict(&self, rows: &[NormalizedRow]) -> Result<Vec<String>>;
}

#[derive(Debug, Deserialize)]
pub struct Vectorizer {
    ngram_min: usize,
    ngram_max: usize,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

#[derive(Debug, Deserialize)]
pub struct NumericScaler {
    mean: Vec<f64>,
    std: Vec<f64>,
}

/// The inference half of the offline training pipeline: word-boundary
/// char n-gram tf-idf over lowercased RefText, standardized numerics,
/// linear decision layer. Trained elsewhere, loaded read-only, never
/// fitted here.
#[derive(Debug, Deserialize)]
pub struct FrozenModel {
    classes: Vec<String>,
    vectorizer: Vectorizer,
    scaler: NumericScaler,
    weights: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

impl FrozenModel {
    pub fn load(path: &Path) -> Result<FrozenModel> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| OscarError::ModelUnavailable(format!("{}: {e}", path.display())))?;
        let model: FrozenModel = serde_json::from_str(&text)
            .map_err(|e| OscarError::ModelUnavailable(e.to_string()))?;
        model.validate()?;
        Ok(model)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vectorizer.vocabulary.len()
    }

    fn validate(&self) -> Result<()> {
        let unavailable = |msg: String| Err(OscarError::ModelUnavailable(msg));
        if self.classes.is_empty() {
            return unavailable("artifact has no classes".to_string());
        }
        if self.weights.len() != self.classes.len() || self.intercepts.len() != self.classes.len()
        {
            return unavailable(format!(
                "expected {} weight rows and intercepts, got {} and {}",
                self.classes.len(),
                self.weights.len(),
                self.intercepts.len()
            ));
        }
        if self.vectorizer.idf.len() != self.vectorizer.vocabulary.len() {
            return unavailable(format!(
                "idf length {} does not match vocabulary size {}",
                self.vectorizer.idf.len(),
                self.vectorizer.vocabulary.len()
            ));
        }
        if self.vectorizer.ngram_min == 0 || self.vectorizer.ngram_min > self.vectorizer.ngram_max
        {
            return unavailable("bad n-gram range".to_string());
        }
        let width = self.vectorizer.vocabulary.len() + NUMERIC_FEATURES;
        if self.weights.iter().any(|row| row.len() != width) {
            return unavailable(format!("weight rows must have {width} columns"));
        }
        if self.scaler.mean.len() != NUMERIC_FEATURES || self.scaler.std.len() != NUMERIC_FEATURES
        {
            return unavailable("scaler must cover the 6 numeric features".to_string());
        }
        if let Some(&i) = self.vectorizer.vocabulary.values().max() {
            if i >= self.vectorizer.idf.len() {
                return unavailable(format!("vocabulary index {i} out of idf range"));
            }
        }
        Ok(())
    }

    /// Sparse L2-normalized tf-idf of the row's RefText.
    fn text_features(&self, ref_text: &str) -> Vec<(usize, f64)> {
        let mut tf: HashMap<usize, f64> = HashMap::new();
        for gram in char_wb_ngrams(
            &ref_text.to_lowercase(),
            self.vectorizer.ngram_min,
            self.vectorizer.ngram_max,
        ) {
            if let Some(&i) = self.vectorizer.vocabulary.get(&gram) {
                *tf.entry(i).or_insert(0.0) += 1.0;
            }
        }
        let mut weighted: Vec<(usize, f64)> = tf
            .into_iter()
            .map(|(i, count)| (i, count * self.vectorizer.idf[i]))
            .collect();
        let norm: f64 = weighted.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, v) in &mut weighted {
                *v /= norm;
            }
        }
        weighted
    }

    fn numeric_features(&self, row: &NormalizedRow) -> [f64; NUMERIC_FEATURES] {
        let raw = [
            row.withdrawal,
            row.deposit,
            row.balance,
            row.amount,
            row.month as f64,
            row.day as f64,
        ];
        let mut out = [0.0; NUMERIC_FEATURES];
        for (j, v) in raw.iter().enumerate() {
            let std = if self.scaler.std[j] > 0.0 {
                self.scaler.std[j]
            } else {
                1.0
            };
            out[j] = (v - self.scaler.mean[j]) / std;
        }
        out
    }
}

impl CategoryPredictor for FrozenModel {
    fn predict(&self, rows: &[NormalizedRow]) -> Result<Vec<String>> {
        let vocab_len = self.vectorizer.vocabulary.len();
        Ok(rows
            .iter()
            .map(|row| {
                let text = self.text_features(&row.ref_text);
                let numerics = self.numeric_features(row);
                let mut best = 0;
                let mut best_score = f64::NEG_INFINITY;
                for (c, (weights, intercept)) in
                    self.weights.iter().zip(&self.intercepts).enumerate()
                {
                    let mut score = *intercept;
                    for &(i, v) in &text {
                        score += weights[i] * v;
                    }
                    for (j, v) in numerics.iter().enumerate() {
                        score += weights[vocab_len + j] * v;
                    }
                    if score > best_score {
                        best_score = score;
                        best = c;
                    }
                }
                self.classes[best].clone()
            })
            .collect())
    }
}

/// Word-boundary char n-grams: each whitespace token is padded with a
/// single space on both sides; tokens shorter than n contribute their
/// padded form once.
fn char_wb_ngrams(text: &str, ngram_min: usize, ngram_max: usize) -> Vec<String> {
    let mut grams = Vec::new();
    for token in text.split_whitespace() {
        let padded: Vec<char> = std::iter::once(' ')
            .chain(token.chars())
            .chain(std::iter::once(' '))
            .collect();
        let len = padded.len();
        for n in ngram_min..=ngram_max {
            let mut offset = 0;
            grams.push(padded[0..n.min(len)].iter().collect());
            while offset + n < len {
                offset += 1;
                grams.push(padded[offset..offset + n].iter().collect());
            }
            if offset == 0 {
                break;
            }
        }
    }
    grams
}
