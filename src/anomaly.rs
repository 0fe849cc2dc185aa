use std::sync::{Arc, RwLock};

use sha2::{Digest, Sha256};

use crate::error::{OscarError, Result};
use crate::frame::{Frame, REQUIRED_COLUMNS};
use crate::isoforest::{ForestConfig, IsolationForest};
use crate::models::{NormalizedRow, OperationAnalysis};
use crate::normalizer::{self, DecimalStyle};

// ---------------------------------------------------------------------------
// Standard scaler
// ---------------------------------------------------------------------------

/// Per-column zero-mean / unit-variance standardization, fitted on one
/// batch and then frozen. Population variance; zero-variance columns
/// divide by 1.0 so constant features pass through centered.
#[derive(Debug)]
pub struct StandardScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(data: &[Vec<f64>]) -> StandardScaler {
        let dims = data.first().map(|r| r.len()).unwrap_or(0);
        let n = data.len() as f64;
        let mut means = vec![0.0; dims];
        for row in data {
            for (j, v) in row.iter().enumerate() {
                means[j] += v;
            }
        }
        for m in &mut means {
            *m /= n;
        }
        let mut stds = vec![0.0; dims];
        for row in data {
            for (j, v) in row.iter().enumerate() {
                stds[j] += (v - means[j]).powi(2);
            }
        }
        for s in &mut stds {
            *s = (*s / n).sqrt();
            if *s == 0.0 {
                *s = 1.0;
            }
        }
        StandardScaler { means, stds }
    }

    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .enumerate()
            .map(|(j, v)| (v - self.means[j]) / self.stds[j])
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Scaler + forest fitted together on one batch. Immutable once built;
/// refits build a whole new snapshot.
#[derive(Debug)]
pub struct FittedModel {
    scaler: StandardScaler,
    forest: IsolationForest,
    pub trained_rows: usize,
    /// SHA-256 over the training feature matrix. Provenance only.
    pub fingerprint: String,
}

/// Unfitted until the first `fit`; refits swap the snapshot wholesale.
/// Readers grab an `Arc` and score against it, so an `analyze` in
/// flight during a refit completes against the snapshot it started
/// with.
pub struct AnomalyEngine {
    state: RwLock<Option<Arc<FittedModel>>>,
    config: ForestConfig,
}

impl Default for AnomalyEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AnomalyEngine {
    pub fn new() -> AnomalyEngine {
        Self::with_config(ForestConfig::default())
    }

    pub fn with_config(config: ForestConfig) -> AnomalyEngine {
        AnomalyEngine {
            state: RwLock::new(None),
            config,
        }
    }

    pub fn fitted(&self) -> Option<Arc<FittedModel>> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted().is_some()
    }

    /// Fit on a batch: strict validation, grouped-comma normalization,
    /// standardize (Withdrawal, Deposit, Balance), grow the forest.
    /// Independent of any prior fit.
    pub fn fit(&self, frame: &Frame) -> Result<Arc<FittedModel>> {
        frame.require_columns(REQUIRED_COLUMNS)?;
        if frame.is_empty() {
            return Err(OscarError::Other(
                "Cannot fit on an empty batch".to_string(),
            ));
        }
        let rows = normalizer::normalize(frame, DecimalStyle::GroupedComma);
        let features = feature_matrix(&rows);
        let scaler = StandardScaler::fit(&features);
        let scaled: Vec<Vec<f64>> = features.iter().map(|r| scaler.transform(r)).collect();
        let forest = IsolationForest::fit(&scaled, &self.config);
        let fitted = Arc::new(FittedModel {
            scaler,
            forest,
            trained_rows: rows.len(),
            fingerprint: fingerprint(&features),
        });
        *self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Arc::clone(&fitted));
        Ok(fitted)
    }

    /// Score a batch against the fitted snapshot. Output preserves
    /// input order and length; scores are relative, with higher = more
    /// anomalous.
    pub fn analyze(&self, frame: &Frame) -> Result<Vec<OperationAnalysis>> {
        let model = self.fitted().ok_or(OscarError::ModelNotReady)?;
        frame.require_columns(REQUIRED_COLUMNS)?;
        let rows = normalizer::normalize(frame, DecimalStyle::GroupedComma);
        Ok(rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                let scaled = model
                    .scaler
                    .transform(&[row.withdrawal, row.deposit, row.balance]);
                let score = model.forest.score(&scaled);
                OperationAnalysis {
                    index,
                    date: row.date.clone(),
                    category: row.category.clone(),
                    ref_no: row.ref_no.clone(),
                    withdrawal: row.withdrawal,
                    deposit: row.deposit,
                    balance: row.balance,
                    anomaly_score: score,
                    is_anomaly: model.forest.is_outlier(score),
                }
            })
            .collect())
    }
}

fn feature_matrix(rows: &[NormalizedRow]) -> Vec<Vec<f64>> {
    rows.iter()
        .map(|r| vec![r.withdrawal, r.deposit, r.balance])
        .collect()
}

fn fingerprint(features: &[Vec<f64>]) -> String {
    let mut hasher = Sha256::new();
    for row in features {
        for v in row {
            hasher.update(v.to_le_bytes());
        }
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement_csv(rows: &[(&str, &str, &str, &str)]) -> Frame {
        let mut text =
            String::from("Date,Category,RefNo,Date.1,Withdrawal,Deposit,Balance\n");
        for (i, (w, d, b, cat)) in rows.iter().enumerate() {
            text.push_str(&format!(
                "0{}/01/2024,{cat},REF{i},0{}/01/2024,{w},{d},{b}\n",
                i % 9 + 1,
                i % 9 + 1,
            ));
        }
        Frame::from_csv_str(&text).unwrap()
    }

    fn routine_batch() -> Frame {
        let mut rows: Vec<(&str, &str, &str, &str)> = Vec::new();
        for _ in 0..20 {
            rows.push(("100", "0", "1000", "Groceries"));
        }
        rows.push(("\"90,000\"", "0", "\"99,000\"", ""));
        statement_csv(&rows)
    }

    #[test]
    fn test_analyze_before_fit_fails() {
        let engine = AnomalyEngine::new();
        let err = engine.analyze(&routine_batch()).unwrap_err();
        assert!(matches!(err, OscarError::ModelNotReady));
    }

    #[test]
    fn test_fit_then_analyze_same_batch() {
        let engine = AnomalyEngine::new();
        let batch = routine_batch();
        engine.fit(&batch).unwrap();
        let results = engine.analyze(&batch).unwrap();
        assert_eq!(results.len(), batch.len());
        for (i, r) in results.iter().enumerate() {
            assert_eq!(r.index, i);
            assert!(r.anomaly_score.is_finite());
        }
        // The wildly larger operation separates from the routine rows.
        assert!(results[20].is_anomaly);
        assert!(results[20].anomaly_score > results[0].anomaly_score);
    }

    #[test]
    fn test_repeated_analyze_is_stable() {
        let engine = AnomalyEngine::new();
        let batch = routine_batch();
        engine.fit(&batch).unwrap();
        let a = engine.analyze(&batch).unwrap();
        let b = engine.analyze(&batch).unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.anomaly_score, y.anomaly_score);
            assert_eq!(x.is_anomaly, y.is_anomaly);
        }
    }

    #[test]
    fn test_single_row_batch_does_not_crash() {
        let engine = AnomalyEngine::new();
        let batch = statement_csv(&[("\"1,000\"", "0", "500", "")]);
        engine.fit(&batch).unwrap();
        let results = engine.analyze(&batch).unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].anomaly_score.is_finite());
    }

    #[test]
    fn test_refit_replaces_snapshot() {
        let engine = AnomalyEngine::new();
        let first = engine.fit(&routine_batch()).unwrap();
        let second = engine
            .fit(&statement_csv(&[("5", "5", "5", ""), ("6", "6", "6", "")]))
            .unwrap();
        assert_ne!(first.fingerprint, second.fingerprint);
        assert_eq!(engine.fitted().unwrap().fingerprint, second.fingerprint);
        // The old snapshot is still intact for any reader that grabbed it.
        assert_eq!(first.trained_rows, 21);
    }

    #[test]
    fn test_fit_rejects_missing_columns() {
        let engine = AnomalyEngine::new();
        let frame = Frame::from_csv_str("Category,RefNo\nx,R1\n").unwrap();
        let err = engine.fit(&frame).unwrap_err();
        assert!(matches!(err, OscarError::MissingColumns(_)));
    }

    #[test]
    fn test_fit_rejects_empty_batch() {
        let engine = AnomalyEngine::new();
        let frame =
            Frame::from_csv_str("Date,Category,RefNo,Date.1,Withdrawal,Deposit,Balance\n")
                .unwrap();
        assert!(engine.fit(&frame).is_err());
    }

    #[test]
    fn test_scaler_zero_variance_column() {
        let scaler = StandardScaler::fit(&[vec![5.0, 1.0], vec![5.0, 3.0]]);
        let t = scaler.transform(&[5.0, 2.0]);
        assert_eq!(t[0], 0.0);
        assert_eq!(t[1], 0.0);
    }

    #[test]
    fn test_scaler_standardizes() {
        let scaler = StandardScaler::fit(&[vec![0.0], vec![10.0]]);
        let t = scaler.transform(&[10.0]);
        // mean 5, population std 5
        assert!((t[0] - 1.0).abs() < 1e-12);
    }
}
