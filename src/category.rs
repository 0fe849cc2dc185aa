use crate::artifact::CategoryPredictor;
use crate::error::{OscarError, Result};
use crate::frame::Frame;
use crate::models::CategorizedRow;
use crate::normalizer::{self, DecimalStyle};

/// Fills blank categories with the frozen classifier's predictions.
/// Holds no mutable state: the model is read-only after construction,
/// so the engine needs no synchronization.
pub struct CategoryEngine {
    model: Option<Box<dyn CategoryPredictor>>,
}

impl CategoryEngine {
    pub fn new(model: Option<Box<dyn CategoryPredictor>>) -> CategoryEngine {
        CategoryEngine { model }
    }

    /// Engine with no usable model. Inference degrades: blank
    /// categories stay blank instead of failing the batch.
    pub fn without_model() -> CategoryEngine {
        CategoryEngine { model: None }
    }

    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    /// Infer categories for a batch. Tolerant of missing columns (the
    /// normalizer defaults them), decimal-comma numeric convention.
    /// Rows with a non-blank category pass through untouched; the
    /// classifier's label lands only where the original is blank or
    /// whitespace.
    pub fn infer(&self, frame: &Frame) -> Result<Vec<CategorizedRow>> {
        let rows = normalizer::normalize(frame, DecimalStyle::DecimalComma);

        // The whole batch is scored in one call; predictions are then
        // applied selectively.
        let predictions = match &self.model {
            Some(model) if !rows.is_empty() => {
                let labels = model.predict(&rows).map_err(|e| match e {
                    OscarError::Prediction(_) => e,
                    other => OscarError::Prediction(other.to_string()),
                })?;
                if labels.len() != rows.len() {
                    return Err(OscarError::Prediction(format!(
                        "model returned {} labels for {} rows",
                        labels.len(),
                        rows.len()
                    )));
                }
                Some(labels)
            }
            _ => None,
        };

        Ok(rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                let blank = row.category.trim().is_empty();
                let category = match (&predictions, blank) {
                    (Some(labels), true) => labels[index].clone(),
                    _ => row.category.clone(),
                };
                CategorizedRow {
                    index,
                    date: row.date.clone(),
                    category,
                    ref_no: row.ref_no.clone(),
                    withdrawal: row.withdrawal,
                    deposit: row.deposit,
                    balance: row.balance,
                }
            })
            .collect())
    }
}
