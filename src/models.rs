use serde::Serialize;

/// One statement row after feature normalization. Pure function of the
/// raw row: identical input always yields identical fields, so the same
/// values feed both fitting and inference.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub withdrawal: f64,
    pub deposit: f64,
    pub balance: f64,
    /// Deposit − Withdrawal, computed after numeric coercion.
    pub amount: f64,
    /// 1–12, or 0 when the date cell was unparsable.
    pub month: u32,
    /// 1–31, or 0 when the date cell was unparsable.
    pub day: u32,
    /// Stringified RefNo. Blank when absent, never null.
    pub ref_text: String,
    // Raw cells echoed into result records.
    pub date: String,
    pub category: String,
    pub ref_no: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OperationAnalysis {
    pub index: usize,
    pub date: String,
    pub category: String,
    pub ref_no: String,
    pub withdrawal: f64,
    pub deposit: f64,
    pub balance: f64,
    /// Higher = more anomalous. Relative ordering only; the absolute
    /// scale shifts between fits.
    pub anomaly_score: f64,
    pub is_anomaly: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategorizedRow {
    pub index: usize,
    pub date: String,
    pub category: String,
    pub ref_no: String,
    pub withdrawal: f64,
    pub deposit: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub total_operations: usize,
    pub anomaly_count: usize,
    pub anomaly_ratio: f64,
    pub total_withdrawal: f64,
    pub total_deposit: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub summary: AnalysisSummary,
    pub operations: Vec<OperationAnalysis>,
}
