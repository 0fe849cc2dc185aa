use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::fmt::amount;
use crate::models::{AnalysisSummary, CategorizedRow, OperationAnalysis};

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Roll per-operation results up into the batch summary. Ratio is 0.0
/// on an empty batch.
pub fn build_summary(operations: &[OperationAnalysis]) -> AnalysisSummary {
    let total = operations.len();
    let anomaly_count = operations.iter().filter(|o| o.is_anomaly).count();
    AnalysisSummary {
        total_operations: total,
        anomaly_count,
        anomaly_ratio: if total > 0 {
            anomaly_count as f64 / total as f64
        } else {
            0.0
        },
        total_withdrawal: operations.iter().map(|o| o.withdrawal).sum(),
        total_deposit: operations.iter().map(|o| o.deposit).sum(),
    }
}

// ---------------------------------------------------------------------------
// Console rendering
// ---------------------------------------------------------------------------

pub fn format_summary(summary: &AnalysisSummary) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Operations", "Anomalies", "Ratio", "Withdrawals", "Deposits"]);
    table.add_row(vec![
        Cell::new(summary.total_operations),
        Cell::new(summary.anomaly_count),
        Cell::new(format!("{:.1}%", summary.anomaly_ratio * 100.0)),
        Cell::new(amount(summary.total_withdrawal)),
        Cell::new(amount(summary.total_deposit)),
    ]);
    table.to_string()
}

pub fn format_operations(operations: &[OperationAnalysis]) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        "#", "Date", "Category", "Ref", "Withdrawal", "Deposit", "Balance", "Score", "Anomaly",
    ]);
    for op in operations {
        let flag = if op.is_anomaly {
            "yes".red().bold().to_string()
        } else {
            String::new()
        };
        table.add_row(vec![
            Cell::new(op.index),
            Cell::new(&op.date),
            Cell::new(&op.category),
            Cell::new(&op.ref_no),
            Cell::new(amount(op.withdrawal)),
            Cell::new(amount(op.deposit)),
            Cell::new(amount(op.balance)),
            Cell::new(format!("{:.4}", op.anomaly_score)),
            Cell::new(flag),
        ]);
    }
    table.to_string()
}

pub fn format_categorized(rows: &[CategorizedRow], filled: &[usize]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["#", "Date", "Category", "Ref", "Withdrawal", "Deposit", "Balance"]);
    for row in rows {
        let category = if filled.contains(&row.index) {
            row.category.green().to_string()
        } else {
            row.category.clone()
        };
        table.add_row(vec![
            Cell::new(row.index),
            Cell::new(&row.date),
            Cell::new(category),
            Cell::new(&row.ref_no),
            Cell::new(amount(row.withdrawal)),
            Cell::new(amount(row.deposit)),
            Cell::new(amount(row.balance)),
        ]);
    }
    table.to_string()
}
