use std::path::Path;

use crate::anomaly::AnomalyEngine;
use crate::error::Result;
use crate::frame::Frame;
use crate::models::AnalysisReport;
use crate::reports;

pub fn run(file: &str, baseline: Option<&str>, json: bool) -> Result<()> {
    let frame = Frame::from_csv_path(Path::new(file))?;

    let engine = AnomalyEngine::new();
    let fitted = match baseline {
        Some(path) => engine.fit(&Frame::from_csv_path(Path::new(path))?)?,
        None => engine.fit(&frame)?,
    };

    let operations = engine.analyze(&frame)?;
    let summary = reports::build_summary(&operations);

    if json {
        let report = AnalysisReport {
            summary,
            operations,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Fitted on {} operations (fingerprint {})",
        fitted.trained_rows,
        &fitted.fingerprint[..12]
    );
    println!("{}", reports::format_summary(&summary));
    println!("{}", reports::format_operations(&operations));
    Ok(())
}
