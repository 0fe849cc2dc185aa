use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::artifact::FrozenModel;
use crate::category::CategoryEngine;
use crate::error::Result;
use crate::frame::Frame;
use crate::reports;
use crate::settings::load_settings;

pub fn run(
    file: &str,
    model: Option<&str>,
    output: Option<&str>,
    json: bool,
    retrain: bool,
) -> Result<()> {
    if retrain {
        eprintln!(
            "{}",
            "Note: the category model is a frozen artifact; --retrain is ignored.".yellow()
        );
    }

    let model_path = model
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(load_settings().model_path));
    let engine = match FrozenModel::load(&model_path) {
        Ok(frozen) => CategoryEngine::new(Some(Box::new(frozen))),
        Err(e) => {
            eprintln!("{}", format!("{e}; blank categories will stay blank").yellow());
            CategoryEngine::without_model()
        }
    };

    let frame = Frame::from_csv_path(Path::new(file))?;
    let rows = engine.infer(&frame)?;

    let filled: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(i, row)| {
            frame.cell(*i, "Category").trim().is_empty() && !row.category.trim().is_empty()
        })
        .map(|(i, _)| i)
        .collect();

    if let Some(out) = output {
        let categories: Vec<String> = rows.iter().map(|r| r.category.clone()).collect();
        std::fs::write(out, frame.to_csv_with_column("Category", &categories)?)?;
        println!("Wrote {} rows to {out}", rows.len());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        println!("{}", reports::format_categorized(&rows, &filled));
        println!("{} of {} categories filled", filled.len(), rows.len());
    }
    Ok(())
}
