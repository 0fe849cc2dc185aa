use std::path::Path;

use colored::Colorize;

use crate::artifact::FrozenModel;
use crate::error::Result;
use crate::settings::{load_settings, settings_path};

pub fn run() -> Result<()> {
    let settings = load_settings();
    println!("Settings:       {}", settings_path().display());
    println!("Category model: {}", settings.model_path);
    match FrozenModel::load(Path::new(&settings.model_path)) {
        Ok(model) => println!(
            "{}",
            format!(
                "Model loads: {} classes, {} n-gram features",
                model.classes().len(),
                model.vocabulary_len()
            )
            .green()
        ),
        Err(e) => println!("{}", format!("Model does not load: {e}").red()),
    }
    Ok(())
}
