mod anomaly;
mod artifact;
mod category;
mod cli;
mod error;
mod fmt;
mod frame;
mod isoforest;
mod models;
mod normalizer;
mod reports;
mod settings;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            file,
            baseline,
            json,
        } => cli::analyze::run(&file, baseline.as_deref(), json),
        Commands::Categorize {
            file,
            model,
            output,
            json,
            retrain,
        } => cli::categorize::run(&file, model.as_deref(), output.as_deref(), json, retrain),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
