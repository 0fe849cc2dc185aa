pub mod analyze;
pub mod categorize;
pub mod status;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "oscar",
    about = "Anomaly and category analysis CLI for bank-statement exports."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score operations for anomalies with an isolation forest.
    Analyze {
        /// Path to the statement CSV to analyze
        file: String,
        /// CSV to fit the model on (default: the analyzed file itself)
        #[arg(long)]
        baseline: Option<String>,
        /// Print the full report as JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Fill blank categories using the frozen classifier.
    Categorize {
        /// Path to the statement CSV to categorize
        file: String,
        /// Path to the frozen model artifact (default: settings)
        #[arg(long)]
        model: Option<String>,
        /// Write the input CSV back with Category filled
        #[arg(long)]
        output: Option<String>,
        /// Print rows as JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Request a retrain before inference. The category model is a
        /// frozen artifact, so this is accepted but has no effect.
        #[arg(long)]
        retrain: bool,
    },
    /// Show settings and frozen-model health.
    Status,
}
