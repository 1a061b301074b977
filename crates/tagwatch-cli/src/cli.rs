use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tagwatch",
    about = "Tagwatch: check page tracking variables against a captured baseline",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check a definition document against the baseline schema
    Validate {
        /// Path to the definition (or snapshot) JSON
        document: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Derive a baseline snapshot from captured tracking parameters
    Baseline {
        /// Path to the captured parameters JSON (page -> variables -> raw values)
        #[arg(long)]
        captured: String,

        /// Write the derived snapshot here instead of stdout
        #[arg(long)]
        out: Option<String>,

        /// Output a summary as JSON (with --out)
        #[arg(long)]
        json: bool,
    },

    /// Compare an observed snapshot against a baseline definition
    Compare {
        /// Path to the baseline definition JSON
        #[arg(long)]
        baseline: String,

        /// Path to the observed snapshot JSON
        #[arg(long)]
        observed: String,

        /// Settings file (JSON, or TOML by extension) holding per-environment sections
        #[arg(long, requires = "env")]
        settings: Option<String>,

        /// Section of the settings file to use
        #[arg(long, requires = "settings")]
        env: Option<String>,

        /// Only check this page; no result file is written
        #[arg(long)]
        focus: Option<String>,

        /// Mark variables of missing pages failed instead of aborting
        #[arg(long)]
        continue_on_missing_page: bool,

        /// Validate the observed snapshot against the schema first
        #[arg(long)]
        validate_observed: bool,

        /// Write the annotated result document here
        #[arg(long)]
        out: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
