//! Tagwatch CLI: the `tagwatch` command.

mod cli;
mod commands;
mod settings;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    support::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { document, json } => commands::validate::run(document, json),

        Commands::Baseline {
            captured,
            out,
            json,
        } => commands::baseline::run(captured, out, json),

        Commands::Compare {
            baseline,
            observed,
            settings,
            env,
            focus,
            continue_on_missing_page,
            validate_observed,
            out,
            json,
        } => commands::compare::run(commands::compare::Args {
            baseline,
            observed,
            settings,
            env,
            focus,
            continue_on_missing_page,
            validate_observed,
            out,
            json,
        }),
    }
}
