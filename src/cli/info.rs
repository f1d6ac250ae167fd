//! Info subcommand: summarize a configuration's glossary without changing it.

use crate::report::OutputFormat;
use clap::Args;

/// Arguments for the info subcommand
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Configuration ID to inspect
    #[arg(short = 'c', long)]
    pub config_id: String,

    /// Output format (default: from config, else json)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}
