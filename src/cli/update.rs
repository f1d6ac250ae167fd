//! Update subcommand for glossary-updater
//!
//! Reads glossary files and merges their terms into a remote
//! configuration, or previews the merge with `--dry-run`.

use crate::engine::UpdateRequest;
use crate::merge::{InvalidStrategy, MergeStrategy};
use crate::report::OutputFormat;
use clap::{ArgGroup, Args};
use std::path::PathBuf;

/// Arguments for the update subcommand
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("inputs").required(true).multiple(true).args(["file", "directory"])))]
pub struct UpdateArgs {
    /// Configuration ID to update
    #[arg(short = 'c', long)]
    pub config_id: String,

    /// Glossary file to read (repeatable)
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub file: Vec<PathBuf>,

    /// Directory to scan recursively for .csv, .json, .yaml and .yml files (repeatable)
    #[arg(short = 'd', long = "directory", value_name = "DIR")]
    pub directory: Vec<PathBuf>,

    /// How incoming terms combine with existing ones
    ///
    /// merge: add new terms and update matching ones, keep the rest.
    /// overwrite: replace the glossary with the incoming terms.
    #[arg(long, default_value = "merge")]
    pub merge_strategy: String,

    /// Compute the merge and report it without updating the configuration
    #[arg(long)]
    pub dry_run: bool,

    /// Save the fetched configuration here before updating
    #[arg(long, value_name = "DIR")]
    pub backup_dir: Option<PathBuf>,

    /// Output format (default: from config, else json)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

impl UpdateArgs {
    /// Build the engine request. Fails only on an unknown strategy.
    pub fn to_request(&self, default_backup_dir: Option<&PathBuf>) -> Result<UpdateRequest, InvalidStrategy> {
        let strategy: MergeStrategy = self.merge_strategy.parse()?;
        let mut request = UpdateRequest::new(&self.config_id)
            .strategy(strategy)
            .dry_run(self.dry_run);
        request.files = self.file.clone();
        request.directories = self.directory.clone();
        request.backup_dir = self.backup_dir.clone().or_else(|| default_backup_dir.cloned());
        Ok(request)
    }

    /// Input paths as given, for error records.
    pub fn inputs(&self) -> Vec<String> {
        self.file
            .iter()
            .chain(&self.directory)
            .map(|p| p.display().to_string())
            .collect()
    }
}
