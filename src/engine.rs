//! Update orchestration.
//!
//! A run moves through these stages, failing out of any of them:
//!
//! ```text
//! Discovering -> Parsing -> Validating -> GuardChecking -> Fetching -> Merging
//!     -> DryRunStop | Updating -> Reporting
//! ```
//!
//! Everything up to and including the guard check is local, so bad input or
//! a reserved target never costs a network call. Dry runs share the whole
//! merge computation with real runs and only skip the write.

use crate::api::{ApiError, ConfigurationApi};
use crate::backup;
use crate::discovery::{self, DiscoveredFile};
use crate::error::EngineError;
use crate::formats;
use crate::guard::ReservedIdGuard;
use crate::merge::{self, MergeStrategy};
use crate::remote::GlossarySummary;
use crate::report::SuccessRecord;
use crate::terms::{self, TermSet};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// Stage of an update run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Discovering,
    Parsing,
    Validating,
    GuardChecking,
    Fetching,
    Merging,
    DryRunStop,
    Updating,
    Reporting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Discovering => "discovering",
            Stage::Parsing => "parsing",
            Stage::Validating => "validating",
            Stage::GuardChecking => "guard_checking",
            Stage::Fetching => "fetching",
            Stage::Merging => "merging",
            Stage::DryRunStop => "dry_run_stop",
            Stage::Updating => "updating",
            Stage::Reporting => "reporting",
        };
        f.write_str(name)
    }
}

/// Inputs for one update run.
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub config_id: String,
    pub files: Vec<PathBuf>,
    pub directories: Vec<PathBuf>,
    pub strategy: MergeStrategy,
    pub dry_run: bool,
    /// Back up the fetched configuration here before a real update.
    pub backup_dir: Option<PathBuf>,
}

impl UpdateRequest {
    pub fn new(config_id: impl Into<String>) -> Self {
        Self {
            config_id: config_id.into(),
            files: Vec::new(),
            directories: Vec::new(),
            strategy: MergeStrategy::default(),
            dry_run: false,
            backup_dir: None,
        }
    }

    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    pub fn directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.directories.push(path.into());
        self
    }

    pub fn strategy(mut self, strategy: MergeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn backup_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backup_dir = Some(dir.into());
        self
    }

    /// Input paths as given, for error reporting.
    pub fn inputs(&self) -> Vec<String> {
        self.files
            .iter()
            .chain(&self.directories)
            .map(|p| p.display().to_string())
            .collect()
    }
}

/// Terms read from local files, ready to merge.
#[derive(Debug, Clone)]
pub struct Ingested {
    pub files: Vec<DiscoveredFile>,
    pub terms: TermSet,
    /// Entries dropped for an empty phrase.
    pub rejected: usize,
    /// Entries that replaced an earlier entry with the same phrase.
    pub duplicates_found: usize,
}

/// Discover, parse, normalize and deduplicate.
///
/// Any file that fails to parse aborts the whole ingestion.
pub fn ingest(files: &[PathBuf], directories: &[PathBuf]) -> Result<Ingested, EngineError> {
    let mut stage = Stage::Discovering;
    ingest_tracked(files, directories, &mut stage)
}

fn ingest_tracked(
    files: &[PathBuf],
    directories: &[PathBuf],
    stage: &mut Stage,
) -> Result<Ingested, EngineError> {
    enter(stage, Stage::Discovering);
    let discovered = discovery::discover(files, directories)?;
    if discovered.is_empty() {
        return Err(EngineError::NoFilesFound);
    }

    enter(stage, Stage::Parsing);
    let mut raw = Vec::new();
    for file in &discovered {
        let candidates = formats::parse_file(&file.path, file.format)?;
        info!(
            file = %file.path.display(),
            format = %file.format,
            entries = candidates.len(),
            "Parsed glossary file"
        );
        raw.extend(candidates);
    }

    enter(stage, Stage::Validating);
    let normalized = terms::normalize_all(raw);
    let deduped = terms::dedupe(normalized.terms);
    info!(
        terms = deduped.terms.len(),
        rejected = normalized.rejected,
        duplicates = deduped.duplicates_found,
        "Validated glossary terms"
    );

    Ok(Ingested {
        files: discovered,
        terms: deduped.terms,
        rejected: normalized.rejected,
        duplicates_found: deduped.duplicates_found,
    })
}

fn enter(stage: &mut Stage, next: Stage) {
    debug!(from = %stage, to = %next, "Stage transition");
    *stage = next;
}

/// Runs updates against a configuration API.
pub struct Engine<A> {
    api: A,
    guard: ReservedIdGuard,
}

impl<A: ConfigurationApi> Engine<A> {
    pub fn new(api: A, guard: ReservedIdGuard) -> Self {
        Self { api, guard }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Run a full update (or a dry run) and return the success record.
    pub async fn update(&self, request: &UpdateRequest) -> Result<SuccessRecord, EngineError> {
        let mut stage = Stage::Discovering;
        let result = self.run_update(request, &mut stage).await;
        if let Err(ref e) = result {
            error!(
                stage = %stage,
                code = %e.code(),
                config_id = %request.config_id,
                error = %e,
                "Update failed"
            );
        }
        result
    }

    async fn run_update(
        &self,
        request: &UpdateRequest,
        stage: &mut Stage,
    ) -> Result<SuccessRecord, EngineError> {
        let config_id = request.config_id.as_str();
        info!(config_id, strategy = %request.strategy, dry_run = request.dry_run, "Starting glossary update");

        let ingested = ingest_tracked(&request.files, &request.directories, stage)?;

        let mut warnings = Vec::new();
        if ingested.terms.is_empty() {
            warn!("No valid glossary terms found in input files");
            warnings.push("no valid glossary terms found in input files".to_string());
        }
        if ingested.rejected > 0 {
            warnings.push(format!(
                "{} entr{} rejected for an empty phrase",
                ingested.rejected,
                if ingested.rejected == 1 { "y" } else { "ies" }
            ));
        }

        enter(stage, Stage::GuardChecking);
        self.guard.assert_mutable(config_id)?;

        enter(stage, Stage::Fetching);
        let fetch_err = |source| EngineError::Fetch {
            config_id: config_id.to_string(),
            source,
        };
        let token = self.api.authenticate().await.map_err(fetch_err)?;
        let current = self
            .api
            .fetch_configuration(config_id, &token)
            .await
            .map_err(fetch_err)?;

        enter(stage, Stage::Merging);
        let current_terms = current.terms();
        let (merged, merge_stats) = merge::merge(&current_terms, &ingested.terms, request.strategy);
        info!(
            before = merge_stats.terms_before,
            after = merge_stats.terms_after,
            added = merge_stats.terms_added,
            updated = merge_stats.terms_updated,
            removed = merge_stats.terms_removed,
            "Merged glossary terms"
        );

        let mut backup_info = None;
        if request.dry_run {
            enter(stage, Stage::DryRunStop);
            info!(config_id, "Dry run, configuration not updated");
        } else {
            if let Some(ref dir) = request.backup_dir {
                backup_info = Some(backup::write_backup(dir, config_id, &current)?);
            }

            enter(stage, Stage::Updating);
            let updated = current.with_terms(&merged);
            self.api
                .update_configuration(config_id, &updated, &token)
                .await
                .map_err(|source| EngineError::Update {
                    config_id: config_id.to_string(),
                    source,
                })?;
        }

        enter(stage, Stage::Reporting);
        Ok(SuccessRecord {
            success: true,
            dry_run: request.dry_run,
            config_id: config_id.to_string(),
            files_processed: ingested.files.len(),
            terms_extracted: ingested.terms.len(),
            terms_rejected: ingested.rejected,
            duplicates_found: ingested.duplicates_found,
            merge_stats,
            backup_info,
            warnings,
        })
    }

    /// Summarize the glossary section of a configuration. Read-only.
    pub async fn configuration_info(&self, config_id: &str) -> Result<GlossarySummary, EngineError> {
        let fetch_err = |source| EngineError::Fetch {
            config_id: config_id.to_string(),
            source,
        };
        let token = self.api.authenticate().await.map_err(fetch_err)?;
        let config = self
            .api
            .fetch_configuration(config_id, &token)
            .await
            .map_err(fetch_err)?;
        Ok(config.summary())
    }

    /// Authenticate and probe the configuration listing.
    pub async fn test_connection(&self) -> Result<(), ApiError> {
        let token = self.api.authenticate().await?;
        self.api.test_connection(&token).await
    }
}
