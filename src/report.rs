//! Result records and their rendering as JSON or markdown.

use crate::error::{EngineError, ErrorCode};
use crate::merge::MergeStats;
use crate::remote::GlossarySummary;
use chrono::{SecondsFormat, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Output format for result records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Markdown,
}

/// Where the pre-update backup went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupInfo {
    pub path: String,
    /// RFC 3339, UTC.
    pub created: String,
    /// Bytes written.
    pub size: u64,
}

/// Record emitted when a run completes, dry or not.
#[derive(Debug, Clone, Serialize)]
pub struct SuccessRecord {
    pub success: bool,
    pub dry_run: bool,
    pub config_id: String,
    pub files_processed: usize,
    /// Unique terms after normalization and deduplication.
    pub terms_extracted: usize,
    pub terms_rejected: usize,
    pub duplicates_found: usize,
    pub merge_stats: MergeStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_info: Option<BackupInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetails {
    pub config_id: String,
    /// Input paths as given on the command line.
    pub files_attempted: Vec<String>,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_status: Option<u16>,
}

/// Record emitted when a run fails.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub success: bool,
    pub error: String,
    pub error_type: ErrorCode,
    pub details: ErrorDetails,
}

impl ErrorRecord {
    pub fn new(err: &EngineError, config_id: &str, files_attempted: Vec<String>) -> Self {
        Self {
            success: false,
            error: err.to_string(),
            error_type: err.code(),
            details: ErrorDetails {
                config_id: config_id.to_string(),
                files_attempted,
                timestamp: now(),
                remote_status: err.remote_status(),
            },
        }
    }
}

/// Current time as RFC 3339, UTC, second precision.
pub fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Anything that can be printed as a command result.
pub trait Render: Serialize {
    fn to_markdown(&self) -> String;

    fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(self)
                .unwrap_or_else(|e| format!("{{\"success\": false, \"error\": \"{e}\"}}")),
            OutputFormat::Markdown => self.to_markdown(),
        }
    }
}

impl Render for SuccessRecord {
    fn to_markdown(&self) -> String {
        let stats = &self.merge_stats;
        let mut md = String::new();

        let title = if self.dry_run {
            "Glossary Update Preview (dry run)"
        } else {
            "Glossary Update"
        };
        md.push_str(&format!("## {title}\n"));
        md.push_str(&format!("- **config_id**: `{}`\n", self.config_id));
        md.push_str(&format!("- **strategy**: {}\n", stats.strategy));
        md.push_str(&format!("- **files_processed**: {}\n", self.files_processed));
        md.push_str(&format!("- **terms_extracted**: {}\n", self.terms_extracted));
        if self.terms_rejected > 0 {
            md.push_str(&format!("- **terms_rejected**: {}\n", self.terms_rejected));
        }
        if self.duplicates_found > 0 {
            md.push_str(&format!("- **duplicates_found**: {}\n", self.duplicates_found));
        }

        md.push_str("\n| before | after | added | updated | removed |\n");
        md.push_str("|---|---|---|---|---|\n");
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            stats.terms_before,
            stats.terms_after,
            stats.terms_added,
            stats.terms_updated,
            stats.terms_removed
        ));

        if let Some(ref backup) = self.backup_info {
            md.push_str(&format!(
                "\nBackup: `{}` ({} bytes, {})\n",
                backup.path, backup.size, backup.created
            ));
        }

        if !self.warnings.is_empty() {
            md.push_str("\n### Warnings\n");
            for warning in &self.warnings {
                md.push_str(&format!("- {warning}\n"));
            }
        }

        md
    }
}

impl Render for ErrorRecord {
    fn to_markdown(&self) -> String {
        let mut md = String::new();
        md.push_str(&format!("## Glossary Update Failed: {}\n", self.error_type));
        md.push_str(&format!("{}\n\n", self.error));
        md.push_str(&format!("- **config_id**: `{}`\n", self.details.config_id));
        if let Some(status) = self.details.remote_status {
            md.push_str(&format!("- **remote_status**: {status}\n"));
        }
        if !self.details.files_attempted.is_empty() {
            let files: Vec<String> = self
                .details
                .files_attempted
                .iter()
                .map(|f| format!("`{f}`"))
                .collect();
            md.push_str(&format!("- **files_attempted**: {}\n", files.join(", ")));
        }
        md.push_str(&format!("- **timestamp**: {}\n", self.details.timestamp));
        md
    }
}

/// `info` command output.
#[derive(Debug, Clone, Serialize)]
pub struct InfoRecord {
    pub config_id: String,
    #[serde(flatten)]
    pub summary: GlossarySummary,
}

impl Render for InfoRecord {
    fn to_markdown(&self) -> String {
        let s = &self.summary;
        let mut md = String::new();
        md.push_str(&format!("## Configuration `{}`\n", self.config_id));
        if let Some(ref name) = s.configuration_name {
            md.push_str(&format!("- **name**: {name}\n"));
        }
        md.push_str(&format!("- **glossary_entity**: {}\n", match s.glossary_entity_id {
            Some(ref id) => format!("`{id}`"),
            None if s.glossary_entity_exists => "present".to_string(),
            None => "missing".to_string(),
        }));
        md.push_str(&format!("- **terms**: {}\n", s.term_count));
        md.push_str(&format!("- **linked_resources**: {}\n", s.resource_ids.len()));
        md.push_str(&format!("- **entities**: {}\n", s.total_entities));
        md.push_str(&format!("- **resources**: {}\n", s.total_resources));
        md
    }
}
