//! Input format adapters.
//!
//! Each adapter turns one file's bytes into an ordered list of [`RawTerm`]
//! candidates. Adapters never validate terms; that is the normalizer's job.
//!
//! Supported formats:
//! - CSV with a header row (see [`csv`])
//! - JSON and YAML documents in one of three shapes (see [`structured`])

pub mod csv;
pub mod structured;

use crate::terms::RawTerm;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Header names / object keys accepted for the phrase, in priority order.
pub const PHRASE_KEYS: &[&str] = &["phrase", "term", "word", "name", "title"];

/// Header names / object keys accepted for the definition, in priority order.
pub const DEFINITION_KEYS: &[&str] = &["definition", "description", "meaning", "explanation", "desc"];

/// Input file format, derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Csv,
    Json,
    Yaml,
}

impl Format {
    /// Detect the format from a path's extension (case-insensitive).
    ///
    /// Returns `None` for anything other than `csv`, `json`, `yaml` and `yml`.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Format::Csv),
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Json => "json",
            Format::Yaml => "yaml",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while reading a single input file. All of them are fatal
/// for the run.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("{file}: cannot read file: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{file}: content is not valid UTF-8: {source}")]
    Encoding {
        file: String,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("{file}: invalid {format}: {reason}")]
    Syntax {
        file: String,
        format: Format,
        reason: String,
    },

    #[error("{file}: no phrase column found (available: {available})")]
    MissingPhraseColumn { file: String, available: String },

    #[error("{file}: unsupported structure: {reason}")]
    UnsupportedStructure { file: String, reason: String },
}

impl FormatError {
    pub fn file(&self) -> &str {
        match self {
            FormatError::Io { file, .. }
            | FormatError::Encoding { file, .. }
            | FormatError::Syntax { file, .. }
            | FormatError::MissingPhraseColumn { file, .. }
            | FormatError::UnsupportedStructure { file, .. } => file,
        }
    }
}

/// Parse a file's bytes according to its format.
///
/// `file` is only used in error messages.
pub fn parse(bytes: &[u8], format: Format, file: &str) -> Result<Vec<RawTerm>, FormatError> {
    let text = decode(bytes, file)?;
    match format {
        Format::Csv => self::csv::parse(text, file),
        Format::Json => structured::parse_json(text, file),
        Format::Yaml => structured::parse_yaml(text, file),
    }
}

/// Read and parse a file from disk.
pub fn parse_file(path: &Path, format: Format) -> Result<Vec<RawTerm>, FormatError> {
    let file = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|source| FormatError::Io {
        file: file.clone(),
        source,
    })?;
    parse(&bytes, format, &file)
}

/// Decode UTF-8, dropping a leading byte-order mark.
fn decode<'a>(bytes: &'a [u8], file: &str) -> Result<&'a str, FormatError> {
    let text = std::str::from_utf8(bytes).map_err(|source| FormatError::Encoding {
        file: file.to_string(),
        source,
    })?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
}

/// Find the first candidate name present in `names`, comparing trimmed and
/// case-insensitively. Candidates are tried in priority order.
pub(crate) fn resolve_key<'a, I>(candidates: &[&str], names: I) -> Option<usize>
where
    I: IntoIterator<Item = &'a str> + Clone,
{
    candidates.iter().find_map(|candidate| {
        names
            .clone()
            .into_iter()
            .position(|name| name.trim().eq_ignore_ascii_case(candidate))
    })
}
