//! Input file discovery.
//!
//! Expands explicit file paths and directory paths into a concrete list of
//! supported glossary files. Explicit files come first, in argument order,
//! followed by directory contents walked recursively in file-name order so
//! that repeated runs see the same sequence.

use crate::formats::Format;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// A supported input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredFile {
    /// Absolute, canonical path.
    pub path: PathBuf,
    pub format: Format,
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("cannot resolve {}: {source}", path.display())]
    Resolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot scan {}: {source}", root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

impl DiscoveryError {
    /// The offending path.
    pub fn path(&self) -> &Path {
        match self {
            DiscoveryError::FileNotFound(p) | DiscoveryError::NotADirectory(p) => p,
            DiscoveryError::Resolve { path, .. } => path,
            DiscoveryError::Walk { root, .. } => root,
        }
    }
}

/// Discover supported files.
///
/// Fails if an explicit file does not exist (or is not a regular file) or a
/// directory path is not a directory. Files with unsupported extensions are
/// skipped. Duplicate paths (after resolution) are kept once, at their first
/// position.
pub fn discover<F, D>(files: F, directories: D) -> Result<Vec<DiscoveredFile>, DiscoveryError>
where
    F: IntoIterator,
    F::Item: AsRef<Path>,
    D: IntoIterator,
    D::Item: AsRef<Path>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for file in files {
        let file = file.as_ref();
        if !file.is_file() {
            return Err(DiscoveryError::FileNotFound(file.to_path_buf()));
        }
        match Format::from_path(file) {
            Some(format) => push_unique(&mut out, &mut seen, file, format)?,
            None => warn!(path = %file.display(), "Skipping file with unsupported extension"),
        }
    }

    for dir in directories {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(DiscoveryError::NotADirectory(dir.to_path_buf()));
        }

        for entry in WalkDir::new(dir)
            .follow_links(false)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        {
            let entry = entry.map_err(|source| DiscoveryError::Walk {
                root: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            match Format::from_path(path) {
                Some(format) => push_unique(&mut out, &mut seen, path, format)?,
                None => debug!(path = %path.display(), "Ignoring non-glossary file"),
            }
        }
    }

    for format in [Format::Csv, Format::Json, Format::Yaml] {
        let count = out.iter().filter(|f| f.format == format).count();
        if count > 0 {
            info!(format = %format, count, "Discovered glossary files");
        }
    }

    Ok(out)
}

fn push_unique(
    out: &mut Vec<DiscoveredFile>,
    seen: &mut HashSet<PathBuf>,
    path: &Path,
    format: Format,
) -> Result<(), DiscoveryError> {
    let resolved = std::fs::canonicalize(path).map_err(|source| DiscoveryError::Resolve {
        path: path.to_path_buf(),
        source,
    })?;
    if seen.insert(resolved.clone()) {
        debug!(path = %resolved.display(), %format, "Discovered file");
        out.push(DiscoveredFile {
            path: resolved,
            format,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, "phrase,definition\n").unwrap();
    }

    fn names(found: &[DiscoveredFile]) -> Vec<String> {
        found
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn explicit_files_come_first_in_argument_order() {
        let temp = TempDir::new().unwrap();
        let b = temp.path().join("b.json");
        let a = temp.path().join("a.csv");
        let dir = temp.path().join("dir");
        touch(&b);
        touch(&a);
        touch(&dir.join("c.yaml"));

        let found = discover([&b, &a], [&dir]).unwrap();
        assert_eq!(names(&found), vec!["b.json", "a.csv", "c.yaml"]);
        assert_eq!(found[0].format, Format::Json);
        assert!(found.iter().all(|f| f.path.is_absolute()));
    }

    #[test]
    fn directories_are_walked_recursively_and_sorted() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(&root.join("z.csv"));
        touch(&root.join("nested/m.yml"));
        touch(&root.join("a.json"));
        touch(&root.join("notes.txt"));
        touch(&root.join("nested/deeper/b.YAML"));

        let found = discover(Vec::<PathBuf>::new(), [root]).unwrap();
        // Depth-first, entries sorted by file name at each level
        assert_eq!(names(&found), vec!["a.json", "b.YAML", "m.yml", "z.csv"]);

        // Same filesystem state, same order
        let again = discover(Vec::<PathBuf>::new(), [root]).unwrap();
        assert_eq!(found, again);
    }

    #[test]
    fn duplicates_are_collapsed() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("terms.csv");
        touch(&file);
        let dotted = temp.path().join(".").join("terms.csv");

        let found = discover([&file, &dotted], [temp.path()]).unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn unsupported_explicit_file_is_skipped() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("terms.txt");
        touch(&file);
        let found = discover([&file], Vec::<PathBuf>::new()).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn missing_file_fails() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.csv");
        let err = discover([&missing], Vec::<PathBuf>::new()).unwrap_err();
        assert!(matches!(err, DiscoveryError::FileNotFound(_)));
        assert_eq!(err.path(), missing.as_path());
    }

    #[test]
    fn file_given_as_directory_fails() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("terms.csv");
        touch(&file);
        let err = discover(Vec::<PathBuf>::new(), [&file]).unwrap_err();
        assert!(matches!(err, DiscoveryError::NotADirectory(_)));
    }
}
