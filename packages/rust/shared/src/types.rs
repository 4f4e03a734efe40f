//! Core domain types for the rules assembler.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AssemblerError;

// ---------------------------------------------------------------------------
// SourceSpec
// ---------------------------------------------------------------------------

/// One source directory and the file name its aggregate is written to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    /// Directory name, relative to the build root.
    pub dir: String,
    /// Aggregate file name inside the directory's output subdirectory.
    /// Used verbatim (may be a dotfile).
    pub output: String,
}

impl SourceSpec {
    pub fn new(dir: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            output: output.into(),
        }
    }

    /// The three sources of the reference layout.
    pub fn defaults() -> Vec<SourceSpec> {
        vec![
            SourceSpec::new("general", ".clinerules"),
            SourceSpec::new("framework", ".framework-rules"),
            SourceSpec::new("language", ".language-rules"),
        ]
    }
}

// ---------------------------------------------------------------------------
// AggregateFile
// ---------------------------------------------------------------------------

/// An aggregate file written for one source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateFile {
    /// Absolute path of the written file.
    pub path: PathBuf,
    /// Name of the source directory that produced it.
    pub source: String,
    /// Number of documents concatenated into it.
    pub document_count: usize,
    /// Size of the written content in bytes.
    pub size_bytes: usize,
    /// Hex SHA-256 of the written content.
    pub sha256: String,
}

impl AggregateFile {
    /// Build an entry for an aggregate known only by its path.
    ///
    /// The source name is taken from the directory two levels above the
    /// file (`<source>/output/<file>`). Counts and digest are left empty.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let source = source_name_from_path(&path)?;
        Some(Self {
            path,
            source,
            document_count: 0,
            size_bytes: 0,
            sha256: String::new(),
        })
    }
}

/// Name of the grandparent directory of `path`, if it has one.
pub fn source_name_from_path(path: &Path) -> Option<String> {
    path.parent()?
        .parent()?
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of aggregating one source directory.
#[derive(Debug)]
pub enum AggregateOutcome {
    /// The aggregate file was written.
    Written(AggregateFile),
    /// The directory held no eligible documents; nothing was written.
    NoEligibleDocuments { source: String, dir: PathBuf },
    /// An I/O error stopped the aggregation.
    Failed {
        source: String,
        error: AssemblerError,
    },
}

impl AggregateOutcome {
    /// The written file, if any.
    pub fn written(&self) -> Option<&AggregateFile> {
        match self {
            Self::Written(file) => Some(file),
            _ => None,
        }
    }

    /// Name of the source this outcome belongs to.
    pub fn source(&self) -> &str {
        match self {
            Self::Written(file) => &file.source,
            Self::NoEligibleDocuments { source, .. } | Self::Failed { source, .. } => source,
        }
    }
}

/// Details of a successful final merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    /// Path of the final merged file.
    pub output: PathBuf,
    /// Source names merged, in output order.
    pub sections: Vec<String>,
    /// Aggregate paths that did not exist at merge time.
    pub skipped: Vec<PathBuf>,
    /// Size of the written content in bytes.
    pub size_bytes: usize,
    /// Hex SHA-256 of the written content.
    pub sha256: String,
}

/// Result of the final merge.
#[derive(Debug)]
pub enum MergeOutcome {
    Written(MergeReport),
    Failed {
        output: PathBuf,
        error: AssemblerError,
    },
}

impl MergeOutcome {
    pub fn report(&self) -> Option<&MergeReport> {
        match self {
            Self::Written(report) => Some(report),
            Self::Failed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sources_in_reference_order() {
        let sources = SourceSpec::defaults();
        let dirs: Vec<_> = sources.iter().map(|s| s.dir.as_str()).collect();
        assert_eq!(dirs, ["general", "framework", "language"]);
        assert_eq!(sources[1].output, ".framework-rules");
    }

    #[test]
    fn source_name_is_two_levels_up() {
        let path = Path::new("/rules/framework/output/.framework-rules");
        assert_eq!(source_name_from_path(path).as_deref(), Some("framework"));
    }

    #[test]
    fn source_name_missing_for_shallow_path() {
        assert_eq!(source_name_from_path(Path::new(".clinerules")), None);
    }

    #[test]
    fn aggregate_file_from_path() {
        let file = AggregateFile::from_path("/rules/language/output/.language-rules").unwrap();
        assert_eq!(file.source, "language");
        assert_eq!(file.document_count, 0);
    }

    #[test]
    fn outcome_source_names() {
        let empty = AggregateOutcome::NoEligibleDocuments {
            source: "framework".into(),
            dir: PathBuf::from("/rules/framework"),
        };
        assert_eq!(empty.source(), "framework");
        assert!(empty.written().is_none());

        let failed = AggregateOutcome::Failed {
            source: "general".into(),
            error: AssemblerError::validation("boom"),
        };
        assert_eq!(failed.source(), "general");
    }
}
