//! Directory aggregator.
//!
//! Concatenates every eligible document directly inside one source directory
//! into a single aggregate file under the directory's output subdirectory:
//! ```text
//! <root>/<source>/
//! ├── coding-style.md
//! ├── testing.md
//! └── output/
//!     └── <aggregate file>
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, error, info, instrument, warn};

use rules_assembler_shared::{
    AggregateFile, AggregateOutcome, AppConfig, AssemblerError, BuildPlan, Result, SourceSpec,
};

use crate::output::{ensure_dir, read_text, write_atomic};
use crate::sections::{SectionBuffer, document_header, document_stem};

/// Settings shared by every source in a run.
#[derive(Debug, Clone)]
pub struct AggregateOptions {
    /// Suffix a file name must end with to be aggregated.
    pub extension: String,
    /// Name of the subdirectory that receives the aggregate.
    pub output_dir: String,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self::from(&BuildPlan::new(&AppConfig::default(), ""))
    }
}

impl From<&BuildPlan> for AggregateOptions {
    fn from(plan: &BuildPlan) -> Self {
        Self {
            extension: plan.extension.clone(),
            output_dir: plan.output_dir.clone(),
        }
    }
}

/// Aggregate the documents of one source directory.
///
/// Never fails: a directory without documents and any I/O error are both
/// logged and reported through the returned [`AggregateOutcome`].
#[instrument(skip_all, fields(source = %source.dir))]
pub fn aggregate(root: &Path, source: &SourceSpec, options: &AggregateOptions) -> AggregateOutcome {
    info!("aggregating source directory");

    match try_aggregate(root, source, options) {
        Ok(Some(file)) => {
            info!(
                documents = file.document_count,
                path = %file.path.display(),
                "source directory aggregated"
            );
            AggregateOutcome::Written(file)
        }
        Ok(None) => {
            let dir = root.join(&source.dir);
            warn!(
                dir = %dir.display(),
                extension = %options.extension,
                "no eligible documents found, skipping"
            );
            AggregateOutcome::NoEligibleDocuments {
                source: source.dir.clone(),
                dir,
            }
        }
        Err(err) => {
            error!(error = %err, "failed to aggregate source directory");
            AggregateOutcome::Failed {
                source: source.dir.clone(),
                error: err,
            }
        }
    }
}

fn try_aggregate(
    root: &Path,
    source: &SourceSpec,
    options: &AggregateOptions,
) -> Result<Option<AggregateFile>> {
    let source_dir = root.join(&source.dir);
    let documents = list_documents(&source_dir, &options.extension)?;
    if documents.is_empty() {
        return Ok(None);
    }

    let output_dir = source_dir.join(&options.output_dir);
    ensure_dir(&output_dir)?;

    let mut buffer = SectionBuffer::new();
    for name in &documents {
        let content = read_text(&source_dir.join(name))?;
        debug!(file = %name, bytes = content.len(), "read document");
        buffer.push(
            &document_header(document_stem(name, &options.extension)),
            &content,
        );
    }

    let document_count = buffer.len();
    let target: PathBuf = output_dir.join(&source.output);
    let written = write_atomic(&target, &buffer.finish())?;

    Ok(Some(AggregateFile {
        path: target,
        source: source.dir.clone(),
        document_count,
        size_bytes: written.size_bytes,
        sha256: written.sha256,
    }))
}

/// Names of the regular files directly inside `dir` ending with `extension`,
/// sorted lexicographically.
pub fn list_documents(dir: &Path, extension: &str) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(dir).map_err(|e| AssemblerError::io(dir, e))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AssemblerError::io(dir, e))?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            debug!(name = ?file_name, "skipping non UTF-8 file name");
            continue;
        };
        if !name.ends_with(extension) {
            continue;
        }

        // Follows symlinks, like a plain stat.
        let path = entry.path();
        let metadata = std::fs::metadata(&path).map_err(|e| AssemblerError::io(&path, e))?;
        if metadata.is_file() {
            names.push(name.to_string());
        }
    }

    names.sort();
    Ok(names)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
