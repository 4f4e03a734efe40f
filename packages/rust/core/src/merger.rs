//! Final merger.
//!
//! Combines the aggregate files of several sources into one file, one
//! section per source, in the order given.

use std::path::Path;

use tracing::{debug, error, info, instrument, warn};

use rules_assembler_shared::{AggregateFile, MergeOutcome, MergeReport, Result};

use crate::output::{ensure_dir, read_text, write_atomic};
use crate::sections::{SectionBuffer, directory_header};

/// Merge `aggregates` into `final_output`.
///
/// Aggregates whose file no longer exists are skipped with a warning. Any
/// I/O error is logged and reported as [`MergeOutcome::Failed`].
#[instrument(skip_all, fields(inputs = aggregates.len(), output = %final_output.display()))]
pub fn merge(aggregates: &[AggregateFile], final_output: &Path) -> MergeOutcome {
    info!("merging aggregate files");

    match try_merge(aggregates, final_output) {
        Ok(report) => {
            info!(
                sections = report.sections.len(),
                skipped = report.skipped.len(),
                "final merge complete"
            );
            MergeOutcome::Written(report)
        }
        Err(err) => {
            error!(error = %err, "failed to merge aggregate files");
            MergeOutcome::Failed {
                output: final_output.to_path_buf(),
                error: err,
            }
        }
    }
}

/// Merge aggregates known only by path.
///
/// Each section is labelled with the directory two levels above its file.
/// Paths too shallow to carry such a name are skipped.
pub fn merge_paths<P: AsRef<Path>>(paths: &[P], final_output: &Path) -> MergeOutcome {
    let aggregates: Vec<AggregateFile> = paths
        .iter()
        .filter_map(|p| {
            let path = p.as_ref();
            let file = AggregateFile::from_path(path);
            if file.is_none() {
                warn!(path = %path.display(), "cannot derive source name, skipping");
            }
            file
        })
        .collect();

    merge(&aggregates, final_output)
}

fn try_merge(aggregates: &[AggregateFile], final_output: &Path) -> Result<MergeReport> {
    if let Some(parent) = final_output.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }

    let mut buffer = SectionBuffer::new();
    let mut sections = Vec::new();
    let mut skipped = Vec::new();

    for aggregate in aggregates {
        let path = &aggregate.path;
        if !path.exists() {
            warn!(path = %path.display(), "aggregate file not found, skipping");
            skipped.push(path.clone());
            continue;
        }

        let content = read_text(path)?;
        debug!(source = %aggregate.source, bytes = content.len(), "read aggregate file");

        buffer.push(&directory_header(&aggregate.source), &content);
        sections.push(aggregate.source.clone());
    }

    let written = write_atomic(final_output, &buffer.finish())?;

    Ok(MergeReport {
        output: final_output.to_path_buf(),
        sections,
        skipped,
        size_bytes: written.size_bytes,
        sha256: written.sha256,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rules_assembler_shared::AssemblerError;
    use std::path::PathBuf;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ra-merger-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Write an aggregate file the way the aggregator lays it out.
    fn aggregate_at(root: &Path, source: &str, name: &str, content: &str) -> AggregateFile {
        let path = root.join(source).join("output").join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        AggregateFile::from_path(path).unwrap()
    }

    fn report(outcome: MergeOutcome) -> MergeReport {
        match outcome {
            MergeOutcome::Written(report) => report,
            MergeOutcome::Failed { error, .. } => panic!("merge failed: {error}"),
        }
    }

    #[test]
    fn sections_follow_input_order() {
        let tmp = temp_dir();
        let language = aggregate_at(&tmp, "language", ".language-rules", "L");
        let general = aggregate_at(&tmp, "general", ".clinerules", "G");
        let final_output = tmp.join(".clinerules");

        let report = report(merge(&[language, general], &final_output));

        assert_eq!(report.sections, vec!["language", "general"]);
        let content = std::fs::read_to_string(&final_output).unwrap();
        assert_eq!(
            content,
            "# LANGUAGE ディレクトリのルール\n\nL\n\n---\n\n\n# GENERAL ディレクトリのルール\n\nG\n\n---"
        );

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_aggregate_is_skipped() {
        let tmp = temp_dir();
        let general = aggregate_at(&tmp, "general", ".clinerules", "G");
        let missing = AggregateFile::from_path(tmp.join("framework/output/.framework-rules")).unwrap();
        let final_output = tmp.join(".clinerules");

        let report = report(merge(&[general, missing.clone()], &final_output));

        assert_eq!(report.sections, vec!["general"]);
        assert_eq!(report.skipped, vec![missing.path]);
        let content = std::fs::read_to_string(&final_output).unwrap();
        assert!(!content.contains("FRAMEWORK"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn label_comes_from_directory_two_levels_up() {
        let tmp = temp_dir();
        let path = tmp.join("framework/output/.framework-rules");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "F").unwrap();
        let final_output = tmp.join(".clinerules");

        let report = report(merge_paths(&[&path], &final_output));

        assert_eq!(report.sections, vec!["framework"]);
        let content = std::fs::read_to_string(&final_output).unwrap();
        assert!(content.starts_with("# FRAMEWORK ディレクトリのルール"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn non_utf8_aggregate_is_decoded_lossily() {
        let tmp = temp_dir();
        let path = tmp.join("language/output/.language-rules");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, [b'r', b'u', b's', b't', 0xff]).unwrap();
        let general = aggregate_at(&tmp, "general", ".clinerules", "G");
        let final_output = tmp.join(".clinerules");

        let report = report(merge_paths(&[general.path, path], &final_output));

        assert_eq!(report.sections, vec!["general", "language"]);
        let content = std::fs::read_to_string(&final_output).unwrap();
        assert!(content.contains("rust\u{FFFD}"));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn creates_missing_output_directory() {
        let tmp = temp_dir();
        let general = aggregate_at(&tmp, "general", ".clinerules", "G");
        let final_output = tmp.join("dist/nested/.clinerules");

        report(merge(&[general], &final_output));
        assert!(final_output.is_file());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn no_inputs_writes_empty_file() {
        let tmp = temp_dir();
        let final_output = tmp.join(".clinerules");
        std::fs::write(&final_output, "old").unwrap();

        let report = report(merge(&[], &final_output));

        assert!(report.sections.is_empty());
        assert_eq!(std::fs::read_to_string(&final_output).unwrap(), "");

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn unwritable_output_reports_failure() {
        let tmp = temp_dir();
        let general = aggregate_at(&tmp, "general", ".clinerules", "G");
        // A regular file where the output's parent directory should be.
        std::fs::write(tmp.join("blocker"), "").unwrap();
        let final_output = tmp.join("blocker/.clinerules");

        let outcome = merge(&[general], &final_output);

        match outcome {
            MergeOutcome::Failed { output, error } => {
                assert_eq!(output, final_output);
                assert!(matches!(error, AssemblerError::Io { .. }));
            }
            MergeOutcome::Written(_) => panic!("expected failure"),
        }

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
