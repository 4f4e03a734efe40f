//! End-to-end build: aggregate every configured source, then merge.

use std::time::{Duration, Instant};

use tracing::{info, instrument};

use rules_assembler_shared::{AggregateFile, AggregateOutcome, BuildPlan, MergeOutcome};

use crate::aggregator::{AggregateOptions, aggregate};
use crate::merger::merge;

/// Everything that happened during one build.
#[derive(Debug)]
pub struct RunSummary {
    /// One outcome per configured source, in processing order.
    pub aggregates: Vec<AggregateOutcome>,
    /// Outcome of the final merge.
    pub merge: MergeOutcome,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

impl RunSummary {
    /// Aggregate files that were written.
    pub fn written(&self) -> impl Iterator<Item = &AggregateFile> {
        self.aggregates.iter().filter_map(AggregateOutcome::written)
    }

    /// Sources that had no eligible documents.
    pub fn empty_sources(&self) -> impl Iterator<Item = &str> {
        self.aggregates.iter().filter_map(|o| match o {
            AggregateOutcome::NoEligibleDocuments { source, .. } => Some(source.as_str()),
            _ => None,
        })
    }

    /// Sources whose aggregation failed.
    pub fn failed_sources(&self) -> impl Iterator<Item = &str> {
        self.aggregates.iter().filter_map(|o| match o {
            AggregateOutcome::Failed { source, .. } => Some(source.as_str()),
            _ => None,
        })
    }

    /// True when every source and the merge succeeded or had nothing to do.
    pub fn is_clean(&self) -> bool {
        self.failed_sources().next().is_none() && self.merge.report().is_some()
    }
}

/// Run the full build described by `plan`.
///
/// Sources are processed one after another. Per-source problems are recorded
/// in the summary and never abort the run.
#[instrument(skip_all, fields(root = %plan.root.display(), sources = plan.sources.len()))]
pub fn run(plan: &BuildPlan) -> RunSummary {
    let start = Instant::now();
    let options = AggregateOptions::from(plan);

    info!("starting build");

    let aggregates: Vec<AggregateOutcome> = plan
        .sources
        .iter()
        .map(|source| aggregate(&plan.root, source, &options))
        .collect();

    let written: Vec<AggregateFile> = aggregates
        .iter()
        .filter_map(AggregateOutcome::written)
        .cloned()
        .collect();

    let merge_outcome = merge(&written, &plan.final_output);

    let summary = RunSummary {
        aggregates,
        merge: merge_outcome,
        elapsed: start.elapsed(),
    };

    info!(
        written = summary.written().count(),
        empty = summary.empty_sources().count(),
        failed = summary.failed_sources().count(),
        output = %plan.final_output.display(),
        "build finished"
    );

    summary
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
