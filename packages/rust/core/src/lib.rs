//! Aggregation and merge logic for the rules assembler.
//!
//! This crate turns a [`BuildPlan`](rules_assembler_shared::BuildPlan) into
//! per-directory aggregate files and one final merged file.

pub mod aggregator;
pub mod merger;
pub mod output;
pub mod pipeline;
pub mod sections;
