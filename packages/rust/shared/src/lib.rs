//! Shared types, error model, and configuration for the rules assembler.
//!
//! This crate is the foundation depended on by the other workspace crates.
//! It provides:
//! - [`AssemblerError`], the unified error type
//! - Domain types ([`SourceSpec`], [`AggregateFile`], the outcome enums)
//! - Configuration ([`AppConfig`], [`BuildPlan`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BuildPlan, CONFIG_FILE_NAME, DEFAULT_EXTENSION, DEFAULT_OUTPUT_DIR, DefaultsConfig,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{AssemblerError, Result};
pub use types::{
    AggregateFile, AggregateOutcome, MergeOutcome, MergeReport, SourceSpec,
    source_name_from_path,
};
