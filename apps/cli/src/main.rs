//! rules-assembler CLI: build-time assembler for rule documents.
//!
//! Aggregates the Markdown documents of each configured source directory
//! into a per-directory file, then merges those into one final file.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
