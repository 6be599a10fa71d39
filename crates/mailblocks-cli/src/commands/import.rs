/*
 * import.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Import command implementation
 */

//! Import command implementation.
//!
//! Diagnostics go to stderr with source excerpts. The template JSON (or with
//! `--json`, the whole import result) goes to stdout or `-o`. Any import
//! error makes the command fail after the diagnostics have been printed.

use anyhow::{Context, Result};
use tracing::info;

use mailblocks::parse;
use mailblocks_diagnostics::SourceFile;

use super::write_output;

/// Arguments for the import command
#[derive(Debug, Default)]
pub struct ImportArgs {
    /// Legacy module path
    pub input: String,
    /// Output file path
    pub output: Option<String>,
    /// Emit the full result as JSON
    pub json: bool,
}

/// Execute the import command
pub fn execute(args: ImportArgs) -> Result<()> {
    let source = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input))?;

    let result = parse(&source);
    for diagnostic in result.diagnostics() {
        eprintln!(
            "{}",
            diagnostic.to_text(Some(SourceFile::new(&args.input, &source)))
        );
    }

    if args.json {
        let json = serde_json::to_string_pretty(&result)?;
        write_output(args.output.as_deref(), &json)?;
    } else if let Some(template) = &result.template {
        let json = serde_json::to_string_pretty(template)?;
        write_output(args.output.as_deref(), &json)?;
    }

    if !result.is_ok() {
        anyhow::bail!(
            "{} could not be imported: {} error(s)",
            args.input,
            result.errors.len()
        );
    }

    info!(
        warnings = result.warnings.len(),
        "Imported {}",
        args.input
    );
    Ok(())
}
