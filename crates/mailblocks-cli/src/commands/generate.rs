/*
 * generate.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Generate command implementation.

use anyhow::{Context, Result};

use mailblocks::generate;

use super::{read_template, write_output};

/// Arguments for the generate command
#[derive(Debug, Default)]
pub struct GenerateArgs {
    /// Template JSON file
    pub template: String,
    /// Output file path
    pub output: Option<String>,
}

/// Execute the generate command
pub fn execute(args: GenerateArgs) -> Result<()> {
    let template = read_template(&args.template)?;
    let source = generate(&template)
        .with_context(|| format!("Failed to generate module for {}", template.slug))?;
    write_output(args.output.as_deref(), &source)
}
