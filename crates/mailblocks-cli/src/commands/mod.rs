//! Command implementations for the mailblocks CLI
//!
//! Each command module handles the CLI interface and delegates to the
//! `mailblocks` crate for the actual work. File I/O happens only here.

pub mod catalog;
pub mod generate;
pub mod import;
pub mod new_block;
pub mod render;
pub mod variables;

use anyhow::{Context, Result};
use mailblocks::Template;
use std::path::Path;

/// Read and validate a template JSON file.
pub fn read_template(path: &str) -> Result<Template> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read template: {}", path))?;
    let template =
        Template::from_json(&json).with_context(|| format!("Invalid template: {}", path))?;
    Ok(template)
}

/// Write `content` to `output`, or to stdout when no path is given.
pub fn write_output(output: Option<&str>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(Path::new(path), content)
                .with_context(|| format!("Failed to write output: {}", path))?;
            tracing::info!("Wrote {}", path);
        }
        None => {
            print!("{}", content);
            if !content.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}
