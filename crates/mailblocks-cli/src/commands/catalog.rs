/*
 * catalog.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Catalog command implementation.

use anyhow::Result;

use mailblocks::catalog::categories;
use mailblocks::{SystemTemplate, find_system_template, system_templates, templates_in_category};

/// Arguments for the catalog command
#[derive(Debug, Default)]
pub struct CatalogArgs {
    pub category: Option<String>,
    /// Slug whose starter template should be printed
    pub starter: Option<String>,
    pub json: bool,
}

/// Execute the catalog command
pub fn execute(args: CatalogArgs) -> Result<()> {
    if let Some(slug) = &args.starter {
        let Some(entry) = find_system_template(slug) else {
            anyhow::bail!("Unknown system template '{}'", slug);
        };
        println!("{}", serde_json::to_string_pretty(&entry.starter())?);
        return Ok(());
    }

    let entries: Vec<&SystemTemplate> = match &args.category {
        Some(category) => {
            let entries = templates_in_category(category);
            if entries.is_empty() {
                anyhow::bail!(
                    "Unknown category '{}' (expected one of: {})",
                    category,
                    categories().join(", ")
                );
            }
            entries
        }
        None => system_templates().iter().collect(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        print!("{}", format_entries(&entries));
    }
    Ok(())
}

fn format_entries(entries: &[&SystemTemplate]) -> String {
    let width = entries.iter().map(|t| t.slug.len()).max().unwrap_or(0);
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!(
            "{:<width$}  {:<13} {}\n",
            entry.slug,
            entry.category,
            entry.description,
            width = width
        ));
    }
    out
}
