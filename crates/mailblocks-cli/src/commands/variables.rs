/*
 * variables.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Variables command implementation.

use anyhow::Result;

use mailblocks::variables_by_category;

/// Arguments for the variables command
#[derive(Debug, Default)]
pub struct VariablesArgs {
    /// Template context to filter by
    pub context: Option<String>,
    pub json: bool,
}

/// Execute the variables command
pub fn execute(args: VariablesArgs) -> Result<()> {
    let groups = variables_by_category(args.context.as_deref());

    if args.json {
        let defs: Vec<_> = groups.iter().flat_map(|(_, defs)| defs.iter()).collect();
        println!("{}", serde_json::to_string_pretty(&defs)?);
        return Ok(());
    }

    print!("{}", format_groups(&groups));
    Ok(())
}

fn format_groups(
    groups: &[(
        mailblocks::VariableCategory,
        Vec<&'static mailblocks::VariableDefinition>,
    )],
) -> String {
    let width = groups
        .iter()
        .flat_map(|(_, defs)| defs.iter())
        .map(|def| def.token().len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for (category, defs) in groups {
        if defs.is_empty() {
            continue;
        }
        out.push_str(category.display_name());
        out.push('\n');
        for def in defs {
            out.push_str(&format!(
                "  {:<width$}  {} ({}), e.g. {}\n",
                def.token(),
                def.label,
                def.kind,
                def.example,
                width = width
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_groups_skips_empty_categories() {
        let groups = variables_by_category(Some("password-reset"));
        let text = format_groups(&groups);
        assert!(text.starts_with("Customer\n"));
        assert!(text.contains("{{reset_url}}"));
        assert!(!text.contains("{{amount_due}}"));
        assert!(!text.contains("Payment\n"));
    }
}
