/*
 * render.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Render command implementation
 */

//! Render command implementation.
//!
//! Values are layered: registry examples (with `--examples`), then the
//! `--vars` file, then each `-V KEY=VALUE`. Shell options come from the
//! `--config` file; `--preview` forces the banner on.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use mailblocks::render::BareShell;
use mailblocks::variables::example_values;
use mailblocks::{
    LegacyShell, MarkupShell, RenderMode, RenderOptions, VariableValues, check_variables,
    render_with_shell,
};

use super::{read_template, write_output};
use crate::config::Config;

/// Arguments for the render command
#[derive(Debug, Default)]
pub struct RenderArgs {
    /// Template JSON file
    pub template: String,
    /// JSON file with variable values
    pub vars: Option<String>,
    /// KEY=VALUE overrides
    pub var: Vec<String>,
    pub examples: bool,
    pub preserve: bool,
    pub preview: bool,
    /// Content fragments only
    pub fragment: bool,
    /// TOML config file
    pub config: Option<String>,
    /// Output file path
    pub output: Option<String>,
}

/// Execute the render command
pub fn execute(args: RenderArgs) -> Result<()> {
    let template = read_template(&args.template)?;

    for diagnostic in check_variables(&template) {
        eprintln!("{}", diagnostic.to_text(None));
    }

    let config = match &args.config {
        Some(path) => Config::load(Path::new(path))?,
        None => Config::default(),
    };

    let mut values = if args.examples {
        example_values(&template)
    } else {
        VariableValues::new()
    };
    if let Some(path) = &args.vars {
        values.extend(read_values(path)?);
    }
    for assignment in &args.var {
        let (key, value) = parse_assignment(assignment)?;
        values.insert(key, value);
    }

    let mode = if args.preserve {
        RenderMode::Preserve
    } else {
        RenderMode::Substitute
    };
    let options = RenderOptions::new(mode)
        .with_preview(args.preview || config.preview)
        .with_shell(config.shell);
    let shell: &dyn MarkupShell = if args.fragment {
        &BareShell
    } else {
        &LegacyShell
    };

    let email = render_with_shell(&template, &values, &options, shell)
        .with_context(|| format!("Failed to render {}", args.template))?;

    if !email.unresolved.is_empty() {
        warn!(
            "Left {} variable(s) as tokens: {}",
            email.unresolved.len(),
            email.unresolved.join(", ")
        );
    }
    info!(subject = %email.subject, "Rendered {}", template.slug);

    write_output(args.output.as_deref(), &email.html)
}

fn read_values(path: &str) -> Result<VariableValues> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read values: {}", path))?;
    let values = serde_json::from_str(&json)
        .with_context(|| format!("Values file must be a JSON object of strings: {}", path))?;
    Ok(values)
}

/// Split `KEY=VALUE`. The value may itself contain `=`.
fn parse_assignment(assignment: &str) -> Result<(String, String)> {
    let Some((key, value)) = assignment.split_once('=') else {
        anyhow::bail!("Expected KEY=VALUE, got '{}'", assignment);
    };
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("Missing variable name in '{}'", assignment);
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write_template(dir: &Path) -> String {
        let path = dir.join("welcome.json");
        std::fs::write(
            &path,
            r#"{
  "slug": "welcome",
  "name": "Welcome",
  "subject": "Welcome, {{customer_name}}",
  "header": { "title": "Welcome aboard" },
  "blocks": [
    { "type": "greeting", "id": "hello", "nameVariable": "{{customer_name}}" },
    { "type": "button", "id": "go", "label": "Open portal", "urlVariable": "portal_url" }
  ],
  "variables": [
    { "name": "customer_name" },
    { "name": "portal_url", "kind": "url" }
  ]
}"#,
        )
        .unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("pay_url=https://x/y?a=b").unwrap(),
            ("pay_url".to_string(), "https://x/y?a=b".to_string())
        );
        assert!(parse_assignment("no_equals").is_err());
        assert!(parse_assignment("=value").is_err());
    }

    #[test]
    fn test_render_layers_values() {
        let dir = tempfile::tempdir().unwrap();
        let template = write_template(dir.path());
        let vars = dir.path().join("vars.json");
        std::fs::write(&vars, r#"{"customer_name": "Ann", "portal_url": "https://a"}"#).unwrap();
        let output = dir.path().join("out.html");

        execute(RenderArgs {
            template,
            vars: Some(vars.to_string_lossy().into_owned()),
            var: vec!["portal_url=https://b".to_string()],
            output: Some(output.to_string_lossy().into_owned()),
            ..RenderArgs::default()
        })
        .unwrap();

        let html = std::fs::read_to_string(output).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Hi Ann,"));
        assert!(html.contains("href=\"https://b\""));
    }

    #[test]
    fn test_fragment_preserve() {
        let dir = tempfile::tempdir().unwrap();
        let template = write_template(dir.path());
        let output = dir.path().join("fragment.html");

        execute(RenderArgs {
            template,
            var: vec!["customer_name=Ann".to_string()],
            preserve: true,
            fragment: true,
            output: Some(output.to_string_lossy().into_owned()),
            ..RenderArgs::default()
        })
        .unwrap();

        let html = std::fs::read_to_string(output).unwrap();
        assert!(html.starts_with("<p style="));
        assert!(html.contains("Hi {{customer_name}},"));
        assert!(html.contains("href=\"{{portal_url}}\""));
    }

    #[test]
    fn test_missing_template_fails() {
        let err = execute(RenderArgs {
            template: "does-not-exist.json".to_string(),
            ..RenderArgs::default()
        })
        .unwrap_err();
        assert!(err.to_string().contains("does-not-exist.json"));
    }
}
