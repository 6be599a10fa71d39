/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Render configuration file.
//!
//! ```toml
//! preview = true
//!
//! [shell]
//! company-name = "Sparkle & Shine Cleaning"
//! company-address = "12 Harbor Rd, Portland ME"
//! support-email = "help@sparkle.example"
//! ```

use anyhow::{Context, Result};
use mailblocks::ShellOptions;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    pub preview: bool,
    pub shell: ShellOptions,
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self> {
        let config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_shell_section() {
        let config = Config::from_toml(
            r#"
preview = true

[shell]
company-name = "Acme Cleaning"
support-email = "help@acme.example"
"#,
        )
        .unwrap();
        assert!(config.preview);
        assert_eq!(config.shell.company_name, "Acme Cleaning");
        assert_eq!(config.shell.support_email.as_deref(), Some("help@acme.example"));
        assert_eq!(config.shell.company_address, None);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(Config::from_toml("colour = \"red\"").is_err());
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mailblocks.toml");
        std::fs::write(&path, "preview = \"yes\"").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("mailblocks.toml"));
    }
}
