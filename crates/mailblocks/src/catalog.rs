/*
 * catalog.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Catalog of system templates.
 *
 * System templates are the emails the platform itself sends. Each entry
 * names a slug, which doubles as the variable-registry context for that
 * email. The list is embedded at compile time.
 */

use crate::block::Block;
use crate::style::ColorScheme;
use crate::template::{Header, Template};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static SYSTEM_TEMPLATES: Lazy<Vec<SystemTemplate>> = Lazy::new(|| {
    let json = include_str!("../data/system_templates.json");
    serde_json::from_str(json).expect("Invalid system template catalog JSON")
});

/// A known system email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemTemplate {
    pub slug: String,
    pub name: String,
    pub description: String,
    /// Grouping shown in the template list (e.g. "billing").
    pub category: String,
    pub color_scheme: ColorScheme,
}

impl SystemTemplate {
    /// Build a minimal editable template for this entry.
    ///
    /// The result has a greeting and a placeholder paragraph, and passes
    /// [`Template::validate`].
    pub fn starter(&self) -> Template {
        Template::new(
            self.slug.clone(),
            self.name.clone(),
            self.name.clone(),
            Header::new(self.name.clone()),
        )
        .with_color_scheme(self.color_scheme)
        .with_blocks(vec![Block::greeting("greeting"), Block::paragraph("intro")])
    }
}

/// All system templates in catalog order.
pub fn system_templates() -> &'static [SystemTemplate] {
    &SYSTEM_TEMPLATES
}

pub fn find_system_template(slug: &str) -> Option<&'static SystemTemplate> {
    SYSTEM_TEMPLATES.iter().find(|t| t.slug == slug)
}

pub fn templates_in_category(category: &str) -> Vec<&'static SystemTemplate> {
    SYSTEM_TEMPLATES
        .iter()
        .filter(|t| t.category == category)
        .collect()
}

/// Distinct categories in first-seen order.
pub fn categories() -> Vec<&'static str> {
    let mut categories: Vec<&'static str> = Vec::new();
    for template in SYSTEM_TEMPLATES.iter() {
        if !categories.contains(&template.category.as_str()) {
            categories.push(template.category.as_str());
        }
    }
    categories
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::is_valid_slug;
    use crate::variables::variables_for_context;

    #[test]
    fn test_catalog_loads() {
        assert!(!system_templates().is_empty());
        let reminder = find_system_template("payment-reminder").unwrap();
        assert_eq!(reminder.category, "billing");
        assert!(find_system_template("missing").is_none());
    }

    #[test]
    fn test_slugs_are_valid_and_unique() {
        let mut seen = std::collections::HashSet::new();
        for template in system_templates() {
            assert!(is_valid_slug(&template.slug), "{}", template.slug);
            assert!(seen.insert(&template.slug));
        }
    }

    #[test]
    fn test_every_context_has_specific_variables() {
        // Wildcard variables alone would mean the slug is missing from the registry
        let wildcard_count = variables_for_context("no-such-context").len();
        for template in system_templates() {
            assert!(
                variables_for_context(&template.slug).len() > wildcard_count,
                "{} has no context-specific variables",
                template.slug
            );
        }
    }

    #[test]
    fn test_starter_templates_validate() {
        for template in system_templates() {
            let starter = template.starter();
            assert_eq!(starter.validate(), Ok(()));
            assert_eq!(starter.color_scheme, template.color_scheme);
        }
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            categories(),
            vec!["billing", "scheduling", "announcements", "marketing", "account"]
        );
        assert_eq!(templates_in_category("billing").len(), 3);
    }
}
