/*
 * template.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template envelope: identity, subject, header, footer, blocks and declared variables.

use crate::block::{Block, BlockId};
use crate::error::ModelError;
use crate::style::ColorScheme;
use crate::variables::{VariableKind, is_valid_identifier};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("valid slug regex"));

/// Check whether `slug` is lowercase kebab-case.
pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_RE.is_match(slug)
}

/// The top-level email template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Stable identifier. Must not change once the template has recorded uses.
    pub slug: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub subject: String,
    /// Hidden inbox preview text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preheader: Option<String>,
    #[serde(default)]
    pub color_scheme: ColorScheme,
    pub header: Header,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub footer: Footer,
    #[serde(default)]
    pub variables: Vec<VariableDeclaration>,
    /// Registry context used for variable checks. Defaults to the slug.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

impl Header {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            emoji: None,
            title: title.into(),
            subtitle: None,
        }
    }

    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }
}

/// Which footer the markup shell draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FooterKind {
    /// Company name, address, support contact and note.
    #[default]
    Standard,
    /// Company name only.
    Minimal,
    /// No footer row.
    None,
}

impl FooterKind {
    pub fn id(&self) -> &'static str {
        match self {
            FooterKind::Standard => "standard",
            FooterKind::Minimal => "minimal",
            FooterKind::None => "none",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "standard" => Some(FooterKind::Standard),
            "minimal" => Some(FooterKind::Minimal),
            "none" => Some(FooterKind::None),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Footer {
    #[serde(default)]
    pub kind: FooterKind,
    /// Template-specific line shown above the company details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Footer {
    pub fn new(kind: FooterKind) -> Self {
        Self { kind, note: None }
    }
}

/// A variable the template declares in its data shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDeclaration {
    pub name: String,
    #[serde(default)]
    pub kind: VariableKind,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

impl VariableDeclaration {
    pub fn new(name: impl Into<String>, kind: VariableKind) -> Self {
        Self {
            name: name.into(),
            kind,
            optional: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

impl Template {
    /// Create a template with the required fields and everything else defaulted.
    pub fn new(
        slug: impl Into<String>,
        name: impl Into<String>,
        subject: impl Into<String>,
        header: Header,
    ) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            description: None,
            subject: subject.into(),
            preheader: None,
            color_scheme: ColorScheme::default(),
            header,
            blocks: Vec::new(),
            footer: Footer::default(),
            variables: Vec::new(),
            context: None,
        }
    }

    pub fn with_blocks(mut self, blocks: Vec<Block>) -> Self {
        self.blocks = blocks;
        self
    }

    pub fn with_color_scheme(mut self, scheme: ColorScheme) -> Self {
        self.color_scheme = scheme;
        self
    }

    pub fn with_preheader(mut self, preheader: impl Into<String>) -> Self {
        self.preheader = Some(preheader.into());
        self
    }

    pub fn with_variables(mut self, variables: Vec<VariableDeclaration>) -> Self {
        self.variables = variables;
        self
    }

    /// Parse a template from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, TemplateLoadError> {
        let template: Template = serde_json::from_str(json)?;
        template.validate()?;
        Ok(template)
    }

    /// Registry context for variable checks.
    pub fn context(&self) -> &str {
        self.context.as_deref().unwrap_or(&self.slug)
    }

    /// Check the construction invariants.
    pub fn validate(&self) -> Result<(), ModelError> {
        if !is_valid_slug(&self.slug) {
            return Err(ModelError::InvalidSlug(self.slug.clone()));
        }
        if self.name.trim().is_empty() {
            return Err(ModelError::EmptyField { field: "name" });
        }
        if self.subject.trim().is_empty() {
            return Err(ModelError::EmptyField { field: "subject" });
        }
        if self.header.title.trim().is_empty() {
            return Err(ModelError::EmptyField {
                field: "header.title",
            });
        }

        let mut seen = HashSet::new();
        for (index, block) in self.blocks.iter().enumerate() {
            let id = block.id().as_str();
            if id.is_empty() {
                return Err(ModelError::EmptyBlockId { index });
            }
            if !seen.insert(id) {
                return Err(ModelError::DuplicateBlockId(id.to_string()));
            }
        }

        for declaration in &self.variables {
            if !is_valid_identifier(&declaration.name) {
                return Err(ModelError::InvalidVariableName(declaration.name.clone()));
            }
        }

        Ok(())
    }

    pub fn declares(&self, name: &str) -> bool {
        self.variables.iter().any(|v| v.name == name)
    }

    pub fn block(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id().as_str() == id)
    }

    pub fn block_position(&self, id: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.id().as_str() == id)
    }

    /// Insert `block` at `index`, shifting later blocks down.
    pub fn insert_block(&mut self, index: usize, block: Block) -> Result<(), ModelError> {
        if index > self.blocks.len() {
            return Err(ModelError::InvalidBlockPosition {
                index,
                len: self.blocks.len(),
            });
        }
        self.ensure_unused_id(block.id())?;
        self.blocks.insert(index, block);
        Ok(())
    }

    pub fn push_block(&mut self, block: Block) -> Result<(), ModelError> {
        self.insert_block(self.blocks.len(), block)
    }

    /// Replace the block with the same id, keeping its position.
    pub fn replace_block(&mut self, block: Block) -> Result<Block, ModelError> {
        let index = self
            .block_position(block.id().as_str())
            .ok_or_else(|| ModelError::BlockNotFound(block.id().to_string()))?;
        Ok(std::mem::replace(&mut self.blocks[index], block))
    }

    /// Move the block with `id` so that it ends up at `to`.
    pub fn move_block(&mut self, id: &str, to: usize) -> Result<(), ModelError> {
        let from = self
            .block_position(id)
            .ok_or_else(|| ModelError::BlockNotFound(id.to_string()))?;
        if to >= self.blocks.len() {
            return Err(ModelError::InvalidBlockPosition {
                index: to,
                len: self.blocks.len(),
            });
        }
        let block = self.blocks.remove(from);
        self.blocks.insert(to, block);
        Ok(())
    }

    pub fn remove_block(&mut self, id: &str) -> Result<Block, ModelError> {
        let index = self
            .block_position(id)
            .ok_or_else(|| ModelError::BlockNotFound(id.to_string()))?;
        Ok(self.blocks.remove(index))
    }

    fn ensure_unused_id(&self, id: &BlockId) -> Result<(), ModelError> {
        if id.as_str().is_empty() {
            return Err(ModelError::EmptyBlockId {
                index: self.blocks.len(),
            });
        }
        if self.block(id.as_str()).is_some() {
            return Err(ModelError::DuplicateBlockId(id.to_string()));
        }
        Ok(())
    }
}

/// Failure to load a template from JSON.
#[derive(Debug, thiserror::Error)]
pub enum TemplateLoadError {
    #[error("Invalid template JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] ModelError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Template {
        Template::new(
            "payment-reminder",
            "Payment Reminder",
            "Invoice {{invoice_number}} is due",
            Header::new("Payment due").with_emoji("💳"),
        )
        .with_blocks(vec![
            Block::greeting("g"),
            Block::paragraph("p"),
            Block::button("b"),
        ])
    }

    fn ids(template: &Template) -> Vec<&str> {
        template.blocks.iter().map(|b| b.id().as_str()).collect()
    }

    #[test]
    fn test_valid_template_passes() {
        assert_eq!(sample().validate(), Ok(()));
    }

    #[test]
    fn test_slug_rules() {
        assert!(is_valid_slug("payment-reminder"));
        assert!(is_valid_slug("welcome2"));
        assert!(!is_valid_slug("Payment-Reminder"));
        assert!(!is_valid_slug("payment--reminder"));
        assert!(!is_valid_slug("-payment"));
        assert!(!is_valid_slug(""));
    }

    #[test]
    fn test_empty_subject_rejected() {
        let mut template = sample();
        template.subject = "  ".to_string();
        assert_eq!(
            template.validate(),
            Err(ModelError::EmptyField { field: "subject" })
        );
    }

    #[test]
    fn test_duplicate_block_ids_rejected() {
        let mut template = sample();
        template.blocks.push(Block::divider("p"));
        assert_eq!(
            template.validate(),
            Err(ModelError::DuplicateBlockId("p".to_string()))
        );
    }

    #[test]
    fn test_insert_and_move_blocks() {
        let mut template = sample();
        template.insert_block(1, Block::divider("d")).unwrap();
        assert_eq!(ids(&template), vec!["g", "d", "p", "b"]);

        template.move_block("b", 0).unwrap();
        assert_eq!(ids(&template), vec!["b", "g", "d", "p"]);

        assert_eq!(
            template.insert_block(9, Block::spacer("s")),
            Err(ModelError::InvalidBlockPosition { index: 9, len: 4 })
        );
        assert_eq!(
            template.push_block(Block::spacer("g")),
            Err(ModelError::DuplicateBlockId("g".to_string()))
        );
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut template = sample();
        let mut replacement = Block::paragraph("p");
        if let Block::Paragraph(p) = &mut replacement {
            p.text = "Updated".to_string();
        }
        let old = template.replace_block(replacement.clone()).unwrap();
        assert_eq!(old, Block::paragraph("p"));
        assert_eq!(template.blocks[1], replacement);
        assert!(template.replace_block(Block::paragraph("missing")).is_err());
    }

    #[test]
    fn test_remove_block() {
        let mut template = sample();
        let removed = template.remove_block("g").unwrap();
        assert_eq!(removed.id().as_str(), "g");
        assert_eq!(ids(&template), vec!["p", "b"]);
    }

    #[test]
    fn test_from_json_rejects_unknown_scheme() {
        let json = r#"{
            "slug": "welcome",
            "name": "Welcome",
            "subject": "Welcome!",
            "colorScheme": "teal",
            "header": {"title": "Hello"}
        }"#;
        assert!(matches!(
            Template::from_json(json),
            Err(TemplateLoadError::Json(_))
        ));
    }

    #[test]
    fn test_from_json_defaults() {
        let json = r#"{
            "slug": "welcome",
            "name": "Welcome",
            "subject": "Welcome!",
            "header": {"title": "Hello"}
        }"#;
        let template = Template::from_json(json).unwrap();
        assert_eq!(template.color_scheme, ColorScheme::Blue);
        assert_eq!(template.footer.kind, FooterKind::Standard);
        assert_eq!(template.context(), "welcome");
        assert!(template.blocks.is_empty());
    }
}
