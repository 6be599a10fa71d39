/*
 * block.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Block model.
//!
//! An email body is an ordered list of [`Block`]s. The union is closed: the
//! renderer, the code generator and the importer all match on every variant
//! without a wildcard arm, so adding a variant fails to compile until each of
//! them handles it.
//!
//! Blocks are value objects. They never reference each other, and an edit
//! replaces a block wholesale at its position.

use crate::error::ModelError;
use crate::style::ColorScheme;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a block within a template.
///
/// Ids are supplied by the caller (the editor, the importer); nothing in this
/// crate generates them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for BlockId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A single typed content unit of an email body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Block {
    /// `Hi {{name}},`
    Greeting(GreetingBlock),
    Paragraph(ParagraphBlock),
    /// Tinted label/value panel (amounts, dates, references).
    InfoBox(InfoBoxBlock),
    /// Call-to-action button.
    Button(ButtonBlock),
    /// Numbered steps with a title and description each.
    StepList(StepListBlock),
    /// Large monospace code (verification or discount codes).
    Code(CodeBlock),
    /// Inline attachment referenced by content id.
    Image(ImageBlock),
    Divider(DividerBlock),
    Spacer(SpacerBlock),
    Heading(HeadingBlock),
    List(ListBlock),
    /// Inline text link.
    Link(LinkBlock),
    /// Raw markup inserted as-is.
    CustomHtml(CustomHtmlBlock),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GreetingBlock {
    pub id: BlockId,
    /// Either a bare variable name (`customer_name`) or a token (`{{customer_name}}`).
    pub name_variable: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphBlock {
    pub id: BlockId,
    /// Paragraph text. Inline markup (`<strong>`, `<em>`, `<br>`) is passed through.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoBoxBlock {
    pub id: BlockId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub items: Vec<InfoItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_scheme: Option<ColorScheme>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoItem {
    pub label: String,
    pub value: String,
}

impl InfoItem {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonBlock {
    pub id: BlockId,
    pub label: String,
    /// Name of the variable holding the target URL.
    pub url_variable: String,
    /// Overrides the template's scheme when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_scheme: Option<ColorScheme>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepListBlock {
    pub id: BlockId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub title: String,
    pub description: String,
}

impl Step {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeBlock {
    pub id: BlockId,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageBlock {
    pub id: BlockId,
    /// Attachment content id; rendered as `cid:<content_id>`.
    pub content_id: String,
    pub alt: String,
    /// Display width in pixels, at most the content width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
}

impl ImageBlock {
    /// Whether the content id is a bare attachment name.
    ///
    /// Content ids are literal. URLs, `cid:` prefixes and `{{name}}` tokens
    /// are all rejected.
    pub fn has_bare_content_id(&self) -> bool {
        is_bare_content_id(&self.content_id)
    }
}

pub(crate) fn is_bare_content_id(content_id: &str) -> bool {
    !content_id.is_empty()
        && content_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '@'))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividerBlock {
    pub id: BlockId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpacerBlock {
    pub id: BlockId,
    /// Height in pixels.
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadingBlock {
    pub id: BlockId,
    pub text: String,
    /// Heading level, 1 to 3.
    #[serde(default = "default_heading_level")]
    pub level: u8,
}

fn default_heading_level() -> u8 {
    2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBlock {
    pub id: BlockId,
    pub items: Vec<String>,
    #[serde(default)]
    pub ordered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkBlock {
    pub id: BlockId,
    pub text: String,
    pub url_variable: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_scheme: Option<ColorScheme>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomHtmlBlock {
    pub id: BlockId,
    pub html: String,
}

/// Discriminant of a [`Block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    Greeting,
    Paragraph,
    InfoBox,
    Button,
    StepList,
    Code,
    Image,
    Divider,
    Spacer,
    Heading,
    List,
    Link,
    CustomHtml,
}

impl BlockKind {
    pub const ALL: [BlockKind; 13] = [
        BlockKind::Greeting,
        BlockKind::Paragraph,
        BlockKind::InfoBox,
        BlockKind::Button,
        BlockKind::StepList,
        BlockKind::Code,
        BlockKind::Image,
        BlockKind::Divider,
        BlockKind::Spacer,
        BlockKind::Heading,
        BlockKind::List,
        BlockKind::Link,
        BlockKind::CustomHtml,
    ];

    /// The `type` discriminant used in serialized blocks.
    pub fn id(&self) -> &'static str {
        match self {
            BlockKind::Greeting => "greeting",
            BlockKind::Paragraph => "paragraph",
            BlockKind::InfoBox => "info-box",
            BlockKind::Button => "button",
            BlockKind::StepList => "step-list",
            BlockKind::Code => "code",
            BlockKind::Image => "image",
            BlockKind::Divider => "divider",
            BlockKind::Spacer => "spacer",
            BlockKind::Heading => "heading",
            BlockKind::List => "list",
            BlockKind::Link => "link",
            BlockKind::CustomHtml => "custom-html",
        }
    }

    /// Name shown in the block palette.
    pub fn display_name(&self) -> &'static str {
        match self {
            BlockKind::Greeting => "Greeting",
            BlockKind::Paragraph => "Paragraph",
            BlockKind::InfoBox => "Info Box",
            BlockKind::Button => "Button",
            BlockKind::StepList => "Step List",
            BlockKind::Code => "Code",
            BlockKind::Image => "Image",
            BlockKind::Divider => "Divider",
            BlockKind::Spacer => "Spacer",
            BlockKind::Heading => "Heading",
            BlockKind::List => "List",
            BlockKind::Link => "Link",
            BlockKind::CustomHtml => "Custom HTML",
        }
    }

    pub fn from_id(id: &str) -> Result<Self, ModelError> {
        BlockKind::ALL
            .into_iter()
            .find(|kind| kind.id() == id)
            .ok_or_else(|| ModelError::UnknownBlockKind(id.to_string()))
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A content-bearing field of a block, as seen by variable scanners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockField<'a> {
    /// Free text that may contain `{{name}}` tokens.
    Text(&'static str, &'a str),
    /// A field that names a single variable (bare name or token form).
    Variable(&'static str, &'a str),
}

impl Block {
    pub fn greeting(id: impl Into<BlockId>) -> Self {
        Block::Greeting(GreetingBlock {
            id: id.into(),
            name_variable: "{{customer_name}}".to_string(),
        })
    }

    pub fn paragraph(id: impl Into<BlockId>) -> Self {
        Block::Paragraph(ParagraphBlock {
            id: id.into(),
            text: "Add your message here.".to_string(),
        })
    }

    pub fn info_box(id: impl Into<BlockId>) -> Self {
        Block::InfoBox(InfoBoxBlock {
            id: id.into(),
            title: Some("Details".to_string()),
            items: vec![InfoItem::new("Reference", "{{invoice_number}}")],
            color_scheme: None,
        })
    }

    pub fn button(id: impl Into<BlockId>) -> Self {
        Block::Button(ButtonBlock {
            id: id.into(),
            label: "View Details".to_string(),
            url_variable: "action_url".to_string(),
            color_scheme: None,
        })
    }

    pub fn step_list(id: impl Into<BlockId>) -> Self {
        Block::StepList(StepListBlock {
            id: id.into(),
            title: Some("What happens next".to_string()),
            steps: vec![
                Step::new("Step one", "Describe the first step."),
                Step::new("Step two", "Describe the second step."),
            ],
        })
    }

    pub fn code(id: impl Into<BlockId>) -> Self {
        Block::Code(CodeBlock {
            id: id.into(),
            code: "{{verification_code}}".to_string(),
            label: Some("Your code".to_string()),
        })
    }

    pub fn image(id: impl Into<BlockId>) -> Self {
        Block::Image(ImageBlock {
            id: id.into(),
            content_id: "company_logo".to_string(),
            alt: "Company logo".to_string(),
            width: None,
        })
    }

    pub fn divider(id: impl Into<BlockId>) -> Self {
        Block::Divider(DividerBlock { id: id.into() })
    }

    pub fn spacer(id: impl Into<BlockId>) -> Self {
        Block::Spacer(SpacerBlock {
            id: id.into(),
            height: 24,
        })
    }

    pub fn heading(id: impl Into<BlockId>) -> Self {
        Block::Heading(HeadingBlock {
            id: id.into(),
            text: "Section heading".to_string(),
            level: default_heading_level(),
        })
    }

    pub fn list(id: impl Into<BlockId>) -> Self {
        Block::List(ListBlock {
            id: id.into(),
            items: vec!["First item".to_string(), "Second item".to_string()],
            ordered: false,
        })
    }

    pub fn link(id: impl Into<BlockId>) -> Self {
        Block::Link(LinkBlock {
            id: id.into(),
            text: "Learn more".to_string(),
            url_variable: "portal_url".to_string(),
            color_scheme: None,
        })
    }

    pub fn custom_html(id: impl Into<BlockId>) -> Self {
        Block::CustomHtml(CustomHtmlBlock {
            id: id.into(),
            html: "<p>Custom content</p>".to_string(),
        })
    }

    /// Create a block of the given kind with its default content.
    pub fn new_default(kind: BlockKind, id: impl Into<BlockId>) -> Self {
        match kind {
            BlockKind::Greeting => Block::greeting(id),
            BlockKind::Paragraph => Block::paragraph(id),
            BlockKind::InfoBox => Block::info_box(id),
            BlockKind::Button => Block::button(id),
            BlockKind::StepList => Block::step_list(id),
            BlockKind::Code => Block::code(id),
            BlockKind::Image => Block::image(id),
            BlockKind::Divider => Block::divider(id),
            BlockKind::Spacer => Block::spacer(id),
            BlockKind::Heading => Block::heading(id),
            BlockKind::List => Block::list(id),
            BlockKind::Link => Block::link(id),
            BlockKind::CustomHtml => Block::custom_html(id),
        }
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Greeting(_) => BlockKind::Greeting,
            Block::Paragraph(_) => BlockKind::Paragraph,
            Block::InfoBox(_) => BlockKind::InfoBox,
            Block::Button(_) => BlockKind::Button,
            Block::StepList(_) => BlockKind::StepList,
            Block::Code(_) => BlockKind::Code,
            Block::Image(_) => BlockKind::Image,
            Block::Divider(_) => BlockKind::Divider,
            Block::Spacer(_) => BlockKind::Spacer,
            Block::Heading(_) => BlockKind::Heading,
            Block::List(_) => BlockKind::List,
            Block::Link(_) => BlockKind::Link,
            Block::CustomHtml(_) => BlockKind::CustomHtml,
        }
    }

    pub fn id(&self) -> &BlockId {
        match self {
            Block::Greeting(b) => &b.id,
            Block::Paragraph(b) => &b.id,
            Block::InfoBox(b) => &b.id,
            Block::Button(b) => &b.id,
            Block::StepList(b) => &b.id,
            Block::Code(b) => &b.id,
            Block::Image(b) => &b.id,
            Block::Divider(b) => &b.id,
            Block::Spacer(b) => &b.id,
            Block::Heading(b) => &b.id,
            Block::List(b) => &b.id,
            Block::Link(b) => &b.id,
            Block::CustomHtml(b) => &b.id,
        }
    }

    /// Return a copy of this block under a different id.
    pub fn with_id(&self, id: impl Into<BlockId>) -> Self {
        let id = id.into();
        let mut block = self.clone();
        match &mut block {
            Block::Greeting(b) => b.id = id,
            Block::Paragraph(b) => b.id = id,
            Block::InfoBox(b) => b.id = id,
            Block::Button(b) => b.id = id,
            Block::StepList(b) => b.id = id,
            Block::Code(b) => b.id = id,
            Block::Image(b) => b.id = id,
            Block::Divider(b) => b.id = id,
            Block::Spacer(b) => b.id = id,
            Block::Heading(b) => b.id = id,
            Block::List(b) => b.id = id,
            Block::Link(b) => b.id = id,
            Block::CustomHtml(b) => b.id = id,
        }
        block
    }

    /// Content-bearing fields in rendering order.
    pub fn fields(&self) -> Vec<BlockField<'_>> {
        match self {
            Block::Greeting(b) => vec![BlockField::Variable("nameVariable", &b.name_variable)],
            Block::Paragraph(b) => vec![BlockField::Text("text", &b.text)],
            Block::InfoBox(b) => {
                let mut fields = Vec::with_capacity(1 + b.items.len() * 2);
                if let Some(title) = &b.title {
                    fields.push(BlockField::Text("title", title));
                }
                for item in &b.items {
                    fields.push(BlockField::Text("items.label", &item.label));
                    fields.push(BlockField::Text("items.value", &item.value));
                }
                fields
            }
            Block::Button(b) => vec![
                BlockField::Text("label", &b.label),
                BlockField::Variable("urlVariable", &b.url_variable),
            ],
            Block::StepList(b) => {
                let mut fields = Vec::with_capacity(1 + b.steps.len() * 2);
                if let Some(title) = &b.title {
                    fields.push(BlockField::Text("title", title));
                }
                for step in &b.steps {
                    fields.push(BlockField::Text("steps.title", &step.title));
                    fields.push(BlockField::Text("steps.description", &step.description));
                }
                fields
            }
            Block::Code(b) => {
                let mut fields = Vec::with_capacity(2);
                if let Some(label) = &b.label {
                    fields.push(BlockField::Text("label", label));
                }
                fields.push(BlockField::Text("code", &b.code));
                fields
            }
            Block::Image(b) => vec![BlockField::Text("alt", &b.alt)],
            Block::Divider(_) => Vec::new(),
            Block::Spacer(_) => Vec::new(),
            Block::Heading(b) => vec![BlockField::Text("text", &b.text)],
            Block::List(b) => b
                .items
                .iter()
                .map(|item| BlockField::Text("items", item))
                .collect(),
            Block::Link(b) => vec![
                BlockField::Text("text", &b.text),
                BlockField::Variable("urlVariable", &b.url_variable),
            ],
            Block::CustomHtml(b) => vec![BlockField::Text("html", &b.html)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_a_default_with_matching_kind_and_id() {
        for (i, kind) in BlockKind::ALL.into_iter().enumerate() {
            let id = format!("block-{}", i);
            let block = Block::new_default(kind, id.as_str());
            assert_eq!(block.kind(), kind);
            assert_eq!(block.id().as_str(), id);
        }
    }

    #[test]
    fn test_defaults_are_non_empty() {
        for kind in BlockKind::ALL {
            let block = Block::new_default(kind, "x");
            for field in block.fields() {
                let (BlockField::Text(name, value) | BlockField::Variable(name, value)) = field;
                assert!(!value.is_empty(), "{} default has empty {}", kind, name);
            }
        }
    }

    #[test]
    fn test_kind_ids_round_trip() {
        for kind in BlockKind::ALL {
            assert_eq!(BlockKind::from_id(kind.id()).unwrap(), kind);
        }
        assert!(matches!(
            BlockKind::from_id("carousel"),
            Err(ModelError::UnknownBlockKind(_))
        ));
    }

    #[test]
    fn test_serialized_type_tag_matches_kind_id() {
        for kind in BlockKind::ALL {
            let json = serde_json::to_value(Block::new_default(kind, "b")).unwrap();
            assert_eq!(json["type"], kind.id());
            assert_eq!(json["id"], "b");
        }
    }

    #[test]
    fn test_button_json_shape() {
        let json = r#"{"type":"button","id":"pay","label":"Pay Now","urlVariable":"pay_url","colorScheme":"green"}"#;
        let block: Block = serde_json::from_str(json).unwrap();
        match block {
            Block::Button(b) => {
                assert_eq!(b.label, "Pay Now");
                assert_eq!(b.url_variable, "pay_url");
                assert_eq!(b.color_scheme, Some(ColorScheme::Green));
            }
            other => panic!("expected button, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_block_type_rejected() {
        let json = r#"{"type":"carousel","id":"c1"}"#;
        assert!(serde_json::from_str::<Block>(json).is_err());
    }

    #[test]
    fn test_with_id_keeps_content() {
        let original = Block::button("a");
        let copy = original.with_id("b");
        assert_eq!(copy.id().as_str(), "b");
        assert_eq!(copy.fields(), original.fields());
    }
}
