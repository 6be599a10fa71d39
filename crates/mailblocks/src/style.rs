/*
 * style.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Color schemes, design tokens and inline style builders.
//!
//! Every block renderer styles its markup inline. The values here are the
//! legacy template conventions: a 600px content column, a system font stack
//! and six named color schemes.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the six named color schemes a template or block can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Blue,
    Green,
    Orange,
    Red,
    Purple,
    Gray,
}

impl ColorScheme {
    pub const ALL: [ColorScheme; 6] = [
        ColorScheme::Blue,
        ColorScheme::Green,
        ColorScheme::Orange,
        ColorScheme::Red,
        ColorScheme::Purple,
        ColorScheme::Gray,
    ];

    /// Get the lowercase identifier for this scheme.
    pub fn id(&self) -> &'static str {
        match self {
            ColorScheme::Blue => "blue",
            ColorScheme::Green => "green",
            ColorScheme::Orange => "orange",
            ColorScheme::Red => "red",
            ColorScheme::Purple => "purple",
            ColorScheme::Gray => "gray",
        }
    }

    /// Parse a scheme from its identifier.
    ///
    /// Matching is exact; `"Blue"` is rejected just like `"teal"`.
    pub fn from_id(id: &str) -> Result<Self, ModelError> {
        match id {
            "blue" => Ok(ColorScheme::Blue),
            "green" => Ok(ColorScheme::Green),
            "orange" => Ok(ColorScheme::Orange),
            "red" => Ok(ColorScheme::Red),
            "purple" => Ok(ColorScheme::Purple),
            "gray" => Ok(ColorScheme::Gray),
            other => Err(ModelError::UnknownColorScheme(other.to_string())),
        }
    }

    /// Resolve the concrete colors for this scheme.
    pub fn palette(&self) -> Palette {
        match self {
            ColorScheme::Blue => Palette {
                primary: "#2563eb",
                primary_dark: "#1d4ed8",
                light: "#eff6ff",
                border: "#bfdbfe",
                text: "#1e3a8a",
            },
            ColorScheme::Green => Palette {
                primary: "#16a34a",
                primary_dark: "#15803d",
                light: "#f0fdf4",
                border: "#bbf7d0",
                text: "#14532d",
            },
            ColorScheme::Orange => Palette {
                primary: "#ea580c",
                primary_dark: "#c2410c",
                light: "#fff7ed",
                border: "#fed7aa",
                text: "#7c2d12",
            },
            ColorScheme::Red => Palette {
                primary: "#dc2626",
                primary_dark: "#b91c1c",
                light: "#fef2f2",
                border: "#fecaca",
                text: "#7f1d1d",
            },
            ColorScheme::Purple => Palette {
                primary: "#9333ea",
                primary_dark: "#7e22ce",
                light: "#faf5ff",
                border: "#e9d5ff",
                text: "#581c87",
            },
            ColorScheme::Gray => Palette {
                primary: "#4b5563",
                primary_dark: "#374151",
                light: "#f9fafb",
                border: "#e5e7eb",
                text: "#111827",
            },
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for ColorScheme {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColorScheme::from_id(s)
    }
}

/// Resolved colors of a [`ColorScheme`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Header background, button fill, link color.
    pub primary: &'static str,
    /// Button border.
    pub primary_dark: &'static str,
    /// Tinted panel background (info boxes, code).
    pub light: &'static str,
    /// Tinted panel border.
    pub border: &'static str,
    /// Text drawn on the tinted panel.
    pub text: &'static str,
}

/// Typography, spacing and neutral color tokens.
pub mod tokens {
    pub const FONT_FAMILY: &str =
        "-apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Helvetica, Arial, sans-serif";
    pub const MONO_FONT_FAMILY: &str = "'SFMono-Regular', Menlo, Consolas, monospace";

    pub const FONT_SIZE_SMALL: &str = "14px";
    pub const FONT_SIZE_BASE: &str = "16px";
    pub const FONT_SIZE_H3: &str = "18px";
    pub const FONT_SIZE_H2: &str = "20px";
    pub const FONT_SIZE_H1: &str = "24px";
    pub const FONT_SIZE_CODE: &str = "28px";
    pub const FONT_SIZE_EMOJI: &str = "40px";
    pub const LINE_HEIGHT: &str = "1.6";

    pub const SPACE_XS: &str = "4px";
    pub const SPACE_SM: &str = "8px";
    pub const SPACE_MD: &str = "16px";
    pub const SPACE_LG: &str = "24px";
    pub const SPACE_XL: &str = "32px";

    pub const RADIUS: &str = "6px";
    pub const RADIUS_LG: &str = "8px";

    pub const TEXT: &str = "#1f2937";
    pub const TEXT_MUTED: &str = "#6b7280";
    pub const PAGE_BACKGROUND: &str = "#f3f4f6";
    pub const SURFACE: &str = "#ffffff";
    pub const DIVIDER: &str = "#e5e7eb";
    pub const ON_PRIMARY: &str = "#ffffff";

    /// Width of the content column, in pixels.
    pub const CONTENT_WIDTH: u32 = 600;
}

/// Ordered inline style declarations.
///
/// Declarations are emitted in insertion order, so the same builder calls
/// always produce the same attribute text.
///
/// ```
/// use mailblocks::style::Style;
///
/// let style = Style::new().prop("margin", "0").prop("color", "#1f2937");
/// assert_eq!(style.to_string(), "margin: 0; color: #1f2937;");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    declarations: Vec<(&'static str, String)>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prop(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.declarations.push((name, value.into()));
        self
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.declarations.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}: {};", name, value)?;
        }
        Ok(())
    }
}

/// Base text style shared by paragraphs, greetings and list items.
pub fn body_text() -> Style {
    Style::new()
        .prop("margin", format!("0 0 {}", tokens::SPACE_MD))
        .prop("font-family", tokens::FONT_FAMILY)
        .prop("font-size", tokens::FONT_SIZE_BASE)
        .prop("line-height", tokens::LINE_HEIGHT)
        .prop("color", tokens::TEXT)
}

/// Muted small text used for captions and footers.
pub fn muted_text() -> Style {
    Style::new()
        .prop("margin", "0")
        .prop("font-family", tokens::FONT_FAMILY)
        .prop("font-size", tokens::FONT_SIZE_SMALL)
        .prop("line-height", tokens::LINE_HEIGHT)
        .prop("color", tokens::TEXT_MUTED)
}

/// Escape HTML special characters.
pub fn escape_html(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#39;".to_string(),
            _ => c.to_string(),
        })
        .collect()
}
