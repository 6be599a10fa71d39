/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for template construction and rendering.

use mailblocks_diagnostics::{DiagnosticMessage, DiagnosticMessageBuilder};
use thiserror::Error;

/// Errors raised at the template-construction boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Color scheme outside the six named schemes.
    #[error("Unknown color scheme: {0}")]
    UnknownColorScheme(String),

    /// Block type discriminant that is not part of the block union.
    #[error("Unknown block type: {0}")]
    UnknownBlockKind(String),

    /// Variable type outside the registry's type set.
    #[error("Unknown variable type: {0}")]
    UnknownVariableKind(String),

    /// Slug that is not lowercase kebab-case.
    #[error("Invalid template slug '{0}': expected lowercase kebab-case")]
    InvalidSlug(String),

    /// Identifier that does not match `[A-Za-z0-9_]+`.
    #[error("Invalid variable name '{0}': expected letters, digits and underscores")]
    InvalidVariableName(String),

    /// A required template field is empty.
    #[error("Template field '{field}' must not be empty")]
    EmptyField { field: &'static str },

    /// Two blocks share an id.
    #[error("Duplicate block id: {0}")]
    DuplicateBlockId(String),

    /// A block has an empty id.
    #[error("Block at position {index} has an empty id")]
    EmptyBlockId { index: usize },

    /// No block with the given id exists.
    #[error("Block not found: {0}")]
    BlockNotFound(String),

    /// Insert or move target outside the block list.
    #[error("Block position {index} is out of range (template has {len} blocks)")]
    InvalidBlockPosition { index: usize, len: usize },
}

impl ModelError {
    /// Catalogued diagnostic code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::UnknownColorScheme(_) => "M-1-3",
            ModelError::DuplicateBlockId(_) | ModelError::EmptyBlockId { .. } => "M-1-2",
            ModelError::InvalidSlug(_) => "M-1-1",
            _ => "M-0-1",
        }
    }

    pub fn to_diagnostic(&self) -> DiagnosticMessage {
        DiagnosticMessageBuilder::error(self.to_string())
            .with_code(self.code())
            .build()
    }
}

/// Errors that abort a render or code-generation call.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Structurally invalid block data.
    #[error("Malformed block '{block_id}': field '{field}' {reason}")]
    MalformedBlock {
        block_id: String,
        field: &'static str,
        reason: String,
    },

    /// The template envelope itself is invalid.
    #[error(transparent)]
    InvalidTemplate(#[from] ModelError),

    /// Writing into the output buffer failed.
    #[error("Failed to write markup: {0}")]
    Format(#[from] std::fmt::Error),
}

impl RenderError {
    pub fn malformed(
        block_id: impl Into<String>,
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        RenderError::MalformedBlock {
            block_id: block_id.into(),
            field,
            reason: reason.into(),
        }
    }

    pub fn to_diagnostic(&self) -> DiagnosticMessage {
        match self {
            RenderError::MalformedBlock {
                block_id, field, ..
            } => DiagnosticMessageBuilder::error("Malformed block")
                .with_code("M-3-1")
                .problem(self.to_string())
                .add_info(format!("Block id: `{}`", block_id))
                .add_info(format!("Field: `{}`", field))
                .build(),
            RenderError::InvalidTemplate(err) => err.to_diagnostic(),
            RenderError::Format(_) => DiagnosticMessageBuilder::error(self.to_string())
                .with_code("M-0-1")
                .build(),
        }
    }
}

/// Result type for render and generate operations.
pub type RenderResult<T> = Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_block_message_names_block_and_field() {
        let err = RenderError::malformed("btn-1", "label", "must not be empty");
        assert_eq!(
            err.to_string(),
            "Malformed block 'btn-1': field 'label' must not be empty"
        );
    }

    #[test]
    fn test_malformed_block_diagnostic() {
        let diag = RenderError::malformed("img-2", "contentId", "must not be a URL").to_diagnostic();
        assert_eq!(diag.code.as_deref(), Some("M-3-1"));
        assert_eq!(diag.details.len(), 2);
        assert!(diag.details[0].content.contains("img-2"));
    }

    #[test]
    fn test_model_error_codes() {
        assert_eq!(ModelError::UnknownColorScheme("teal".into()).code(), "M-1-3");
        assert_eq!(ModelError::DuplicateBlockId("a".into()).code(), "M-1-2");
        assert_eq!(ModelError::InvalidSlug("A B".into()).code(), "M-1-1");
    }
}
