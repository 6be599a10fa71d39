/*
 * draft.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Editing sessions.
//!
//! A [`TemplateDraft`] owns the template being edited and applies
//! [`EditCommand`]s to it one at a time. The draft is an ordinary value
//! owned by whoever runs the editor; there is no shared or global store.

use crate::block::{Block, BlockId};
use crate::error::{ModelError, RenderResult};
use crate::render::{RenderMode, RenderOptions, RenderedEmail, render_with};
use crate::style::ColorScheme;
use crate::template::Template;
use crate::variables::{VariableValues, example_values};
use serde::{Deserialize, Serialize};

/// A single edit to a draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum EditCommand {
    InsertBlock { index: usize, block: Block },
    /// Replace the block with the same id, keeping its position.
    ReplaceBlock { block: Block },
    MoveBlock { id: BlockId, to: usize },
    RemoveBlock { id: BlockId },
    SetSubject { subject: String },
    SetPreheader { preheader: Option<String> },
    SetColorScheme { color_scheme: ColorScheme },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDraft {
    template: Template,
    dirty: bool,
}

impl TemplateDraft {
    pub fn new(template: Template) -> Self {
        Self {
            template,
            dirty: false,
        }
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Whether the draft has changed since it was opened or last saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag after the caller has persisted the template.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Apply one edit.
    ///
    /// A failed edit leaves the draft unchanged.
    pub fn apply(&mut self, command: EditCommand) -> Result<(), ModelError> {
        match command {
            EditCommand::InsertBlock { index, block } => {
                self.template.insert_block(index, block)?;
            }
            EditCommand::ReplaceBlock { block } => {
                self.template.replace_block(block)?;
            }
            EditCommand::MoveBlock { id, to } => {
                self.template.move_block(id.as_str(), to)?;
            }
            EditCommand::RemoveBlock { id } => {
                self.template.remove_block(id.as_str())?;
            }
            EditCommand::SetSubject { subject } => {
                if subject.trim().is_empty() {
                    return Err(ModelError::EmptyField { field: "subject" });
                }
                self.template.subject = subject;
            }
            EditCommand::SetPreheader { preheader } => {
                self.template.preheader = preheader.filter(|p| !p.trim().is_empty());
            }
            EditCommand::SetColorScheme { color_scheme } => {
                self.template.color_scheme = color_scheme;
            }
        }
        self.dirty = true;
        Ok(())
    }

    /// Render a preview with registry example values.
    ///
    /// Variables without an example stay visible as tokens.
    pub fn preview(&self) -> RenderResult<RenderedEmail> {
        let values = example_values(&self.template);
        self.preview_with(&values)
    }

    /// Render a preview with caller-supplied test values.
    pub fn preview_with(&self, values: &VariableValues) -> RenderResult<RenderedEmail> {
        let options = RenderOptions::new(RenderMode::Substitute).with_preview(true);
        render_with(&self.template, values, &options)
    }

    /// Preserve-mode markup for storage.
    pub fn stored_markup(&self) -> RenderResult<String> {
        let options = RenderOptions::new(RenderMode::Preserve);
        Ok(render_with(&self.template, &VariableValues::new(), &options)?.html)
    }

    pub fn into_template(self) -> Template {
        self.template
    }
}
