/*
 * render/context.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Per-call render state.
//!
//! A [`RenderContext`] is built at the start of every render call and
//! dropped at the end. Apart from the unresolved-token set it is read-only.

use super::{RenderMode, RenderOptions};
use crate::error::{RenderError, RenderResult};
use crate::style::{ColorScheme, Palette, escape_html};
use crate::template::Template;
use crate::variables::{VariableValues, token, token_matches, variable_name};
use std::collections::BTreeSet;

pub struct RenderContext<'a> {
    pub template: &'a Template,
    pub values: &'a VariableValues,
    pub options: &'a RenderOptions,
    /// Palette of the template's own scheme.
    pub palette: Palette,
    unresolved: BTreeSet<String>,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        template: &'a Template,
        values: &'a VariableValues,
        options: &'a RenderOptions,
    ) -> Self {
        Self {
            template,
            values,
            options,
            palette: template.color_scheme.palette(),
            unresolved: BTreeSet::new(),
        }
    }

    pub fn mode(&self) -> RenderMode {
        self.options.mode
    }

    /// Palette for a block, honoring its scheme override.
    pub fn palette_for(&self, scheme: Option<ColorScheme>) -> Palette {
        scheme.map_or(self.palette, |s| s.palette())
    }

    /// Substitute references in authored markup.
    ///
    /// Literal text passes through untouched; substituted values are escaped.
    pub fn markup(&mut self, text: &str) -> String {
        self.substitute(text, |literal| literal.to_string(), escape_html)
    }

    /// Substitute references in an attribute value. Everything is escaped.
    pub fn attribute(&mut self, text: &str) -> String {
        self.substitute(text, escape_html, escape_html)
    }

    /// Substitute references in plain text such as the subject line.
    pub fn plain(&mut self, text: &str) -> String {
        self.substitute(text, |literal| literal.to_string(), |value| value.to_string())
    }

    /// Resolve a field that names a single variable.
    ///
    /// In preserve mode this is the token itself; in substitute mode the
    /// escaped value, or the token when no value was supplied.
    pub fn variable(
        &mut self,
        block_id: &str,
        field: &'static str,
        value: &str,
    ) -> RenderResult<String> {
        let name = variable_name(value).ok_or_else(|| {
            RenderError::malformed(
                block_id,
                field,
                format!("must name a variable, got '{}'", value),
            )
        })?;

        if self.mode() == RenderMode::Preserve {
            return Ok(token(name));
        }
        match self.values.get(name) {
            Some(value) => Ok(escape_html(value)),
            None => {
                self.record_unresolved(name);
                Ok(token(name))
            }
        }
    }

    /// Consume the context, returning the unresolved names in sorted order.
    pub fn into_unresolved(self) -> Vec<String> {
        self.unresolved.into_iter().collect()
    }

    fn substitute(
        &mut self,
        text: &str,
        literal: impl Fn(&str) -> String,
        value: impl Fn(&str) -> String,
    ) -> String {
        if self.mode() == RenderMode::Preserve {
            return literal(text);
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for (range, name) in token_matches(text) {
            out.push_str(&literal(&text[last..range.start]));
            match self.values.get(name) {
                Some(v) => out.push_str(&value(v)),
                None => {
                    self.record_unresolved(name);
                    out.push_str(&text[range.clone()]);
                }
            }
            last = range.end;
        }
        out.push_str(&literal(&text[last..]));
        out
    }

    fn record_unresolved(&mut self, name: &str) {
        if self.unresolved.insert(name.to_string()) {
            tracing::debug!(
                template = %self.template.slug,
                variable = name,
                "Unresolved variable left as token"
            );
        }
    }
}
