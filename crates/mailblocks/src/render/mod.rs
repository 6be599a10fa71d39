/*
 * render/mod.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template rendering.
//!
//! One renderer serves two purposes. In [`RenderMode::Substitute`] it fills
//! `{{name}}` references from a value map to produce sendable markup. In
//! [`RenderMode::Preserve`] it leaves every reference in place, producing the
//! legacy markup that gets stored for later re-editing. Both modes share all
//! fragment generation; the mode only changes how references are resolved.
//!
//! Output is a pure function of the template, the values and the options.

pub mod blocks;
pub mod context;
pub mod shell;

pub use context::RenderContext;
pub use shell::{BareShell, LegacyShell, MarkupShell, ShellOptions, ShellParts};

use crate::error::RenderResult;
use crate::template::Template;
use crate::variables::VariableValues;
use serde::{Deserialize, Serialize};

/// How variable references are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Replace references with supplied values.
    #[default]
    Substitute,
    /// Leave every reference as a literal token.
    Preserve,
}

/// Options for a render call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub mode: RenderMode,
    /// Draw the preview banner above the header.
    pub preview: bool,
    pub shell: ShellOptions,
}

impl RenderOptions {
    pub fn new(mode: RenderMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    pub fn with_shell(mut self, shell: ShellOptions) -> Self {
        self.shell = shell;
        self
    }
}

/// The result of rendering a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedEmail {
    /// Subject line as plain text.
    pub subject: String,
    pub html: String,
    /// References left as tokens because no value was supplied, sorted.
    pub unresolved: Vec<String>,
}

/// Render a template with default shell options.
pub fn render(
    template: &Template,
    values: &VariableValues,
    mode: RenderMode,
) -> RenderResult<RenderedEmail> {
    render_with(template, values, &RenderOptions::new(mode))
}

/// Render a template into the legacy envelope.
pub fn render_with(
    template: &Template,
    values: &VariableValues,
    options: &RenderOptions,
) -> RenderResult<RenderedEmail> {
    render_with_shell(template, values, options, &LegacyShell)
}

/// Render a template with a caller-supplied shell.
pub fn render_with_shell(
    template: &Template,
    values: &VariableValues,
    options: &RenderOptions,
    shell: &dyn MarkupShell,
) -> RenderResult<RenderedEmail> {
    template.validate()?;
    tracing::debug!(
        template = %template.slug,
        mode = ?options.mode,
        blocks = template.blocks.len(),
        "Rendering template"
    );

    let mut ctx = RenderContext::new(template, values, options);

    let mut content = String::new();
    blocks::write_blocks(&template.blocks, &mut ctx, &mut content)?;

    let subject = ctx.plain(&template.subject);
    let parts = ShellParts {
        subject: &subject,
        preheader: template.preheader.as_deref().map(|p| ctx.markup(p)),
        emoji: template.header.emoji.as_deref().map(|e| ctx.markup(e)),
        title: ctx.markup(&template.header.title),
        subtitle: template.header.subtitle.as_deref().map(|s| ctx.markup(s)),
        content: &content,
        footer: template.footer.kind,
        footer_note: template
            .footer
            .note
            .as_ref()
            .or(options.shell.footer_note.as_ref())
            .map(|note| ctx.markup(note)),
        palette: ctx.palette,
        preview: options.preview,
        options: &options.shell,
    };

    let mut html = String::with_capacity(content.len() + 4096);
    shell.wrap(&parts, &mut html)?;

    let unresolved = ctx.into_unresolved();
    tracing::debug!(
        template = %template.slug,
        bytes = html.len(),
        unresolved = unresolved.len(),
        "Rendered template"
    );

    Ok(RenderedEmail {
        subject,
        html,
        unresolved,
    })
}

/// Render only the block fragments, without the envelope.
pub fn render_content(
    template: &Template,
    values: &VariableValues,
    mode: RenderMode,
) -> RenderResult<String> {
    let options = RenderOptions::new(mode);
    Ok(render_with_shell(template, values, &options, &BareShell)?.html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Block;
    use crate::error::RenderError;
    use crate::error::ModelError;
    use crate::template::{FooterKind, Header};
    use pretty_assertions::assert_eq;

    fn template() -> Template {
        Template::new(
            "payment-reminder",
            "Payment Reminder",
            "Invoice {{invoice_number}} is due",
            Header::new("Payment due").with_emoji("💳"),
        )
        .with_preheader("Amount due: {{amount_due}}")
        .with_blocks(vec![Block::greeting("g"), Block::button("b")])
    }

    fn values(pairs: &[(&str, &str)]) -> VariableValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_subject_is_substituted_raw() {
        let email = render(
            &template(),
            &values(&[("invoice_number", "A&B-1")]),
            RenderMode::Substitute,
        )
        .unwrap();
        assert_eq!(email.subject, "Invoice A&B-1 is due");
        assert!(email.html.contains("<title>Invoice A&amp;B-1 is due</title>"));
    }

    #[test]
    fn test_unresolved_collected_across_envelope_and_blocks() {
        let email = render(&template(), &VariableValues::new(), RenderMode::Substitute).unwrap();
        assert_eq!(
            email.unresolved,
            vec!["action_url", "amount_due", "customer_name", "invoice_number"]
        );
    }

    #[test]
    fn test_preserve_mode_reports_nothing_unresolved() {
        let email = render(&template(), &VariableValues::new(), RenderMode::Preserve).unwrap();
        assert!(email.unresolved.is_empty());
        assert_eq!(email.subject, "Invoice {{invoice_number}} is due");
    }

    #[test]
    fn test_invalid_template_is_rejected() {
        let mut template = template();
        template.blocks.push(Block::divider("g"));
        let err = render(&template, &VariableValues::new(), RenderMode::Preserve).unwrap_err();
        assert!(matches!(
            err,
            RenderError::InvalidTemplate(ModelError::DuplicateBlockId(_))
        ));
    }

    #[test]
    fn test_render_content_has_no_envelope() {
        let content =
            render_content(&template(), &VariableValues::new(), RenderMode::Preserve).unwrap();
        assert!(content.starts_with("<p style="));
        assert!(!content.contains("<html"));
    }

    #[test]
    fn test_template_footer_note_wins_over_options() {
        let mut template = template();
        template.footer.kind = FooterKind::Standard;
        template.footer.note = Some("Thanks, {{customer_name}}".to_string());
        let options = RenderOptions::new(RenderMode::Substitute).with_shell(ShellOptions {
            footer_note: Some("Default note".to_string()),
            ..ShellOptions::default()
        });
        let email = render_with(
            &template,
            &values(&[("customer_name", "Ann")]),
            &options,
        )
        .unwrap();
        assert!(email.html.contains("Thanks, Ann"));
        assert!(!email.html.contains("Default note"));
    }

    #[test]
    fn test_default_footer_note_is_substituted() {
        let mut template = template();
        template.footer.kind = FooterKind::Standard;
        template.footer.note = None;
        let options = RenderOptions::new(RenderMode::Substitute).with_shell(ShellOptions {
            footer_note: Some("Sent to {{customer_name}} about {{account_number}}".to_string()),
            ..ShellOptions::default()
        });
        let email = render_with(
            &template,
            &values(&[("customer_name", "Ann")]),
            &options,
        )
        .unwrap();
        assert!(email.html.contains("Sent to Ann about {{account_number}}"));
        assert!(email.unresolved.iter().any(|name| name == "account_number"));
    }
}
