/*
 * codegen.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Code generation into the legacy template module format.
//!
//! The generated module is what [`crate::import::parse`] reads. Block content
//! is emitted as preserve-mode fragments with each `{{name}}` reference
//! rewritten to `${data.name}`, and each fragment is preceded by a
//! `<!-- block: id -->` marker so that re-importing keeps block ids. A
//! button or link whose explicit scheme equals the template's carries it in
//! the marker as `scheme: name`.

use crate::block::Block;
use crate::error::RenderResult;
use crate::render::blocks::write_block;
use crate::render::{RenderContext, RenderMode, RenderOptions};
use crate::style::ColorScheme;
use crate::template::{Template, VariableDeclaration};
use crate::variables::{
    VariableKind, VariableValues, extract_template_variables, lookup_variable, token_matches,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write;

static MARKER_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid marker id regex"));

/// Generate the legacy module source for a template.
pub fn generate(template: &Template) -> RenderResult<String> {
    template.validate()?;

    let interface = interface_name(&template.slug);
    let mut out = String::new();

    writeln!(out, "/*")?;
    writeln!(out, " * {}.ts", template.slug)?;
    writeln!(out, " * Generated from the block model. Re-import to edit.")?;
    writeln!(out, " */")?;
    writeln!(out)?;

    write_const(&mut out, "slug", &template.slug)?;
    write_const(&mut out, "name", &template.name)?;
    if let Some(description) = &template.description {
        write_const(&mut out, "description", description)?;
    }
    if let Some(context) = &template.context {
        write_const(&mut out, "context", context)?;
    }
    write_const(&mut out, "colorScheme", template.color_scheme.id())?;
    writeln!(out)?;

    write_interface(&mut out, &interface, &declarations(template))?;
    writeln!(out)?;

    write_const(&mut out, "subject", &template.subject)?;
    if let Some(preheader) = &template.preheader {
        write_const(&mut out, "preheader", preheader)?;
    }
    writeln!(out)?;

    writeln!(out, "export const header = {{")?;
    if let Some(emoji) = &template.header.emoji {
        writeln!(out, "  emoji: {},", quote(emoji))?;
    }
    writeln!(out, "  title: {},", quote(&template.header.title))?;
    if let Some(subtitle) = &template.header.subtitle {
        writeln!(out, "  subtitle: {},", quote(subtitle))?;
    }
    writeln!(out, "}};")?;
    writeln!(out)?;

    write_const(&mut out, "footer", template.footer.kind.id())?;
    if let Some(note) = &template.footer.note {
        write_const(&mut out, "footerNote", note)?;
    }
    writeln!(out)?;

    writeln!(
        out,
        "export function renderContent(data: {}): string {{",
        interface
    )?;
    writeln!(out, "  return `")?;
    write_content(&mut out, template)?;
    writeln!(out, "`;")?;
    writeln!(out, "}}")?;

    tracing::debug!(
        template = %template.slug,
        bytes = out.len(),
        "Generated legacy module"
    );
    Ok(out)
}

fn write_content(out: &mut String, template: &Template) -> RenderResult<()> {
    let values = VariableValues::new();
    let options = RenderOptions::new(RenderMode::Preserve);
    let mut ctx = RenderContext::new(template, &values, &options);

    for block in &template.blocks {
        let id = block.id().as_str();
        if MARKER_ID_RE.is_match(id) {
            // Overrides matching the template scheme are invisible in the markup.
            match explicit_scheme(block).filter(|s| *s == template.color_scheme) {
                Some(scheme) => writeln!(out, "<!-- block: {} scheme: {} -->", id, scheme.id())?,
                None => writeln!(out, "<!-- block: {} -->", id)?,
            }
        }
        let mut fragment = String::new();
        write_block(block, &mut ctx, &mut fragment)?;
        out.push_str(&interpolate(&escape_literal(&fragment)));
    }
    Ok(())
}

fn explicit_scheme(block: &Block) -> Option<ColorScheme> {
    match block {
        Block::Button(b) => b.color_scheme,
        Block::Link(b) => b.color_scheme,
        _ => None,
    }
}

/// Declared variables followed by referenced ones the template does not declare.
fn declarations(template: &Template) -> Vec<VariableDeclaration> {
    let mut declarations = template.variables.clone();
    for name in extract_template_variables(template) {
        if !template.declares(&name) {
            let kind = lookup_variable(&name).map_or(VariableKind::Text, |def| def.kind);
            declarations.push(VariableDeclaration::new(name, kind));
        }
    }
    declarations
}

fn write_interface(
    out: &mut String,
    name: &str,
    declarations: &[VariableDeclaration],
) -> RenderResult<()> {
    if declarations.is_empty() {
        writeln!(out, "export interface {} {{}}", name)?;
        return Ok(());
    }
    writeln!(out, "export interface {} {{", name)?;
    for declaration in declarations {
        writeln!(
            out,
            "  {}{}: string; // {}",
            declaration.name,
            if declaration.optional { "?" } else { "" },
            declaration.kind
        )?;
    }
    writeln!(out, "}}")?;
    Ok(())
}

fn write_const(out: &mut String, name: &str, value: &str) -> RenderResult<()> {
    writeln!(out, "export const {} = {};", name, quote(value))?;
    Ok(())
}

/// Single-quoted string literal.
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            _ => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

/// Escape text for the body of a template literal.
fn escape_literal(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
}

/// Rewrite `{{name}}` references as `${data.name}` interpolations.
fn interpolate(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (range, name) in token_matches(text) {
        out.push_str(&text[last..range.start]);
        let _ = write!(out, "${{data.{}}}", name);
        last = range.end;
    }
    out.push_str(&text[last..]);
    out
}

/// `payment-reminder` becomes `PaymentReminderVariables`.
fn interface_name(slug: &str) -> String {
    let mut name: String = slug
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert_str(0, "Template");
    }
    name.push_str("Variables");
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Block;
    use crate::template::Header;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote(r"Don't \ stop"), r"'Don\'t \\ stop'");
    }

    #[test]
    fn test_literal_escaping_and_interpolation() {
        let text = "Cost: ${{amount}} `x` \\ {{name}}";
        assert_eq!(
            interpolate(&escape_literal(text)),
            "Cost: \\$${data.amount} \\`x\\` \\\\ ${data.name}"
        );
    }

    #[test]
    fn test_interface_name() {
        assert_eq!(interface_name("payment-reminder"), "PaymentReminderVariables");
        assert_eq!(interface_name("2fa-code"), "Template2faCodeVariables");
    }

    #[test]
    fn test_generate_shape() {
        let template = Template::new(
            "welcome",
            "Welcome",
            "Welcome, {{customer_name}}!",
            Header::new("Welcome aboard").with_emoji("👋"),
        )
        .with_blocks(vec![Block::greeting("hello"), Block::link("portal")]);

        let source = generate(&template).unwrap();
        assert!(source.contains("export const slug = 'welcome';\n"));
        assert!(source.contains("export const subject = 'Welcome, {{customer_name}}!';\n"));
        assert!(source.contains("export interface WelcomeVariables {\n"));
        assert!(source.contains("  customer_name: string; // text\n"));
        assert!(source.contains("  portal_url: string; // url\n"));
        assert!(source.contains("<!-- block: hello -->\n"));
        assert!(source.contains("Hi ${data.customer_name},</p>"));
        assert!(source.contains("href=\"${data.portal_url}\""));
        assert!(!source.contains("{{customer_name}},</p>"));
    }

    #[test]
    fn test_generate_rejects_malformed_block() {
        let mut block = Block::heading("h");
        if let Block::Heading(h) = &mut block {
            h.level = 7;
        }
        let template = Template::new("welcome", "Welcome", "Hi", Header::new("Hi"))
            .with_blocks(vec![block]);
        assert!(generate(&template).is_err());
    }

    #[test]
    fn test_generate_rejects_templated_content_id() {
        let mut block = Block::image("logo");
        if let Block::Image(image) = &mut block {
            image.content_id = "{{logo_cid}}".to_string();
        }
        let template = Template::new("welcome", "Welcome", "Hi", Header::new("Hi"))
            .with_blocks(vec![block]);
        assert!(generate(&template).is_err());
    }
}
