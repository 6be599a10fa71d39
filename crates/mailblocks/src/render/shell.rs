/*
 * render/shell.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The markup shell wrapping rendered content.
//!
//! The shell owns the document envelope: doctype, hidden preheader, header
//! band, content cell and footer. Block fragments never emit any of these.

use crate::error::RenderResult;
use crate::style::{Palette, Style, escape_html, muted_text, tokens};
use crate::template::FooterKind;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Company details and defaults the shell draws into the footer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ShellOptions {
    pub company_name: String,
    pub company_address: Option<String>,
    pub support_email: Option<String>,
    /// Used when the template has no footer note of its own.
    pub footer_note: Option<String>,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            company_name: "Your Company".to_string(),
            company_address: None,
            support_email: None,
            footer_note: None,
        }
    }
}

/// Envelope content after variable substitution.
///
/// Every string here is final markup except `subject`, which is plain text.
#[derive(Debug, Clone)]
pub struct ShellParts<'a> {
    pub subject: &'a str,
    pub preheader: Option<String>,
    pub emoji: Option<String>,
    pub title: String,
    pub subtitle: Option<String>,
    pub content: &'a str,
    pub footer: FooterKind,
    pub footer_note: Option<String>,
    pub palette: Palette,
    pub preview: bool,
    pub options: &'a ShellOptions,
}

/// Wraps rendered block content into a complete document.
pub trait MarkupShell {
    fn wrap(&self, parts: &ShellParts<'_>, buf: &mut String) -> RenderResult<()>;
}

/// The table-based envelope used by every legacy template.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyShell;

/// Emits the content fragments only, for embedding in another layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct BareShell;

impl MarkupShell for BareShell {
    fn wrap(&self, parts: &ShellParts<'_>, buf: &mut String) -> RenderResult<()> {
        buf.push_str(parts.content);
        Ok(())
    }
}

const PRESENTATION: &str = r#"role="presentation" cellpadding="0" cellspacing="0" border="0""#;

impl MarkupShell for LegacyShell {
    fn wrap(&self, parts: &ShellParts<'_>, buf: &mut String) -> RenderResult<()> {
        writeln!(buf, "<!DOCTYPE html>")?;
        writeln!(buf, "<html lang=\"en\">")?;
        writeln!(buf, "<head>")?;
        writeln!(buf, "<meta charset=\"utf-8\">")?;
        writeln!(
            buf,
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">"
        )?;
        writeln!(buf, "<meta name=\"x-apple-disable-message-reformatting\">")?;
        writeln!(buf, "<title>{}</title>", escape_html(parts.subject))?;
        writeln!(buf, "</head>")?;

        let body = Style::new()
            .prop("margin", "0")
            .prop("padding", "0")
            .prop("background-color", tokens::PAGE_BACKGROUND);
        writeln!(buf, "<body style=\"{}\">", body)?;

        if let Some(preheader) = &parts.preheader {
            let hidden = Style::new()
                .prop("display", "none")
                .prop("max-height", "0")
                .prop("overflow", "hidden")
                .prop("mso-hide", "all");
            writeln!(buf, "<div style=\"{}\">{}</div>", hidden, preheader)?;
        }

        writeln!(
            buf,
            "<table {} width=\"100%\" style=\"background-color: {};\">",
            PRESENTATION,
            tokens::PAGE_BACKGROUND
        )?;
        writeln!(buf, "<tr>")?;
        writeln!(
            buf,
            "<td align=\"center\" style=\"padding: {} {};\">",
            tokens::SPACE_LG,
            tokens::SPACE_SM
        )?;
        let card = Style::new()
            .prop("width", "100%")
            .prop("max-width", format!("{}px", tokens::CONTENT_WIDTH))
            .prop("background-color", tokens::SURFACE)
            .prop("border-radius", tokens::RADIUS_LG);
        writeln!(
            buf,
            "<table {} width=\"{}\" style=\"{}\">",
            PRESENTATION,
            tokens::CONTENT_WIDTH,
            card
        )?;

        if parts.preview {
            write_preview_banner(buf)?;
        }
        write_header(parts, buf)?;

        writeln!(buf, "<tr>")?;
        writeln!(buf, "<td style=\"padding: {};\">", tokens::SPACE_XL)?;
        buf.push_str(parts.content);
        writeln!(buf, "</td>")?;
        writeln!(buf, "</tr>")?;

        write_footer(parts, buf)?;

        writeln!(buf, "</table>")?;
        writeln!(buf, "</td>")?;
        writeln!(buf, "</tr>")?;
        writeln!(buf, "</table>")?;
        writeln!(buf, "</body>")?;
        writeln!(buf, "</html>")?;
        Ok(())
    }
}

fn write_preview_banner(buf: &mut String) -> RenderResult<()> {
    let banner = Style::new()
        .prop("background-color", "#fef3c7")
        .prop("color", "#92400e")
        .prop("padding", tokens::SPACE_SM)
        .prop("text-align", "center")
        .prop("font-family", tokens::FONT_FAMILY)
        .prop("font-size", "12px")
        .prop("font-weight", "600")
        .prop("letter-spacing", "0.05em")
        .prop("text-transform", "uppercase");
    writeln!(buf, "<tr>")?;
    writeln!(buf, "<td style=\"{}\">Preview</td>", banner)?;
    writeln!(buf, "</tr>")?;
    Ok(())
}

fn write_header(parts: &ShellParts<'_>, buf: &mut String) -> RenderResult<()> {
    let radius = if parts.preview {
        "0".to_string()
    } else {
        format!("{r} {r} 0 0", r = tokens::RADIUS_LG)
    };
    let band = Style::new()
        .prop("background-color", parts.palette.primary)
        .prop("padding", tokens::SPACE_XL)
        .prop("text-align", "center")
        .prop("border-radius", radius);
    writeln!(buf, "<tr>")?;
    writeln!(buf, "<td style=\"{}\">", band)?;

    if let Some(emoji) = &parts.emoji {
        let style = Style::new()
            .prop("margin", format!("0 0 {}", tokens::SPACE_SM))
            .prop("font-size", tokens::FONT_SIZE_EMOJI)
            .prop("line-height", "1");
        writeln!(buf, "<div style=\"{}\">{}</div>", style, emoji)?;
    }

    let title = Style::new()
        .prop("margin", "0")
        .prop("font-family", tokens::FONT_FAMILY)
        .prop("font-size", tokens::FONT_SIZE_H1)
        .prop("font-weight", "700")
        .prop("line-height", "1.3")
        .prop("color", tokens::ON_PRIMARY);
    writeln!(buf, "<h1 style=\"{}\">{}</h1>", title, parts.title)?;

    if let Some(subtitle) = &parts.subtitle {
        let style = Style::new()
            .prop("margin", format!("{} 0 0", tokens::SPACE_SM))
            .prop("font-family", tokens::FONT_FAMILY)
            .prop("font-size", tokens::FONT_SIZE_BASE)
            .prop("line-height", tokens::LINE_HEIGHT)
            .prop("color", tokens::ON_PRIMARY)
            .prop("opacity", "0.9");
        writeln!(buf, "<p style=\"{}\">{}</p>", style, subtitle)?;
    }

    writeln!(buf, "</td>")?;
    writeln!(buf, "</tr>")?;
    Ok(())
}

fn write_footer(parts: &ShellParts<'_>, buf: &mut String) -> RenderResult<()> {
    if parts.footer == FooterKind::None {
        return Ok(());
    }

    let cell = Style::new()
        .prop("padding", format!("{} {}", tokens::SPACE_LG, tokens::SPACE_XL))
        .prop("border-top", format!("1px solid {}", tokens::DIVIDER))
        .prop("text-align", "center");
    let line = muted_text();
    let options = parts.options;

    writeln!(buf, "<tr>")?;
    writeln!(buf, "<td style=\"{}\">", cell)?;

    if parts.footer == FooterKind::Standard
        && let Some(note) = &parts.footer_note
    {
        let note_style = muted_text().prop("margin", format!("0 0 {}", tokens::SPACE_SM));
        writeln!(buf, "<p style=\"{}\">{}</p>", note_style, note)?;
    }

    writeln!(
        buf,
        "<p style=\"{}\">{}</p>",
        line,
        escape_html(&options.company_name)
    )?;

    if parts.footer == FooterKind::Standard {
        if let Some(address) = &options.company_address {
            writeln!(buf, "<p style=\"{}\">{}</p>", line, escape_html(address))?;
        }
        if let Some(email) = &options.support_email {
            let email = escape_html(email);
            writeln!(
                buf,
                "<p style=\"{}\">Questions? Contact <a href=\"mailto:{}\" style=\"color: {};\">{}</a></p>",
                line,
                email,
                parts.palette.primary,
                email
            )?;
        }
    }

    writeln!(buf, "</td>")?;
    writeln!(buf, "</tr>")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::ColorScheme;

    fn parts<'a>(options: &'a ShellOptions, footer: FooterKind, preview: bool) -> ShellParts<'a> {
        ShellParts {
            subject: "Invoice <1>",
            preheader: Some("Due soon".to_string()),
            emoji: Some("💳".to_string()),
            title: "Payment due".to_string(),
            subtitle: None,
            content: "<p>content</p>\n",
            footer,
            footer_note: Some("You are receiving this because you booked with us.".to_string()),
            palette: ColorScheme::Green.palette(),
            preview,
            options,
        }
    }

    fn wrap(parts: &ShellParts<'_>) -> String {
        let mut buf = String::new();
        LegacyShell.wrap(parts, &mut buf).unwrap();
        buf
    }

    #[test]
    fn test_envelope_structure() {
        let options = ShellOptions::default();
        let html = wrap(&parts(&options, FooterKind::Standard, false));

        assert!(html.starts_with("<!DOCTYPE html>\n"));
        assert!(html.ends_with("</html>\n"));
        assert!(html.contains("<title>Invoice &lt;1&gt;</title>"));
        assert!(html.contains("Due soon</div>"));
        assert!(html.contains("background-color: #16a34a;"));
        assert!(html.contains("<p>content</p>\n"));
        assert!(html.contains("Your Company"));
        assert!(html.contains("because you booked"));
        assert!(!html.contains(">Preview<"));
    }

    #[test]
    fn test_preview_banner() {
        let options = ShellOptions::default();
        let html = wrap(&parts(&options, FooterKind::Standard, true));
        assert!(html.contains(">Preview</td>"));
    }

    #[test]
    fn test_footer_kinds() {
        let options = ShellOptions {
            company_address: Some("1 Main St".to_string()),
            support_email: Some("help@example.com".to_string()),
            ..ShellOptions::default()
        };

        let standard = wrap(&parts(&options, FooterKind::Standard, false));
        assert!(standard.contains("1 Main St"));
        assert!(standard.contains("mailto:help@example.com"));

        let minimal = wrap(&parts(&options, FooterKind::Minimal, false));
        assert!(minimal.contains("Your Company"));
        assert!(!minimal.contains("1 Main St"));
        assert!(!minimal.contains("because you booked"));

        let none = wrap(&parts(&options, FooterKind::None, false));
        assert!(!none.contains("Your Company"));
    }

    #[test]
    fn test_bare_shell_is_content_only() {
        let options = ShellOptions::default();
        let mut buf = String::new();
        BareShell
            .wrap(&parts(&options, FooterKind::Standard, false), &mut buf)
            .unwrap();
        assert_eq!(buf, "<p>content</p>\n");
    }

    #[test]
    fn test_options_from_toml_style_keys() {
        let options: ShellOptions =
            serde_json::from_str(r#"{"company-name": "Acme Cleaning"}"#).unwrap();
        assert_eq!(options.company_name, "Acme Cleaning");
        assert!(options.support_email.is_none());
    }
}
