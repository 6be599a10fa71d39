/*
 * render/blocks.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! One rendering rule per block variant.
//!
//! Each rule writes a self-contained fragment with inline styles only and a
//! trailing newline. Authored text is passed through as markup; only
//! substituted values and attribute values are escaped.

use super::context::RenderContext;
use crate::block::{
    Block, ButtonBlock, CodeBlock, CustomHtmlBlock, GreetingBlock, HeadingBlock, ImageBlock,
    InfoBoxBlock, LinkBlock, ListBlock, ParagraphBlock, SpacerBlock, StepListBlock,
};
use crate::error::{RenderError, RenderResult};
use crate::style::{Style, body_text, escape_html, muted_text, tokens};
use std::fmt::Write;

const PRESENTATION: &str = r#"role="presentation" cellpadding="0" cellspacing="0" border="0""#;

/// Write a sequence of blocks in order.
pub fn write_blocks(blocks: &[Block], ctx: &mut RenderContext<'_>, buf: &mut String) -> RenderResult<()> {
    for block in blocks {
        write_block(block, ctx, buf)?;
    }
    Ok(())
}

/// Write a single block.
pub fn write_block(block: &Block, ctx: &mut RenderContext<'_>, buf: &mut String) -> RenderResult<()> {
    tracing::trace!(block = %block.id(), kind = %block.kind(), "Rendering block");
    match block {
        Block::Greeting(b) => write_greeting(b, ctx, buf),
        Block::Paragraph(b) => write_paragraph(b, ctx, buf),
        Block::InfoBox(b) => write_info_box(b, ctx, buf),
        Block::Button(b) => write_button(b, ctx, buf),
        Block::StepList(b) => write_step_list(b, ctx, buf),
        Block::Code(b) => write_code(b, ctx, buf),
        Block::Image(b) => write_image(b, ctx, buf),
        Block::Divider(_) => write_divider(buf),
        Block::Spacer(b) => write_spacer(b, buf),
        Block::Heading(b) => write_heading(b, ctx, buf),
        Block::List(b) => write_list(b, ctx, buf),
        Block::Link(b) => write_link(b, ctx, buf),
        Block::CustomHtml(b) => write_custom_html(b, ctx, buf),
    }
}

fn require_text(block_id: &str, field: &'static str, value: &str) -> RenderResult<()> {
    if value.trim().is_empty() {
        return Err(RenderError::malformed(block_id, field, "must not be empty"));
    }
    Ok(())
}

fn write_greeting(b: &GreetingBlock, ctx: &mut RenderContext<'_>, buf: &mut String) -> RenderResult<()> {
    let name = ctx.variable(b.id.as_str(), "nameVariable", &b.name_variable)?;
    writeln!(buf, "<p style=\"{}\">Hi {},</p>", body_text(), name)?;
    Ok(())
}

fn write_paragraph(b: &ParagraphBlock, ctx: &mut RenderContext<'_>, buf: &mut String) -> RenderResult<()> {
    require_text(b.id.as_str(), "text", &b.text)?;
    writeln!(buf, "<p style=\"{}\">{}</p>", body_text(), ctx.markup(&b.text))?;
    Ok(())
}

fn write_info_box(b: &InfoBoxBlock, ctx: &mut RenderContext<'_>, buf: &mut String) -> RenderResult<()> {
    let id = b.id.as_str();
    if b.items.is_empty() {
        return Err(RenderError::malformed(id, "items", "must contain at least one item"));
    }
    for item in &b.items {
        require_text(id, "items.label", &item.label)?;
    }

    let palette = ctx.palette_for(b.color_scheme);
    let panel = Style::new()
        .prop("margin", format!("0 0 {}", tokens::SPACE_LG))
        .prop("background-color", palette.light)
        .prop("border", format!("1px solid {}", palette.border))
        .prop("border-left", format!("4px solid {}", palette.primary))
        .prop("border-radius", tokens::RADIUS);
    writeln!(buf, "<table {} width=\"100%\" style=\"{}\">", PRESENTATION, panel)?;
    writeln!(buf, "<tr>")?;
    writeln!(buf, "<td style=\"padding: {};\">", tokens::SPACE_MD)?;

    if let Some(title) = &b.title {
        let style = Style::new()
            .prop("margin", format!("0 0 {}", tokens::SPACE_SM))
            .prop("font-family", tokens::FONT_FAMILY)
            .prop("font-size", tokens::FONT_SIZE_BASE)
            .prop("font-weight", "600")
            .prop("color", palette.text);
        writeln!(buf, "<p style=\"{}\">{}</p>", style, ctx.markup(title))?;
    }

    let cell = Style::new()
        .prop("padding", format!("{} 0", tokens::SPACE_XS))
        .prop("font-family", tokens::FONT_FAMILY)
        .prop("font-size", tokens::FONT_SIZE_SMALL);
    let label = cell.clone().prop("color", tokens::TEXT_MUTED);
    let value = cell
        .prop("color", tokens::TEXT)
        .prop("font-weight", "600")
        .prop("text-align", "right");

    writeln!(buf, "<table {} width=\"100%\">", PRESENTATION)?;
    for item in &b.items {
        writeln!(buf, "<tr>")?;
        writeln!(buf, "<td style=\"{}\">{}</td>", label, ctx.markup(&item.label))?;
        writeln!(buf, "<td style=\"{}\">{}</td>", value, ctx.markup(&item.value))?;
        writeln!(buf, "</tr>")?;
    }
    writeln!(buf, "</table>")?;

    writeln!(buf, "</td>")?;
    writeln!(buf, "</tr>")?;
    writeln!(buf, "</table>")?;
    Ok(())
}

fn write_button(b: &ButtonBlock, ctx: &mut RenderContext<'_>, buf: &mut String) -> RenderResult<()> {
    let id = b.id.as_str();
    require_text(id, "label", &b.label)?;
    let href = ctx.variable(id, "urlVariable", &b.url_variable)?;
    let palette = ctx.palette_for(b.color_scheme);

    let anchor = Style::new()
        .prop("display", "inline-block")
        .prop("padding", format!("14px {}", tokens::SPACE_XL))
        .prop("font-family", tokens::FONT_FAMILY)
        .prop("font-size", tokens::FONT_SIZE_BASE)
        .prop("font-weight", "600")
        .prop("color", tokens::ON_PRIMARY)
        .prop("text-decoration", "none")
        .prop("border", format!("1px solid {}", palette.primary_dark))
        .prop("border-radius", tokens::RADIUS);

    writeln!(
        buf,
        "<table {} style=\"margin: {} auto;\">",
        PRESENTATION,
        tokens::SPACE_LG
    )?;
    writeln!(buf, "<tr>")?;
    writeln!(
        buf,
        "<td align=\"center\" bgcolor=\"{}\" style=\"border-radius: {};\">",
        palette.primary,
        tokens::RADIUS
    )?;
    writeln!(
        buf,
        "<a href=\"{}\" target=\"_blank\" style=\"{}\">{}</a>",
        href,
        anchor,
        ctx.markup(&b.label)
    )?;
    writeln!(buf, "</td>")?;
    writeln!(buf, "</tr>")?;
    writeln!(buf, "</table>")?;
    Ok(())
}

fn write_step_list(b: &StepListBlock, ctx: &mut RenderContext<'_>, buf: &mut String) -> RenderResult<()> {
    let id = b.id.as_str();
    if b.steps.is_empty() {
        return Err(RenderError::malformed(id, "steps", "must contain at least one step"));
    }
    for step in &b.steps {
        require_text(id, "steps.title", &step.title)?;
    }

    if let Some(title) = &b.title {
        let style = Style::new()
            .prop("margin", format!("0 0 {}", tokens::SPACE_MD))
            .prop("font-family", tokens::FONT_FAMILY)
            .prop("font-size", tokens::FONT_SIZE_H3)
            .prop("font-weight", "600")
            .prop("color", tokens::TEXT);
        writeln!(buf, "<p style=\"{}\">{}</p>", style, ctx.markup(title))?;
    }

    let badge = Style::new()
        .prop("width", "28px")
        .prop("height", "28px")
        .prop("border-radius", "14px")
        .prop("background-color", ctx.palette.primary)
        .prop("color", tokens::ON_PRIMARY)
        .prop("font-family", tokens::FONT_FAMILY)
        .prop("font-size", tokens::FONT_SIZE_SMALL)
        .prop("font-weight", "700")
        .prop("text-align", "center")
        .prop("line-height", "28px");
    let step_title = Style::new()
        .prop("margin", "0")
        .prop("font-family", tokens::FONT_FAMILY)
        .prop("font-size", tokens::FONT_SIZE_BASE)
        .prop("font-weight", "600")
        .prop("color", tokens::TEXT);
    let description = muted_text().prop("margin", format!("{} 0 0", tokens::SPACE_XS));

    writeln!(
        buf,
        "<table {} width=\"100%\" style=\"margin: 0 0 {};\">",
        PRESENTATION,
        tokens::SPACE_LG
    )?;
    for (i, step) in b.steps.iter().enumerate() {
        writeln!(buf, "<tr>")?;
        writeln!(
            buf,
            "<td valign=\"top\" width=\"40\" style=\"padding: 0 0 {};\">",
            tokens::SPACE_MD
        )?;
        writeln!(buf, "<div style=\"{}\">{}</div>", badge, i + 1)?;
        writeln!(buf, "</td>")?;
        writeln!(
            buf,
            "<td valign=\"top\" style=\"padding: 0 0 {};\">",
            tokens::SPACE_MD
        )?;
        writeln!(buf, "<p style=\"{}\">{}</p>", step_title, ctx.markup(&step.title))?;
        if !step.description.is_empty() {
            writeln!(
                buf,
                "<p style=\"{}\">{}</p>",
                description,
                ctx.markup(&step.description)
            )?;
        }
        writeln!(buf, "</td>")?;
        writeln!(buf, "</tr>")?;
    }
    writeln!(buf, "</table>")?;
    Ok(())
}

fn write_code(b: &CodeBlock, ctx: &mut RenderContext<'_>, buf: &mut String) -> RenderResult<()> {
    require_text(b.id.as_str(), "code", &b.code)?;

    let panel = Style::new()
        .prop("margin", format!("0 0 {}", tokens::SPACE_LG))
        .prop("background-color", ctx.palette.light)
        .prop("border", format!("1px dashed {}", ctx.palette.border))
        .prop("border-radius", tokens::RADIUS);
    let code = Style::new()
        .prop("margin", "0")
        .prop("font-family", tokens::MONO_FONT_FAMILY)
        .prop("font-size", tokens::FONT_SIZE_CODE)
        .prop("font-weight", "700")
        .prop("letter-spacing", "4px")
        .prop("color", ctx.palette.text);

    writeln!(buf, "<table {} width=\"100%\" style=\"{}\">", PRESENTATION, panel)?;
    writeln!(buf, "<tr>")?;
    writeln!(
        buf,
        "<td align=\"center\" style=\"padding: {};\">",
        tokens::SPACE_LG
    )?;
    if let Some(label) = &b.label {
        let style = muted_text().prop("margin", format!("0 0 {}", tokens::SPACE_SM));
        writeln!(buf, "<p style=\"{}\">{}</p>", style, ctx.markup(label))?;
    }
    writeln!(buf, "<p style=\"{}\">{}</p>", code, ctx.markup(&b.code))?;
    writeln!(buf, "</td>")?;
    writeln!(buf, "</tr>")?;
    writeln!(buf, "</table>")?;
    Ok(())
}

fn write_image(b: &ImageBlock, ctx: &mut RenderContext<'_>, buf: &mut String) -> RenderResult<()> {
    let id = b.id.as_str();
    require_text(id, "contentId", &b.content_id)?;
    if !b.has_bare_content_id() {
        return Err(RenderError::malformed(
            id,
            "contentId",
            "must be a bare attachment content id, not a URL or variable",
        ));
    }
    if let Some(width) = b.width
        && (width == 0 || width > tokens::CONTENT_WIDTH)
    {
        return Err(RenderError::malformed(
            id,
            "width",
            format!("must be between 1 and {}", tokens::CONTENT_WIDTH),
        ));
    }

    let style = Style::new()
        .prop("display", "block")
        .prop("max-width", "100%")
        .prop("height", "auto")
        .prop("border", "0")
        .prop("margin", format!("0 auto {}", tokens::SPACE_MD));

    write!(
        buf,
        "<img src=\"cid:{}\" alt=\"{}\"",
        escape_html(&b.content_id),
        ctx.attribute(&b.alt)
    )?;
    if let Some(width) = b.width {
        write!(buf, " width=\"{}\"", width)?;
    }
    writeln!(buf, " style=\"{}\">", style)?;
    Ok(())
}

fn write_divider(buf: &mut String) -> RenderResult<()> {
    let style = Style::new()
        .prop("border", "none")
        .prop("border-top", format!("1px solid {}", tokens::DIVIDER))
        .prop("margin", format!("{} 0", tokens::SPACE_LG));
    writeln!(buf, "<hr style=\"{}\">", style)?;
    Ok(())
}

fn write_spacer(b: &SpacerBlock, buf: &mut String) -> RenderResult<()> {
    if b.height == 0 {
        return Err(RenderError::malformed(
            b.id.as_str(),
            "height",
            "must be greater than zero",
        ));
    }
    let style = Style::new()
        .prop("height", format!("{}px", b.height))
        .prop("line-height", format!("{}px", b.height))
        .prop("font-size", "1px");
    writeln!(buf, "<div style=\"{}\">&nbsp;</div>", style)?;
    Ok(())
}

fn write_heading(b: &HeadingBlock, ctx: &mut RenderContext<'_>, buf: &mut String) -> RenderResult<()> {
    let id = b.id.as_str();
    require_text(id, "text", &b.text)?;
    let size = match b.level {
        1 => tokens::FONT_SIZE_H1,
        2 => tokens::FONT_SIZE_H2,
        3 => tokens::FONT_SIZE_H3,
        _ => return Err(RenderError::malformed(id, "level", "must be 1, 2 or 3")),
    };
    let style = Style::new()
        .prop("margin", format!("0 0 {}", tokens::SPACE_MD))
        .prop("font-family", tokens::FONT_FAMILY)
        .prop("font-size", size)
        .prop("font-weight", "600")
        .prop("line-height", "1.3")
        .prop("color", tokens::TEXT);
    writeln!(
        buf,
        "<h{level} style=\"{}\">{}</h{level}>",
        style,
        ctx.markup(&b.text),
        level = b.level
    )?;
    Ok(())
}

fn write_list(b: &ListBlock, ctx: &mut RenderContext<'_>, buf: &mut String) -> RenderResult<()> {
    if b.items.is_empty() {
        return Err(RenderError::malformed(
            b.id.as_str(),
            "items",
            "must contain at least one item",
        ));
    }
    let tag = if b.ordered { "ol" } else { "ul" };
    let list = Style::new()
        .prop("margin", format!("0 0 {}", tokens::SPACE_MD))
        .prop("padding-left", tokens::SPACE_LG)
        .prop("font-family", tokens::FONT_FAMILY)
        .prop("font-size", tokens::FONT_SIZE_BASE)
        .prop("line-height", tokens::LINE_HEIGHT)
        .prop("color", tokens::TEXT);
    let item = Style::new().prop("margin", format!("0 0 {}", tokens::SPACE_XS));

    writeln!(buf, "<{} style=\"{}\">", tag, list)?;
    for text in &b.items {
        writeln!(buf, "<li style=\"{}\">{}</li>", item, ctx.markup(text))?;
    }
    writeln!(buf, "</{}>", tag)?;
    Ok(())
}

fn write_link(b: &LinkBlock, ctx: &mut RenderContext<'_>, buf: &mut String) -> RenderResult<()> {
    let id = b.id.as_str();
    require_text(id, "text", &b.text)?;
    let href = ctx.variable(id, "urlVariable", &b.url_variable)?;
    let palette = ctx.palette_for(b.color_scheme);
    let anchor = Style::new()
        .prop("color", palette.primary)
        .prop("text-decoration", "underline");
    writeln!(
        buf,
        "<p style=\"{}\"><a href=\"{}\" target=\"_blank\" style=\"{}\">{}</a></p>",
        body_text(),
        href,
        anchor,
        ctx.markup(&b.text)
    )?;
    Ok(())
}

fn write_custom_html(b: &CustomHtmlBlock, ctx: &mut RenderContext<'_>, buf: &mut String) -> RenderResult<()> {
    buf.push_str(&ctx.markup(&b.html));
    if !b.html.ends_with('\n') {
        buf.push('\n');
    }
    Ok(())
}
