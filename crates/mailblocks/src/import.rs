/*
 * import.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Importer for legacy template modules.
//!
//! Legacy templates are hand-written TypeScript modules: scalar
//! `export const` fields, a `header` object, a typed variables interface and
//! a `renderContent(data)` function returning a template literal of inline
//! styled markup. The importer recovers a [`Template`] from such a module.
//!
//! This is a heuristic adapter, not a parser for the source language. It
//! recognizes greetings, paragraphs, headings, dividers, spacers, buttons,
//! links, images and lists in the markup. Anything else is skipped with a
//! warning pointing at its source span. Missing required fields are errors;
//! the importer never returns a template it had to invent a subject, slug or
//! header for.

use crate::block::{
    Block, BlockId, BlockKind, ButtonBlock, DividerBlock, GreetingBlock, HeadingBlock, ImageBlock,
    LinkBlock, ListBlock, ParagraphBlock, SpacerBlock, is_bare_content_id,
};
use crate::style::{ColorScheme, tokens};
use crate::template::{
    Footer, FooterKind, Header, Template, VariableDeclaration, is_valid_slug,
};
use crate::variables::{VariableKind, extract_template_variables, lookup_variable, token};
use mailblocks_diagnostics::{DiagnosticMessage, DiagnosticMessageBuilder, SourceSpan};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::ops::Range;

static SCALAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?m)^[ \t]*export\s+const\s+([A-Za-z_]\w*)\s*(?::\s*[A-Za-z_][\w<>\[\]]*\s*)?=\s*(?:'((?:[^'\\\n]|\\.)*)'|"((?:[^"\\\n]|\\.)*)")"#,
    )
    .expect("valid scalar regex")
});

static HEADER_START_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"export\s+const\s+header\s*(?::\s*\w+\s*)?=\s*\{")
        .expect("valid header regex")
});

static FIELD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"([A-Za-z_]\w*)\s*:\s*(?:'((?:[^'\\\n]|\\.)*)'|"((?:[^"\\\n]|\\.)*)")"#,
    )
    .expect("valid field regex")
});

static INTERFACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)export\s+interface\s+(\w+)\s*\{(.*?)\}").expect("valid interface regex")
});

static MEMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*([A-Za-z_]\w*)(\?)?\s*:\s*[^;,\n]+[;,][ \t]*(?://[ \t]*([\w-]+))?")
        .expect("valid member regex")
});

static CONTENT_START_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)(?:function\s+renderContent\s*\([^)]*\)\s*(?::\s*\w+\s*)?\{\s*return\s*|export\s+const\s+content\s*=\s*(?:\([^)]*\)\s*=>\s*)?)`",
    )
    .expect("valid content regex")
});

static INTERPOLATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:data\.)?([A-Za-z0-9_]+)$").expect("valid interpolation regex")
});

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9]*)\b[^>]*?(/?)>").expect("valid tag regex")
});

static ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([A-Za-z-]+)\s*=\s*"([^"]*)""#).expect("valid attribute regex"));

static GREETING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:Hi|Hello|Hey|Dear)\s+(\{\{[A-Za-z0-9_]+\}\})\s*[,!]?$")
        .expect("valid greeting regex")
});

static ONLY_ANCHOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^<a\b([^>]*)>(.*?)</a>$").expect("valid anchor regex"));

static ANCHOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<a\b([^>]*)>(.*?)</a>").expect("valid anchor regex"));

static TOKEN_ONLY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\{\{([A-Za-z0-9_]+)\}\}$").expect("valid token regex"));

static LIST_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<li\b[^>]*>(.*?)</li>").expect("valid list item regex"));

static HEIGHT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"height:\s*(\d+)px").expect("valid height regex"));

static COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[;\s])color:\s*(#[0-9A-Fa-f]{6})").expect("valid color regex")
});

static STRIP_TAGS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid strip regex"));

static BLOCK_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^<!--\s*block:\s*([A-Za-z0-9_-]+)(?:\s+scheme:\s*([a-z]+))?\s*-->$")
        .expect("valid marker regex")
});

const VOID_TAGS: &[&str] = &["hr", "img", "br", "meta", "input"];

/// Outcome of an import.
///
/// `template` is present only when `errors` is empty.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseResult {
    pub template: Option<Template>,
    pub errors: Vec<DiagnosticMessage>,
    pub warnings: Vec<DiagnosticMessage>,
}

impl ParseResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors followed by warnings.
    pub fn diagnostics(&self) -> impl Iterator<Item = &DiagnosticMessage> {
        self.errors.iter().chain(self.warnings.iter())
    }
}

/// Import a legacy template module.
pub fn parse(source: &str) -> ParseResult {
    let result = Importer::new(source).run();
    tracing::debug!(
        ok = result.is_ok(),
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        blocks = result.template.as_ref().map_or(0, |t| t.blocks.len()),
        "Imported legacy template"
    );
    result
}

#[derive(Debug, Clone)]
struct Scalar {
    value: String,
    span: SourceSpan,
}

struct Importer<'a> {
    source: &'a str,
    errors: Vec<DiagnosticMessage>,
    warnings: Vec<DiagnosticMessage>,
    used_ids: HashSet<String>,
    pending_id: Option<String>,
    pending_scheme: Option<ColorScheme>,
}

impl<'a> Importer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            errors: Vec::new(),
            warnings: Vec::new(),
            used_ids: HashSet::new(),
            pending_id: None,
            pending_scheme: None,
        }
    }

    fn run(mut self) -> ParseResult {
        let mut scalars = self.scalars();

        let slug = match scalars.remove("slug") {
            Some(s) if is_valid_slug(&s.value) => Some(s.value),
            Some(s) => {
                self.error_at(
                    "M-4-2",
                    "Invalid slug",
                    format!("`{}` is not lowercase kebab-case", s.value),
                    s.span,
                );
                None
            }
            None => {
                self.missing("slug", "export const slug = 'my-template';");
                None
            }
        };

        let subject = match scalars.remove("subject") {
            Some(s) if !s.value.trim().is_empty() => Some(s.value),
            Some(s) => {
                self.error_at("M-4-1", "Missing subject", "The subject line is empty", s.span);
                None
            }
            None => {
                self.missing("subject", "export const subject = 'Your invoice is ready';");
                None
            }
        };

        let header = self.header();

        let name = match scalars.remove("name") {
            Some(s) if !s.value.trim().is_empty() => s.value,
            _ => {
                let name = slug.as_deref().map(title_case).unwrap_or_default();
                self.defaulted("name", &name);
                name
            }
        };

        let color_scheme = match scalars.remove("colorScheme") {
            Some(s) => match ColorScheme::from_id(&s.value) {
                Ok(scheme) => scheme,
                Err(err) => {
                    self.error_at("M-4-2", "Invalid color scheme", err.to_string(), s.span);
                    ColorScheme::default()
                }
            },
            None => {
                self.defaulted("colorScheme", ColorScheme::default().id());
                ColorScheme::default()
            }
        };

        let footer_kind = match scalars.remove("footer") {
            Some(s) => match FooterKind::from_id(&s.value) {
                Some(kind) => kind,
                None => {
                    self.warnings.push(
                        DiagnosticMessageBuilder::warning("Unknown footer")
                            .with_code("M-4-3")
                            .problem(format!(
                                "`{}` is not a footer kind; using `standard`",
                                s.value
                            ))
                            .with_location(s.span)
                            .add_info("Footer kinds are `standard`, `minimal` and `none`")
                            .build(),
                    );
                    FooterKind::Standard
                }
            },
            None => {
                self.defaulted("footer", FooterKind::Standard.id());
                FooterKind::Standard
            }
        };

        let description = scalars.remove("description").map(|s| s.value);
        let preheader = scalars
            .remove("preheader")
            .map(|s| s.value)
            .filter(|p| !p.trim().is_empty());
        let footer_note = scalars.remove("footerNote").map(|s| s.value);
        let context = scalars.remove("context").map(|s| s.value);

        let declared = self.interface();
        let blocks = self.content(color_scheme);

        let (Some(slug), Some(subject), Some(header)) = (slug, subject, header) else {
            return self.finish(None);
        };
        if !self.errors.is_empty() {
            return self.finish(None);
        }

        let mut template = Template {
            slug,
            name,
            description,
            subject,
            preheader,
            color_scheme,
            header,
            blocks,
            footer: Footer {
                kind: footer_kind,
                note: footer_note,
            },
            variables: Vec::new(),
            context,
        };
        template.variables = self.declarations(&template, declared);

        if let Err(err) = template.validate() {
            self.errors.push(err.to_diagnostic());
            return self.finish(None);
        }
        self.finish(Some(template))
    }

    fn finish(self, template: Option<Template>) -> ParseResult {
        ParseResult {
            template,
            errors: self.errors,
            warnings: self.warnings,
        }
    }

    /// Every quoted `export const` field, first occurrence wins.
    fn scalars(&self) -> HashMap<String, Scalar> {
        let mut scalars = HashMap::new();
        for cap in SCALAR_RE.captures_iter(self.source) {
            let Some(value) = cap.get(2).or_else(|| cap.get(3)) else {
                continue;
            };
            scalars.entry(cap[1].to_string()).or_insert_with(|| Scalar {
                value: unescape_string(value.as_str()),
                span: value.range().into(),
            });
        }
        scalars
    }

    fn header(&mut self) -> Option<Header> {
        let Some(start) = HEADER_START_RE.find(self.source) else {
            self.missing("header", "export const header = { title: 'Welcome' };");
            return None;
        };
        let end = object_end(self.source, start.end()).unwrap_or(self.source.len());
        let body = &self.source[start.end()..end];
        let whole = SourceSpan::new(start.start(), (end + 1).min(self.source.len()));

        let mut fields = HashMap::new();
        for field in FIELD_RE.captures_iter(body) {
            if let Some(value) = field.get(2).or_else(|| field.get(3)) {
                fields
                    .entry(field[1].to_string())
                    .or_insert_with(|| unescape_string(value.as_str()));
            }
        }

        let title = match fields.remove("title") {
            Some(title) if !title.trim().is_empty() => title,
            _ => {
                self.error_at(
                    "M-4-1",
                    "Missing header title",
                    "The header object has no `title`",
                    whole,
                );
                return None;
            }
        };

        Some(Header {
            emoji: fields.remove("emoji").filter(|e| !e.is_empty()),
            title,
            subtitle: fields.remove("subtitle").filter(|s| !s.is_empty()),
        })
    }

    /// Declarations from the variables interface, or `None` when there is none.
    fn interface(&mut self) -> Option<Vec<VariableDeclaration>> {
        let cap = INTERFACE_RE.captures(self.source)?;
        let body = cap.get(2)?;

        let mut declarations: Vec<VariableDeclaration> = Vec::new();
        for member in MEMBER_RE.captures_iter(body.as_str()) {
            let name = member[1].to_string();
            if declarations.iter().any(|d| d.name == name) {
                continue;
            }
            let kind = match member.get(3) {
                Some(comment) => match VariableKind::from_id(comment.as_str()) {
                    Ok(kind) => kind,
                    Err(_) => {
                        let span = SourceSpan::from(comment.range()).offset_by(body.start());
                        self.warnings.push(
                            DiagnosticMessageBuilder::warning("Unknown variable type")
                                .with_code("M-4-2")
                                .problem(format!(
                                    "`{}` on `{}` is not a variable type; using `text`",
                                    comment.as_str(),
                                    name
                                ))
                                .with_location(span)
                                .build(),
                        );
                        VariableKind::Text
                    }
                },
                None => lookup_variable(&name).map_or(VariableKind::Text, |def| def.kind),
            };
            let mut declaration = VariableDeclaration::new(name, kind);
            declaration.optional = member.get(2).is_some();
            declarations.push(declaration);
        }
        Some(declarations)
    }

    /// Merge declared variables with the ones the content references.
    fn declarations(
        &mut self,
        template: &Template,
        declared: Option<Vec<VariableDeclaration>>,
    ) -> Vec<VariableDeclaration> {
        let referenced = extract_template_variables(template);
        let inferred = |name: &str| {
            VariableDeclaration::new(
                name,
                lookup_variable(name).map_or(VariableKind::Text, |def| def.kind),
            )
        };

        match declared {
            Some(mut declarations) => {
                for name in referenced {
                    if declarations.iter().any(|d| d.name == name) {
                        continue;
                    }
                    self.warnings.push(
                        DiagnosticMessageBuilder::warning("Undeclared variable in source")
                            .with_code("M-4-5")
                            .problem(format!(
                                "`{}` is used but missing from the variables interface",
                                token(&name)
                            ))
                            .add_note("Added to the template's declarations")
                            .build(),
                    );
                    declarations.push(inferred(&name));
                }
                declarations
            }
            None => {
                if !referenced.is_empty() {
                    self.warnings.push(
                        DiagnosticMessageBuilder::warning("No variables interface")
                            .with_code("M-4-3")
                            .problem("Variable declarations were inferred from the content")
                            .build(),
                    );
                }
                referenced.iter().map(|name| inferred(name)).collect()
            }
        }
    }

    fn content(&mut self, scheme: ColorScheme) -> Vec<Block> {
        let Some(start) = CONTENT_START_RE.find(self.source) else {
            self.warnings.push(
                DiagnosticMessageBuilder::warning("No content found")
                    .with_code("M-4-4")
                    .problem("Expected a `renderContent` function returning a template literal")
                    .build(),
            );
            return Vec::new();
        };
        let body_start = start.end();
        let Some(body_end) = template_literal_end(self.source, body_start) else {
            self.warnings.push(
                DiagnosticMessageBuilder::warning("Unterminated content")
                    .with_code("M-4-4")
                    .problem("The content template literal is never closed")
                    .with_location(start.range())
                    .build(),
            );
            return Vec::new();
        };

        let body = &self.source[body_start..body_end];
        let mut blocks = Vec::new();
        for segment in segments(body) {
            let span = SourceSpan::from(segment.range.clone()).offset_by(body_start);
            let converted = convert_literal(&body[segment.range.clone()]);
            for expr in &converted.unsupported {
                let expr_span = SourceSpan::from(expr.clone()).offset_by(span.start);
                self.warnings.push(
                    DiagnosticMessageBuilder::warning("Unsupported expression")
                        .with_code("M-4-4")
                        .problem("Only `${data.name}` interpolations become variable references")
                        .with_location(expr_span)
                        .build(),
                );
            }

            match segment.kind {
                SegmentKind::Comment => {
                    if let Some(cap) = BLOCK_MARKER_RE.captures(converted.text.trim()) {
                        self.pending_id = Some(cap[1].to_string());
                        self.pending_scheme =
                            cap.get(2).and_then(|m| ColorScheme::from_id(m.as_str()).ok());
                    }
                }
                SegmentKind::Text => {
                    self.unrecognized("text", span, None);
                }
                SegmentKind::Element { ref tag, closed } => {
                    let recognized = if closed {
                        recognize(tag, &converted.text, scheme)
                    } else {
                        None
                    };
                    match recognized {
                        Some(draft) => {
                            let draft = draft.with_marked_scheme(self.pending_scheme.take());
                            let id = self.next_id(draft.kind(), blocks.len());
                            tracing::trace!(block = %id, kind = %draft.kind(), "Recognized block");
                            blocks.push(draft.into_block(id));
                        }
                        None => {
                            let unclosed = (!closed).then(|| {
                                let open = opening_tag(&body[segment.range.clone()]);
                                SourceSpan::new(span.start, span.start + open.len())
                            });
                            self.unrecognized(tag, span, unclosed);
                        }
                    }
                }
            }
        }
        blocks
    }

    fn next_id(&mut self, kind: BlockKind, index: usize) -> BlockId {
        if let Some(id) = self.pending_id.take()
            && self.used_ids.insert(id.clone())
        {
            return BlockId::new(id);
        }
        let mut n = index + 1;
        loop {
            let id = format!("{}-{}", kind.id(), n);
            if self.used_ids.insert(id.clone()) {
                return BlockId::new(id);
            }
            n += 1;
        }
    }

    fn unrecognized(&mut self, what: &str, span: SourceSpan, unclosed: Option<SourceSpan>) {
        self.pending_id = None;
        self.pending_scheme = None;
        let problem = if what == "text" {
            "Loose text outside any element was skipped".to_string()
        } else {
            format!("A `<{}>` element could not be mapped to a block", what)
        };
        let mut builder = DiagnosticMessageBuilder::warning("Unrecognized content skipped")
            .with_code("M-4-4")
            .problem(problem)
            .with_location(span);
        if let Some(open) = unclosed {
            builder = builder.add_detail_at(format!("`<{}>` is never closed", what), open);
        }
        self.warnings.push(
            builder
                .add_hint("Rebuild this part of the email with blocks in the editor")
                .build(),
        );
    }

    fn missing(&mut self, field: &str, example: &str) {
        self.errors.push(
            DiagnosticMessageBuilder::error(format!("Missing {}", field))
                .with_code("M-4-1")
                .problem(format!("No `{}` declaration was found", field))
                .add_hint(format!("Add `{}`", example))
                .build(),
        );
    }

    fn error_at(
        &mut self,
        code: &str,
        title: &str,
        problem: impl Into<String>,
        span: SourceSpan,
    ) {
        self.errors.push(
            DiagnosticMessageBuilder::error(title)
                .with_code(code)
                .problem(problem)
                .with_location(span)
                .build(),
        );
    }

    fn defaulted(&mut self, field: &str, value: &str) {
        self.warnings.push(
            DiagnosticMessageBuilder::warning(format!("Missing {}", field))
                .with_code("M-4-3")
                .problem(format!("No `{}` declaration; using `{}`", field, value))
                .build(),
        );
    }
}

/// A recognized block before it has an id.
enum Draft {
    Greeting(String),
    Paragraph(String),
    Heading(String, u8),
    Divider,
    Spacer(u32),
    Button(String, String, Option<ColorScheme>),
    Link(String, String, Option<ColorScheme>),
    Image(String, String, Option<u32>),
    List(Vec<String>, bool),
}

impl Draft {
    fn kind(&self) -> BlockKind {
        match self {
            Draft::Greeting(_) => BlockKind::Greeting,
            Draft::Paragraph(_) => BlockKind::Paragraph,
            Draft::Heading(..) => BlockKind::Heading,
            Draft::Divider => BlockKind::Divider,
            Draft::Spacer(_) => BlockKind::Spacer,
            Draft::Button(..) => BlockKind::Button,
            Draft::Link(..) => BlockKind::Link,
            Draft::Image(..) => BlockKind::Image,
            Draft::List(..) => BlockKind::List,
        }
    }

    /// Apply a scheme named by the block marker to a button or link.
    fn with_marked_scheme(self, marked: Option<ColorScheme>) -> Self {
        match (self, marked) {
            (Draft::Button(label, url, _), Some(scheme)) => Draft::Button(label, url, Some(scheme)),
            (Draft::Link(text, url, _), Some(scheme)) => Draft::Link(text, url, Some(scheme)),
            (draft, _) => draft,
        }
    }

    fn into_block(self, id: BlockId) -> Block {
        match self {
            Draft::Greeting(name_variable) => Block::Greeting(GreetingBlock { id, name_variable }),
            Draft::Paragraph(text) => Block::Paragraph(ParagraphBlock { id, text }),
            Draft::Heading(text, level) => Block::Heading(HeadingBlock { id, text, level }),
            Draft::Divider => Block::Divider(DividerBlock { id }),
            Draft::Spacer(height) => Block::Spacer(SpacerBlock { id, height }),
            Draft::Button(label, url_variable, color_scheme) => Block::Button(ButtonBlock {
                id,
                label,
                url_variable,
                color_scheme,
            }),
            Draft::Link(text, url_variable, color_scheme) => Block::Link(LinkBlock {
                id,
                text,
                url_variable,
                color_scheme,
            }),
            Draft::Image(content_id, alt, width) => Block::Image(ImageBlock {
                id,
                content_id,
                alt,
                width,
            }),
            Draft::List(items, ordered) => Block::List(ListBlock { id, items, ordered }),
        }
    }
}

/// Map one top-level element to a block, if it has a recognizable shape.
fn recognize(tag: &str, html: &str, scheme: ColorScheme) -> Option<Draft> {
    match tag {
        "p" => {
            let inner = inner_html(html)?.trim();
            if let Some(cap) = GREETING_RE.captures(inner) {
                return Some(Draft::Greeting(cap[1].to_string()));
            }
            if let Some(cap) = ONLY_ANCHOR_RE.captures(inner) {
                let attrs = &cap[1];
                if let Some(url_variable) = href_variable(attrs) {
                    let text = cap[2].trim().to_string();
                    if !text.is_empty() {
                        let override_scheme = style_color(attrs)
                            .and_then(scheme_for_color)
                            .filter(|s| *s != scheme);
                        return Some(Draft::Link(text, url_variable, override_scheme));
                    }
                }
            }
            (!inner.is_empty()).then(|| Draft::Paragraph(inner.to_string()))
        }
        "h1" | "h2" | "h3" => {
            let level = tag[1..].parse().ok()?;
            let text = inner_html(html)?.trim();
            (!text.is_empty()).then(|| Draft::Heading(text.to_string(), level))
        }
        "hr" => Some(Draft::Divider),
        "div" => {
            let inner = inner_html(html)?.trim();
            if inner != "&nbsp;" && !inner.is_empty() {
                return None;
            }
            let style = attribute(opening_tag(html), "style")?;
            let height = HEIGHT_RE.captures(style)?[1].parse().ok()?;
            (height > 0).then_some(Draft::Spacer(height))
        }
        "img" => {
            let open = opening_tag(html);
            let content_id = attribute(open, "src")?.strip_prefix("cid:")?;
            if !is_bare_content_id(content_id) {
                return None;
            }
            let alt = attribute(open, "alt").map(unescape_html).unwrap_or_default();
            let width = attribute(open, "width")
                .and_then(|w| w.parse::<u32>().ok())
                .filter(|w| *w > 0 && *w <= tokens::CONTENT_WIDTH);
            Some(Draft::Image(content_id.to_string(), alt, width))
        }
        "ul" | "ol" => {
            let items: Vec<String> = LIST_ITEM_RE
                .captures_iter(html)
                .map(|cap| cap[1].trim().to_string())
                .filter(|item| !item.is_empty())
                .collect();
            (!items.is_empty()).then(|| Draft::List(items, tag == "ol"))
        }
        "table" => recognize_button(html, scheme),
        _ => None,
    }
}

/// A presentation table holding exactly one anchor and no other text.
fn recognize_button(html: &str, scheme: ColorScheme) -> Option<Draft> {
    let mut anchors = ANCHOR_RE.captures_iter(html);
    let anchor = anchors.next()?;
    if anchors.next().is_some() {
        return None;
    }

    let whole = anchor.get(0)?;
    let mut rest = String::with_capacity(html.len());
    rest.push_str(&html[..whole.start()]);
    rest.push_str(&html[whole.end()..]);
    let leftover = STRIP_TAGS_RE.replace_all(&rest, "");
    if !leftover.replace("&nbsp;", "").trim().is_empty() {
        return None;
    }

    let url_variable = href_variable(&anchor[1])?;
    let label = anchor[2].trim().to_string();
    if label.is_empty() {
        return None;
    }
    let override_scheme = attribute(html, "bgcolor")
        .and_then(scheme_for_color)
        .filter(|s| *s != scheme);
    Some(Draft::Button(label, url_variable, override_scheme))
}

fn href_variable(attrs: &str) -> Option<String> {
    let href = attribute(attrs, "href")?.trim();
    TOKEN_ONLY_RE.captures(href).map(|cap| cap[1].to_string())
}

fn style_color(attrs: &str) -> Option<&str> {
    let style = attribute(attrs, "style")?;
    COLOR_RE.captures(style).and_then(|cap| cap.get(1)).map(|m| m.as_str())
}

fn scheme_for_color(color: &str) -> Option<ColorScheme> {
    ColorScheme::ALL
        .into_iter()
        .find(|s| s.palette().primary.eq_ignore_ascii_case(color))
}

fn opening_tag(html: &str) -> &str {
    html.find('>').map_or(html, |end| &html[..=end])
}

/// First value of attribute `name` in `html`.
fn attribute<'h>(html: &'h str, name: &str) -> Option<&'h str> {
    ATTR_RE
        .captures_iter(html)
        .find(|cap| cap[1].eq_ignore_ascii_case(name))
        .and_then(|cap| cap.get(2))
        .map(|m| m.as_str())
}

/// Markup between the opening tag and the final closing tag.
fn inner_html(html: &str) -> Option<&str> {
    let start = html.find('>')? + 1;
    let end = html.rfind("</")?;
    (start <= end).then(|| &html[start..end])
}

fn unescape_html(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn unescape_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn title_case(slug: &str) -> String {
    slug.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Index of the `}` closing an interpolation whose body starts at `from`.
fn expression_end(text: &str, from: usize) -> Option<usize> {
    let mut depth = 1usize;
    for (i, c) in text[from..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(from + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Index of the `}` closing an object literal whose body starts at `from`.
///
/// Braces inside quoted strings are ignored.
fn object_end(source: &str, from: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut quote = None;
    let mut depth = 1usize;
    let mut i = from;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(_) if b == b'\\' => i += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'\'' | b'"' | b'`' => quote = Some(b),
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }
    None
}

/// Index of the backtick closing a template literal whose body starts at `from`.
fn template_literal_end(source: &str, from: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => return Some(i),
            b'$' if bytes.get(i + 1) == Some(&b'{') => {
                i = expression_end(source, i + 2)? + 1;
            }
            _ => i += 1,
        }
    }
    None
}

struct Converted {
    text: String,
    /// Byte ranges of interpolations that are not plain variable reads.
    unsupported: Vec<Range<usize>>,
}

/// Unescape a template literal fragment and turn `${data.x}` into `{{x}}`.
fn convert_literal(raw: &str) -> Converted {
    let mut text = String::with_capacity(raw.len());
    let mut unsupported = Vec::new();
    let mut chars = raw.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, 'n')) => text.push('\n'),
                Some((_, 't')) => text.push('\t'),
                Some((_, other)) => text.push(other),
                None => text.push('\\'),
            },
            '$' if raw[i + 1..].starts_with('{') => {
                let Some(end) = expression_end(raw, i + 2) else {
                    text.push(c);
                    continue;
                };
                match INTERPOLATION_RE.captures(raw[i + 2..end].trim()) {
                    Some(cap) => text.push_str(&token(&cap[1])),
                    None => {
                        text.push_str(&raw[i..=end]);
                        unsupported.push(i..end + 1);
                    }
                }
                while chars.next_if(|&(j, _)| j <= end).is_some() {}
            }
            _ => text.push(c),
        }
    }

    Converted { text, unsupported }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SegmentKind {
    Comment,
    Text,
    Element { tag: String, closed: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    kind: SegmentKind,
    range: Range<usize>,
}

/// Split markup into top-level comments, elements and loose text runs.
fn segments(body: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut pos = 0;

    while pos < body.len() {
        let rest = &body[pos..];
        let trimmed = rest.trim_start();
        pos += rest.len() - trimmed.len();
        if trimmed.is_empty() {
            break;
        }

        if trimmed.starts_with("<!--") {
            let end = trimmed.find("-->").map_or(body.len(), |e| pos + e + 3);
            segments.push(Segment {
                kind: SegmentKind::Comment,
                range: pos..end,
            });
            pos = end;
            continue;
        }

        if let Some(cap) = TAG_RE.captures(trimmed)
            && let Some(open) = cap.get(0)
            && open.start() == 0
            && cap[1].is_empty()
        {
            let tag = cap[2].to_ascii_lowercase();
            let open_end = pos + open.end();
            if !cap[3].is_empty() || VOID_TAGS.contains(&tag.as_str()) {
                segments.push(Segment {
                    kind: SegmentKind::Element { tag, closed: true },
                    range: pos..open_end,
                });
                pos = open_end;
                continue;
            }

            let mut depth = 1usize;
            let mut end = None;
            for inner in TAG_RE.captures_iter(&body[open_end..]) {
                if !inner[2].eq_ignore_ascii_case(&tag) || !inner[3].is_empty() {
                    continue;
                }
                if inner[1].is_empty() {
                    depth += 1;
                } else {
                    depth -= 1;
                    if depth == 0 {
                        end = inner.get(0).map(|m| open_end + m.end());
                        break;
                    }
                }
            }
            let closed = end.is_some();
            let end = end.unwrap_or(body.len());
            segments.push(Segment {
                kind: SegmentKind::Element { tag, closed },
                range: pos..end,
            });
            pos = end;
            continue;
        }

        let skip = trimmed.chars().next().map_or(1, char::len_utf8);
        let end = trimmed[skip..]
            .find('<')
            .map_or(body.len(), |i| pos + skip + i);
        segments.push(Segment {
            kind: SegmentKind::Text,
            range: pos..end,
        });
        pos = end;
    }

    segments
}
