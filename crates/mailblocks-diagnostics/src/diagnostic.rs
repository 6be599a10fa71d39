//! Core diagnostic message types.
//!
//! This module defines the structures used to report problems found while
//! validating, rendering, or importing email templates. Messages follow a
//! tidyverse-style layout: title, problem statement, details, hints.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// The kind of diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    /// An error that prevents completion
    Error,
    /// A warning that doesn't prevent completion but indicates a problem
    Warning,
    /// Informational message
    Info,
}

impl DiagnosticKind {
    /// Label used as the prefix of text output.
    pub fn label(&self) -> &'static str {
        match self {
            DiagnosticKind::Error => "Error",
            DiagnosticKind::Warning => "Warning",
            DiagnosticKind::Info => "Info",
        }
    }
}

/// How detail items should be presented (tidyverse x/i bullet style).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailKind {
    /// Error detail (✖ bullet)
    Error,
    /// Info detail (ℹ bullet)
    Info,
    /// Note detail (plain bullet)
    Note,
}

impl DetailKind {
    fn bullet(&self) -> &'static str {
        match self {
            DetailKind::Error => "✖",
            DetailKind::Info => "ℹ",
            DetailKind::Note => "•",
        }
    }
}

/// A byte range in a source text.
///
/// Spans are half-open: `start` is inclusive, `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
}

impl SourceSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Shift this span by `offset` bytes.
    ///
    /// Used when a span was computed against a slice of a larger source.
    pub fn offset_by(self, offset: usize) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for SourceSpan {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

/// A named source text that diagnostics can point into.
#[derive(Debug, Clone, Copy)]
pub struct SourceFile<'a> {
    pub name: &'a str,
    pub content: &'a str,
}

impl<'a> SourceFile<'a> {
    pub fn new(name: &'a str, content: &'a str) -> Self {
        Self { name, content }
    }
}

/// A detail item in a diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailItem {
    pub kind: DetailKind,
    pub content: String,
    /// Optional source location for this detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceSpan>,
}

/// A diagnostic message.
///
/// Structure:
/// 1. **Code**: Optional error code (e.g., "M-4-1") for searchability
/// 2. **Title**: Brief message
/// 3. **Kind**: Error, Warning, Info
/// 4. **Problem**: What went wrong
/// 5. **Details**: Specific information (bulleted)
/// 6. **Hints**: Optional guidance for fixing
/// 7. **Location**: Optional span in the source the diagnostic refers to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    pub title: String,

    pub kind: DiagnosticKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<DetailItem>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceSpan>,
}

impl DiagnosticMessage {
    /// Create a new diagnostic message with just a title and kind.
    ///
    /// Prefer [`DiagnosticMessageBuilder`](crate::DiagnosticMessageBuilder) for anything
    /// with a problem statement or details.
    pub fn new(kind: DiagnosticKind, title: impl Into<String>) -> Self {
        Self {
            code: None,
            title: title.into(),
            kind,
            problem: None,
            details: Vec::new(),
            hints: Vec::new(),
            location: None,
        }
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Error, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Warning, title)
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Info, title)
    }

    /// Set the error code.
    ///
    /// Codes follow the format `M-<subsystem>-<number>` (e.g., "M-4-1").
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<SourceSpan>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.kind == DiagnosticKind::Error
    }

    /// Get the documentation URL for this diagnostic, if it has a catalogued code.
    pub fn docs_url(&self) -> Option<&str> {
        self.code
            .as_ref()
            .and_then(|code| crate::catalog::get_docs_url(code))
    }

    /// Render this diagnostic as text.
    ///
    /// Format:
    /// ```text
    /// Error [M-4-1]: title
    /// Problem statement here
    /// ✖ Error detail
    /// ℹ Info detail
    /// ? Hint
    /// ```
    ///
    /// When `source` is given and the diagnostic has a location, the title and
    /// problem are replaced by an annotated source excerpt.
    pub fn to_text(&self, source: Option<SourceFile<'_>>) -> String {
        use std::fmt::Write;

        let mut result = String::new();

        let excerpt = match (self.location, source) {
            (Some(span), Some(file)) => self.render_source_context(span, file),
            _ => None,
        };

        match excerpt {
            Some(excerpt) => {
                result.push_str(&excerpt);
                // The excerpt already carries located details
                for detail in self.details.iter().filter(|d| d.location.is_none()) {
                    let _ = writeln!(result, "{} {}", detail.kind.bullet(), detail.content);
                }
            }
            None => {
                match &self.code {
                    Some(code) => {
                        let _ = writeln!(result, "{} [{}]: {}", self.kind.label(), code, self.title);
                    }
                    None => {
                        let _ = writeln!(result, "{}: {}", self.kind.label(), self.title);
                    }
                }
                if let Some(problem) = &self.problem {
                    let _ = writeln!(result, "{}", problem);
                }
                for detail in &self.details {
                    let _ = writeln!(result, "{} {}", detail.kind.bullet(), detail.content);
                }
            }
        }

        for hint in &self.hints {
            let _ = writeln!(result, "? {}", hint);
        }

        result
    }

    /// Render this diagnostic as a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    fn render_source_context(&self, span: SourceSpan, file: SourceFile<'_>) -> Option<String> {
        use ariadne::{Color, Config, Label, Report, ReportKind, Source};

        let content_len = file.content.len();
        if span.start > content_len {
            return None;
        }
        let main_span = char_range(file.content, span);

        let (report_kind, main_color) = match self.kind {
            DiagnosticKind::Error => (ReportKind::Error, Color::Red),
            DiagnosticKind::Warning => (ReportKind::Warning, Color::Yellow),
            DiagnosticKind::Info => (ReportKind::Advice, Color::Cyan),
        };

        let name = file.name.to_string();
        let mut report = Report::build(report_kind, name.clone(), main_span.start)
            .with_config(Config::default().with_color(false));

        report = match &self.code {
            Some(code) => report.with_message(format!("[{}] {}", code, self.title)),
            None => report.with_message(&self.title),
        };

        let main_message = self.problem.as_deref().unwrap_or(&self.title);
        report = report.with_label(
            Label::new((name.clone(), main_span))
                .with_message(main_message)
                .with_color(main_color),
        );

        for detail in &self.details {
            if let Some(detail_span) = detail.location {
                if detail_span.start > content_len {
                    continue;
                }
                let detail_color = match detail.kind {
                    DetailKind::Error => Color::Red,
                    DetailKind::Info => Color::Cyan,
                    DetailKind::Note => Color::Blue,
                };
                report = report.with_label(
                    Label::new((name.clone(), char_range(file.content, detail_span)))
                        .with_message(&detail.content)
                        .with_color(detail_color),
                );
            }
        }

        let mut output = Vec::new();
        report
            .finish()
            .write((name, Source::from(file.content)), &mut output)
            .ok()?;

        String::from_utf8(output).ok()
    }
}

/// Spans are byte offsets; ariadne counts characters.
fn char_range(content: &str, span: SourceSpan) -> std::ops::Range<usize> {
    let to_char = |byte: usize| {
        content
            .char_indices()
            .take_while(|(i, _)| *i < byte.min(content.len()))
            .count()
    };
    to_char(span.start)..to_char(span.end)
}
