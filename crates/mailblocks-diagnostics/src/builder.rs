//! Builder API for diagnostic messages.
//!
//! The builder encourages the four-part message structure: title, problem,
//! details, hints.

use crate::diagnostic::{DetailItem, DetailKind, DiagnosticKind, DiagnosticMessage, SourceSpan};

/// Builder for creating diagnostic messages.
///
/// # Example
///
/// ```
/// use mailblocks_diagnostics::DiagnosticMessageBuilder;
///
/// let error = DiagnosticMessageBuilder::error("Missing subject")
///     .with_code("M-4-1")
///     .problem("The source must define `export const subject`")
///     .add_hint("Did the template build its subject inside a function?")
///     .build();
///
/// assert_eq!(error.title, "Missing subject");
/// assert_eq!(error.code, Some("M-4-1".to_string()));
/// assert_eq!(error.hints.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct DiagnosticMessageBuilder {
    kind: DiagnosticKind,
    title: String,
    code: Option<String>,
    problem: Option<String>,
    details: Vec<DetailItem>,
    hints: Vec<String>,
    location: Option<SourceSpan>,
}

impl DiagnosticMessageBuilder {
    pub fn new(kind: DiagnosticKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            code: None,
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

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set the problem statement (the "must" or "can't" sentence).
    pub fn problem(mut self, stmt: impl Into<String>) -> Self {
        self.problem = Some(stmt.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<SourceSpan>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Add an error detail (displayed with a cross bullet).
    pub fn add_detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(DetailItem {
            kind: DetailKind::Error,
            content: detail.into(),
            location: None,
        });
        self
    }

    /// Add an error detail pointing at its own span.
    pub fn add_detail_at(mut self, detail: impl Into<String>, location: impl Into<SourceSpan>) -> Self {
        self.details.push(DetailItem {
            kind: DetailKind::Error,
            content: detail.into(),
            location: Some(location.into()),
        });
        self
    }

    pub fn add_info(mut self, info: impl Into<String>) -> Self {
        self.details.push(DetailItem {
            kind: DetailKind::Info,
            content: info.into(),
            location: None,
        });
        self
    }

    pub fn add_note(mut self, note: impl Into<String>) -> Self {
        self.details.push(DetailItem {
            kind: DetailKind::Note,
            content: note.into(),
            location: None,
        });
        self
    }

    /// Add a hint for fixing the problem. Hints that suggest an action end with `?`.
    pub fn add_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    pub fn build(self) -> DiagnosticMessage {
        DiagnosticMessage {
            code: self.code,
            title: self.title,
            kind: self.kind,
            problem: self.problem,
            details: self.details,
            hints: self.hints,
            location: self.location,
        }
    }
}
