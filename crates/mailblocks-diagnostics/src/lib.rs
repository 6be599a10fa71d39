//! Structured diagnostics for the mailblocks template toolchain.
//!
//! Every advisory or fatal condition that the importer, the variable checker
//! or the renderer wants to surface to a human is a [`DiagnosticMessage`]:
//!
//! - a [`DiagnosticKind`] (error, warning, info)
//! - an optional catalogued code (`M-<subsystem>-<n>`, see [`catalog`])
//! - a title, an optional problem statement, details and hints
//! - an optional [`SourceSpan`] into the text that was being processed
//!
//! Messages render to plain text, to JSON, or, when the source is available,
//! to an annotated excerpt via `ariadne`.

pub mod builder;
pub mod catalog;
pub mod diagnostic;

pub use builder::DiagnosticMessageBuilder;
pub use catalog::{ERROR_CATALOG, ErrorCodeInfo, get_docs_url, get_error_info, get_subsystem};
pub use diagnostic::{
    DetailItem, DetailKind, DiagnosticKind, DiagnosticMessage, SourceFile, SourceSpan,
};
