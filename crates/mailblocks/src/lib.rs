/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Semantic email blocks.
//!
//! An email is modeled as a [`Template`]: a subject, a header, a footer and an
//! ordered list of typed [`Block`]s. This crate provides:
//!
//! - the block model and template envelope ([`block`], [`template`])
//! - the variable registry and `{{name}}` extractor ([`variables`])
//! - a deterministic renderer with substitute and preserve modes ([`render`])
//! - an importer for legacy template modules ([`import`])
//! - a code generator back into that module format ([`codegen`])
//! - the catalog of system templates ([`catalog`])
//! - an explicit editing session ([`draft`])
//!
//! All operations are synchronous and free of I/O.
//!
//! # Example
//!
//! ```
//! use mailblocks::{Block, Header, RenderMode, Template, VariableValues, render};
//!
//! let template = Template::new(
//!     "payment-reminder",
//!     "Payment Reminder",
//!     "Invoice {{invoice_number}}",
//!     Header::new("Payment due"),
//! )
//! .with_blocks(vec![Block::greeting("hello")]);
//!
//! let mut values = VariableValues::new();
//! values.insert("customer_name".to_string(), "Jane".to_string());
//!
//! let email = render(&template, &values, RenderMode::Substitute).unwrap();
//! assert!(email.html.contains("Hi Jane,"));
//! assert_eq!(email.unresolved, vec!["invoice_number"]);
//! ```

pub mod block;
pub mod catalog;
pub mod codegen;
pub mod draft;
pub mod error;
pub mod import;
pub mod render;
pub mod style;
pub mod template;
pub mod variables;

// Re-export main types at crate root
pub use block::{Block, BlockField, BlockId, BlockKind, InfoItem, Step};
pub use catalog::{SystemTemplate, find_system_template, system_templates, templates_in_category};
pub use codegen::generate;
pub use draft::{EditCommand, TemplateDraft};
pub use error::{ModelError, RenderError, RenderResult};
pub use import::{ParseResult, parse};
pub use render::{
    LegacyShell, MarkupShell, RenderMode, RenderOptions, RenderedEmail, ShellOptions, render,
    render_content, render_with, render_with_shell,
};
pub use style::ColorScheme;
pub use template::{
    Footer, FooterKind, Header, Template, TemplateLoadError, VariableDeclaration,
};
pub use variables::{
    VariableCategory, VariableDefinition, VariableKind, VariableValues, check_variables,
    extract_template_variables, extract_variables, is_valid_variable, lookup_variable,
    variables_by_category, variables_for_context,
};
