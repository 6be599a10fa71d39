/*
 * variables.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Variable references, the variable registry and the extractor.
//!
//! A reference is exactly `{{identifier}}` where the identifier matches
//! `[A-Za-z0-9_]+`. There is no whitespace tolerance, no nesting and no
//! filter syntax. Matching is case-sensitive.
//!
//! The registry is the set of variables the system knows how to supply, with
//! the template contexts each one is valid in. It is embedded at compile time
//! and parsed once.

use crate::block::BlockField;
use crate::template::Template;
use mailblocks_diagnostics::{DiagnosticMessage, DiagnosticMessageBuilder};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Values supplied for variable references at render time.
pub type VariableValues = BTreeMap<String, String>;

/// Context entry that makes a definition valid in every template.
pub const ANY_CONTEXT: &str = "*";

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").expect("valid token regex"));

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("valid identifier regex"));

static REGISTRY: Lazy<Vec<VariableDefinition>> = Lazy::new(|| {
    let json = include_str!("../data/variable_registry.json");
    serde_json::from_str(json).expect("Invalid variable registry JSON")
});

/// Semantic type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VariableKind {
    #[default]
    Text,
    Url,
    Date,
    Money,
    /// Inline image data (`data:image/...;base64,...`).
    Base64Image,
}

impl VariableKind {
    pub const ALL: [VariableKind; 5] = [
        VariableKind::Text,
        VariableKind::Url,
        VariableKind::Date,
        VariableKind::Money,
        VariableKind::Base64Image,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            VariableKind::Text => "text",
            VariableKind::Url => "url",
            VariableKind::Date => "date",
            VariableKind::Money => "money",
            VariableKind::Base64Image => "base64-image",
        }
    }

    pub fn from_id(id: &str) -> Result<Self, crate::error::ModelError> {
        VariableKind::ALL
            .into_iter()
            .find(|kind| kind.id() == id)
            .ok_or_else(|| crate::error::ModelError::UnknownVariableKind(id.to_string()))
    }
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Registry grouping. There are exactly four, shown in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableCategory {
    Customer,
    Payment,
    Service,
    Action,
}

impl VariableCategory {
    pub const ALL: [VariableCategory; 4] = [
        VariableCategory::Customer,
        VariableCategory::Payment,
        VariableCategory::Service,
        VariableCategory::Action,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            VariableCategory::Customer => "customer",
            VariableCategory::Payment => "payment",
            VariableCategory::Service => "service",
            VariableCategory::Action => "action",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            VariableCategory::Customer => "Customer",
            VariableCategory::Payment => "Payment",
            VariableCategory::Service => "Service",
            VariableCategory::Action => "Actions & Links",
        }
    }
}

impl fmt::Display for VariableCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDefinition {
    pub name: String,
    pub label: String,
    pub kind: VariableKind,
    pub category: VariableCategory,
    pub example: String,
    /// Template contexts this variable is valid in; `"*"` means all of them.
    pub available_in: Vec<String>,
}

impl VariableDefinition {
    pub fn is_available_in(&self, context: &str) -> bool {
        self.available_in
            .iter()
            .any(|c| c == ANY_CONTEXT || c == context)
    }

    /// The reference token for this variable.
    pub fn token(&self) -> String {
        token(&self.name)
    }
}

/// Check whether `name` is a valid variable identifier.
pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER_RE.is_match(name)
}

/// Format a reference token for `name`.
pub fn token(name: &str) -> String {
    format!("{{{{{}}}}}", name)
}

/// Read a field that names a single variable.
///
/// Accepts both the bare form (`customer_name`) and the token form
/// (`{{customer_name}}`). Returns `None` for anything else.
pub fn variable_name(field: &str) -> Option<&str> {
    let name = field
        .strip_prefix("{{")
        .and_then(|rest| rest.strip_suffix("}}"))
        .unwrap_or(field);
    is_valid_identifier(name).then_some(name)
}

/// Extract the distinct variable names referenced in `text`, in first-seen order.
///
/// ```
/// use mailblocks::variables::extract_variables;
///
/// let names = extract_variables("{{a}} and {{b}} and {{a}} again, {{ c }}");
/// assert_eq!(names, vec!["a", "b"]);
/// ```
pub fn extract_variables(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    collect_into(text, &mut seen, &mut names);
    names
}

fn collect_into(text: &str, seen: &mut HashSet<String>, names: &mut Vec<String>) {
    for cap in TOKEN_RE.captures_iter(text) {
        let name = &cap[1];
        if seen.insert(name.to_string()) {
            names.push(name.to_string());
        }
    }
}

/// Iterate over every `{{name}}` match in `text` with its byte range.
pub(crate) fn token_matches(text: &str) -> impl Iterator<Item = (std::ops::Range<usize>, &str)> {
    TOKEN_RE.captures_iter(text).filter_map(|cap| {
        let whole = cap.get(0)?;
        let name = cap.get(1)?;
        Some((whole.range(), name.as_str()))
    })
}

/// Extract every variable referenced anywhere in a template, in rendering order.
///
/// Covers subject, preheader, header, block content and the footer note.
pub fn extract_template_variables(template: &Template) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();

    collect_into(&template.subject, &mut seen, &mut names);
    if let Some(preheader) = &template.preheader {
        collect_into(preheader, &mut seen, &mut names);
    }
    if let Some(emoji) = &template.header.emoji {
        collect_into(emoji, &mut seen, &mut names);
    }
    collect_into(&template.header.title, &mut seen, &mut names);
    if let Some(subtitle) = &template.header.subtitle {
        collect_into(subtitle, &mut seen, &mut names);
    }

    for block in &template.blocks {
        for field in block.fields() {
            match field {
                BlockField::Text(_, text) => collect_into(text, &mut seen, &mut names),
                BlockField::Variable(_, value) => {
                    if let Some(name) = variable_name(value)
                        && seen.insert(name.to_string())
                    {
                        names.push(name.to_string());
                    }
                }
            }
        }
    }

    if let Some(note) = &template.footer.note {
        collect_into(note, &mut seen, &mut names);
    }

    names
}

/// All registry entries, in registry order.
pub fn registry() -> &'static [VariableDefinition] {
    &REGISTRY
}

pub fn lookup_variable(name: &str) -> Option<&'static VariableDefinition> {
    REGISTRY.iter().find(|def| def.name == name)
}

/// Check whether `name` is a known variable that is valid in `context`.
pub fn is_valid_variable(name: &str, context: &str) -> bool {
    lookup_variable(name).is_some_and(|def| def.is_available_in(context))
}

/// Registry entries valid in `context`, in registry order.
pub fn variables_for_context(context: &str) -> Vec<&'static VariableDefinition> {
    REGISTRY
        .iter()
        .filter(|def| def.is_available_in(context))
        .collect()
}

/// Registry entries grouped by category, categories in their fixed order.
///
/// With a context only the entries valid there are included. Empty
/// categories are kept so callers always see all four groups.
pub fn variables_by_category(
    context: Option<&str>,
) -> Vec<(VariableCategory, Vec<&'static VariableDefinition>)> {
    VariableCategory::ALL
        .into_iter()
        .map(|category| {
            let defs = REGISTRY
                .iter()
                .filter(|def| def.category == category)
                .filter(|def| context.is_none_or(|ctx| def.is_available_in(ctx)))
                .collect();
            (category, defs)
        })
        .collect()
}

/// Example values for every variable the template references.
///
/// Variables the registry does not know get no value, so they stay visible
/// as tokens in a preview.
pub fn example_values(template: &Template) -> VariableValues {
    extract_template_variables(template)
        .into_iter()
        .filter_map(|name| lookup_variable(&name).map(|def| (name, def.example.clone())))
        .collect()
}

/// Advisory checks for the variables a template references.
///
/// Produces a warning for each reference the template does not declare, and
/// for each reference the registry does not consider valid in the template's
/// context. Never fails; rendering works regardless.
pub fn check_variables(template: &Template) -> Vec<DiagnosticMessage> {
    let context = template.context();
    let mut diagnostics = Vec::new();

    for name in extract_template_variables(template) {
        if !template.declares(&name) {
            diagnostics.push(
                DiagnosticMessageBuilder::warning("Undeclared variable")
                    .with_code("M-2-1")
                    .problem(format!(
                        "`{}` is referenced but not declared by template `{}`",
                        token(&name),
                        template.slug
                    ))
                    .add_hint(format!("Add `{}` to the template's variables", name))
                    .build(),
            );
        }

        match lookup_variable(&name) {
            Some(def) if def.is_available_in(context) => {}
            Some(def) => diagnostics.push(
                DiagnosticMessageBuilder::warning("Variable not available in this context")
                    .with_code("M-2-2")
                    .problem(format!(
                        "`{}` is not supplied for `{}` emails",
                        token(&name),
                        context
                    ))
                    .add_info(format!("Available in: {}", def.available_in.join(", ")))
                    .build(),
            ),
            None => diagnostics.push(
                DiagnosticMessageBuilder::warning("Unknown variable")
                    .with_code("M-2-2")
                    .problem(format!("`{}` is not in the variable registry", token(&name)))
                    .add_note("It will render as a literal token unless a value is supplied")
                    .build(),
            ),
        }
    }

    diagnostics
}
