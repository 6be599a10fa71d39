//! Error code catalog and lookup.
//!
//! Maps diagnostic codes (like "M-4-1") to their metadata. The catalog is
//! embedded at compile time from `error_catalog.json`.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata for a diagnostic code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorCodeInfo {
    /// Subsystem name (e.g., "model", "render", "import")
    pub subsystem: String,

    pub title: String,

    pub message_template: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_url: Option<String>,

    /// When this code was introduced (version)
    pub since_version: String,
}

/// Global error catalog, parsed lazily from the embedded JSON.
///
/// # Panics
///
/// Panics if the embedded JSON is invalid, which only happens if the catalog
/// file was edited incorrectly.
pub static ERROR_CATALOG: Lazy<HashMap<String, ErrorCodeInfo>> = Lazy::new(|| {
    let json_data = include_str!("../error_catalog.json");
    serde_json::from_str(json_data).expect("Invalid error catalog JSON - this is a bug in mailblocks")
});

pub fn get_error_info(code: &str) -> Option<&ErrorCodeInfo> {
    ERROR_CATALOG.get(code)
}

pub fn get_docs_url(code: &str) -> Option<&str> {
    ERROR_CATALOG
        .get(code)
        .and_then(|info| info.docs_url.as_deref())
}

/// Get the subsystem name for a code.
///
/// ```
/// use mailblocks_diagnostics::catalog::get_subsystem;
///
/// assert_eq!(get_subsystem("M-4-1"), Some("import"));
/// ```
pub fn get_subsystem(code: &str) -> Option<&str> {
    ERROR_CATALOG.get(code).map(|info| info.subsystem.as_str())
}
