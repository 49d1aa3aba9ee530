//! Platform-specific configuration types and utilities.
//!
//! Extractors receive their options as a loosely-typed `extras` JSON value;
//! this module turns it into typed configuration and provides the merge
//! helper used to layer several sources (config file, command line).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// AfreecaTV extractor configuration.
///
/// Both API hosts can be overridden, e.g. to go through a proxy or to point
/// the extractors at a local test server.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AfreecaTvConfig {
    /// Base URL of the legacy XML API (default: `http://afbbs.afreecatv.com:8080`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Base URL of the global JSON API (default: `http://api.afreeca.tv`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_api_base: Option<String>,
}

impl AfreecaTvConfig {
    pub const DEFAULT_API_BASE: &str = "http://afbbs.afreecatv.com:8080";
    pub const DEFAULT_GLOBAL_API_BASE: &str = "http://api.afreeca.tv";

    /// Reads the configuration out of extractor extras. Never fails: a
    /// malformed value falls back to the defaults.
    pub fn from_extras(extras: Option<&Value>) -> Self {
        let Some(extras) = extras else {
            return Self::default();
        };
        match serde_json::from_value(extras.clone()) {
            Ok(config) => config,
            Err(e) => {
                debug!(error = %e, "Invalid AfreecaTV extras; using defaults");
                Self::default()
            }
        }
    }

    pub fn api_base(&self) -> &str {
        base_or(self.api_base.as_deref(), Self::DEFAULT_API_BASE)
    }

    pub fn global_api_base(&self) -> &str {
        base_or(self.global_api_base.as_deref(), Self::DEFAULT_GLOBAL_API_BASE)
    }
}

fn base_or<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.trim_end_matches('/'),
        _ => default,
    }
}

/// Merge two JSON objects, with overlay taking precedence.
///
/// This function performs a shallow merge of JSON objects. For nested objects,
/// the overlay completely replaces the base value (no deep merge).
///
/// # Example
/// ```
/// use serde_json::json;
/// use afreecatv_parser::extractor::platform_configs::merge_platform_extras;
///
/// let base = Some(json!({"api_base": "http://a", "global_api_base": "http://b"}));
/// let overlay = Some(json!({"api_base": "http://c"}));
/// let merged = merge_platform_extras(base, overlay);
/// assert_eq!(merged, Some(json!({"api_base": "http://c", "global_api_base": "http://b"})));
/// ```
pub fn merge_platform_extras(base: Option<Value>, overlay: Option<Value>) -> Option<Value> {
    match (base, overlay) {
        (None, None) => None,
        (Some(b), None) => Some(b),
        (None, Some(o)) => Some(o),
        (Some(Value::Object(mut base_map)), Some(Value::Object(overlay_map))) => {
            for (k, v) in overlay_map {
                // Skip null values - they don't override
                if !v.is_null() {
                    base_map.insert(k, v);
                }
            }
            Some(Value::Object(base_map))
        }
        // If either is not an object, overlay wins
        (_, Some(o)) => Some(o),
    }
}
