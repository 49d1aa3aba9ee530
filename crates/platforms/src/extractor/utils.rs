use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::extractor::error::ExtractorError;

#[inline]
pub fn capture_named<'a>(re: &Regex, input: &'a str, name: &str) -> Option<&'a str> {
    re.captures(input)
        .and_then(|caps| caps.name(name))
        .map(|m| m.as_str())
}

#[inline]
pub fn capture_named_or_invalid_url<'a>(
    re: &Regex,
    input: &'a str,
    name: &str,
) -> Result<&'a str, ExtractorError> {
    capture_named(re, input, name).ok_or_else(|| ExtractorError::InvalidUrl(input.to_string()))
}

/// Lenient integer conversion: numbers, numeric strings and float values are
/// accepted, anything else is `None`.
pub fn int_or_none(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => str_int_or_none(s),
        _ => None,
    }
}

#[inline]
pub fn str_int_or_none(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

/// Serde adapter for optional numeric fields that may arrive as numbers,
/// strings, `null` or garbage.
pub fn deserialize_int_or_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(int_or_none(&value).and_then(|n| T::try_from(n).ok()))
}

/// Serde adapter treating `null` like a missing field.
pub fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Serde adapter for optional text fields; empty strings and non-string
/// values are treated as absent.
pub fn deserialize_non_empty_str<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    })
}
