//! Turns free-form model output into a [`ClassificationOutput`].
//!
//! Two coercions are applied and nothing else is repaired:
//! a surrounding markdown code fence is removed before parsing, and a
//! string-typed `confidence_score` is converted to an integer (0 when it
//! holds no number).

use serde_json::Value;
use tracing::warn;

use crate::domain::{ClassificationOutput, DomainError};

/// Fields whose absence makes a payload unusable.
pub const REQUIRED_FIELDS: [&str; 2] = ["document_id", "primary_classification"];

/// Characters of raw model output quoted in a parse error.
const EXCERPT_CHARS: usize = 100;

const FENCE: &str = "```";

/// Remove a fenced code block wrapper (```` ```json ... ``` ````) if the whole
/// trimmed text is one. Anything else is returned trimmed but untouched.
pub fn strip_json_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed
        .strip_prefix(FENCE)
        .and_then(|rest| rest.strip_suffix(FENCE))
    else {
        return trimmed;
    };

    let tag_len = inner
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(inner.len());
    let body = inner[tag_len..].trim();

    if body.is_empty() {
        trimmed
    } else {
        body
    }
}

/// Parse, validate and normalize one analysis response.
pub fn parse_classification(raw: &str) -> Result<ClassificationOutput, DomainError> {
    let json_text = strip_json_fence(raw);

    let mut value: Value = serde_json::from_str(json_text).map_err(|e| {
        warn!("Model output is not valid JSON: {e}");
        DomainError::parse(format!(
            "Failed to parse JSON from AI response ({e}). Raw text: \"{}...\"",
            excerpt(raw)
        ))
    })?;

    let Some(object) = value.as_object_mut() else {
        return Err(DomainError::contract(
            "AI response has an unexpected format: expected a JSON object",
        ));
    };

    for field in REQUIRED_FIELDS {
        if !object.get(field).is_some_and(is_truthy) {
            warn!("Model output is missing required field `{field}`");
            return Err(DomainError::contract(format!(
                "AI response has an unexpected format: missing `{field}`"
            )));
        }
    }

    // Explicit nulls fall back to the record defaults.
    object.retain(|_, v| !v.is_null());

    if let Some(score) = object.get_mut("confidence_score") {
        *score = Value::from(coerce_confidence(score));
    }

    serde_json::from_value(value).map_err(|e| {
        DomainError::contract(format!("AI response has an unexpected format: {e}"))
    })
}

fn coerce_confidence(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => parse_leading_integer(s).unwrap_or(0),
        _ => 0,
    }
}

/// Leading-integer parse: optional whitespace and sign, then digits.
/// `"85%"` yields 85, `"abc"` yields `None`.
fn parse_leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let digits: &str = &digits[..digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len())];
    if digits.is_empty() {
        return None;
    }

    let magnitude = digits.bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn excerpt(raw: &str) -> String {
    raw.chars().take(EXCERPT_CHARS).collect()
}
