//! Output formatting for model replies.
//!
//! Replaces `**bold**` markers with `<strong>` markup. Everything else in
//! the reply is passed through untouched; formatting must never fail a
//! response, so non-textual output is coerced to its JSON rendering with
//! a warning instead of being rejected.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::warn;

static BOLD: LazyLock<Regex> = LazyLock::new(|| {
    // Fixed pattern, construction cannot fail.
    Regex::new(r"\*\*(.*?)\*\*").unwrap()
});

/// Format a raw model reply for the HTTP response.
pub fn format_output(value: &Value) -> String {
    match value.as_str() {
        Some(text) => bold_to_strong(text),
        None => {
            warn!(kind = value_kind(value), "Non-string model output, coercing to text");
            value.to_string()
        }
    }
}

/// Replace every non-greedy `**…**` span with `<strong>…</strong>`.
fn bold_to_strong(text: &str) -> String {
    BOLD.replace_all(text, "<strong>$1</strong>").into_owned()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
