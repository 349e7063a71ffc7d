use serde_json::Value;
use tracing::{debug, instrument};

const FENCE: &str = "```";
const JSON_TAG: &str = "json";

/// Pull the JSON payload out of raw model text.
///
/// Strategy (in order):
/// - If the trimmed text already starts with `{` or `[`, return it as is.
/// - Otherwise return the trimmed body of the first fenced code block, with an
///   optional (case-insensitive) `json` tag stripped.
/// - Otherwise return the trimmed text and let the JSON parser report the problem.
#[instrument(target = "quizmaster::json", skip(text), fields(text_len = text.len()))]
pub fn extract_json(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return trimmed.to_string();
    }

    match fenced_block(trimmed) {
        Some(inner) => {
            debug!(target: "quizmaster::json", inner_len = inner.len(), "extracted fenced block");
            inner.to_string()
        }
        None => trimmed.to_string(),
    }
}

fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find(FENCE)?;
    let mut rest = &text[open + FENCE.len()..];
    if rest
        .get(..JSON_TAG.len())
        .is_some_and(|tag| tag.eq_ignore_ascii_case(JSON_TAG))
    {
        rest = &rest[JSON_TAG.len()..];
    }
    let close = rest.find(FENCE)?;
    Some(rest[..close].trim())
}

/// Integral JSON number, including floats with no fractional part (`2.0`).
pub fn as_integer(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    // f64 -> i64 saturates; the range check keeps huge values from aliasing.
    (f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15).then_some(f as i64)
}

/// Like [`as_integer`], but also accepts numeric strings such as `"3"`.
pub fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(|f| as_integer(&Value::from(f))))
        }
        other => as_integer(other),
    }
}
