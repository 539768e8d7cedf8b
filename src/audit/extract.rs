//! Recovering the task array from free-form model output.

use crate::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Opening fences with an optional language tag, and bare closing fences.
static CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```[A-Za-z0-9_+-]*").unwrap());

/// Isolate and parse the JSON array embedded in `raw`.
///
/// Markdown fences are removed, then the text between the first `[` and the last `]`
/// (inclusive) is parsed. The elements are returned without any schema check.
pub fn extract_json_array(raw: &str) -> Result<Vec<Value>, ExtractError> {
    let cleaned = CODE_FENCE.replace_all(raw, "");

    let start = cleaned.find('[').ok_or(ExtractError::NoArray)?;
    let end = cleaned.rfind(']').ok_or(ExtractError::NoArray)?;
    if end < start {
        return Err(ExtractError::NoArray);
    }

    serde_json::from_str::<Vec<Value>>(&cleaned[start..=end])
        .map_err(|e| ExtractError::MalformedJson(e.to_string()))
}
