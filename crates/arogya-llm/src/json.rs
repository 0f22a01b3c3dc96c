//! Pulling structured JSON out of free-form completions.
//!
//! Models wrap JSON in markdown fences, prepend chatter, or append notes.
//! [`extract_json`] finds the first balanced object; [`parse_json`]
//! deserializes it into a typed value.

use serde::de::DeserializeOwned;

use arogya_core::{Error, Result};

/// Return the first balanced `{...}` object in `text`, if any.
///
/// Braces inside JSON strings are ignored when balancing.
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Deserialize the first JSON object found in a completion.
pub fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T> {
    let raw = extract_json(text)
        .ok_or_else(|| Error::Parse(format!("no JSON object in model output: {}", preview(text))))?;
    serde_json::from_str(raw).map_err(|e| Error::Parse(format!("{}: {}", e, preview(raw))))
}

fn preview(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(120) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
