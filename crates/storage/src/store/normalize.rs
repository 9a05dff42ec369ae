#![forbid(unsafe_code)]

/// Canonical bytes for a user-supplied value.
///
/// Text that parses as JSON is stored compact with object keys sorted; any
/// other text is stored verbatim.
pub fn normalize_value(text: &str) -> Vec<u8> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(text) else {
        return text.as_bytes().to_vec();
    };
    serde_json::to_vec(&value).unwrap_or_else(|_| text.as_bytes().to_vec())
}
