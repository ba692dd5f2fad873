//! Argument extraction for tools that declare [`InputFormat::Json`].
//!
//! The dispatcher has already coerced free text into a JSON object by
//! the time these run, so malformed JSON here means the model sent a
//! broken `{...}` literal.
//!
//! [`InputFormat::Json`]: rustedreason_core::tool::InputFormat::Json

use rustedreason_core::error::ToolError;

/// Parse `input` as a JSON object and pull out the string field `key`.
pub fn required_str(input: &str, key: &str) -> Result<String, ToolError> {
    let value: serde_json::Value = serde_json::from_str(input)
        .map_err(|e| ToolError::InvalidInput(format!("expected a JSON object: {e}")))?;

    value
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ToolError::InvalidInput(format!("Missing '{key}' argument")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_field() {
        let path = required_str(r#"{"path": " notes.txt "}"#, "path").unwrap();
        assert_eq!(path, "notes.txt");
    }

    #[test]
    fn missing_field() {
        let err = required_str(r#"{"other": "x"}"#, "path").unwrap_err();
        assert_eq!(err.to_string(), "invalid input: Missing 'path' argument");
    }

    #[test]
    fn non_string_field() {
        assert!(required_str(r#"{"path": 3}"#, "path").is_err());
    }

    #[test]
    fn broken_json() {
        let err = required_str("{path", "path").unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }
}
