//! Outfit warning formatting
//!
//! Outfit generation attaches warnings that arrive either as plain strings
//! or as objects (`{"type": "weather", "message": "..."}`). Both shapes are
//! accepted and rendered to a single line of text for display. Any other
//! JSON value is kept as-is and rendered compactly; `null` renders empty.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A warning attached to an outfit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum OutfitWarning {
    Text(String),
    Detail(Map<String, Value>),
    Other(Value),
}

impl OutfitWarning {
    /// Render the warning for display
    pub fn display_text(&self) -> String {
        match self {
            OutfitWarning::Text(s) => s.trim().to_string(),
            OutfitWarning::Detail(obj) => {
                let message = obj.get("message").and_then(value_text);
                let kind = obj
                    .get("type")
                    .or_else(|| obj.get("kind"))
                    .and_then(value_text);

                match (kind, message) {
                    (Some(kind), Some(message)) => format!("{}: {}", kind, message),
                    (None, Some(message)) => message,
                    (_, None) if obj.is_empty() => String::new(),
                    (_, None) => Value::Object(obj.clone()).to_string(),
                }
            }
            OutfitWarning::Other(Value::Null) => String::new(),
            OutfitWarning::Other(value) => value.to_string(),
        }
    }
}

impl std::fmt::Display for OutfitWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_text())
    }
}

impl From<&str> for OutfitWarning {
    fn from(s: &str) -> Self {
        OutfitWarning::Text(s.to_string())
    }
}

/// Render a list of warnings, dropping any that come out empty
pub fn format_warnings(warnings: &[OutfitWarning]) -> Vec<String> {
    warnings
        .iter()
        .map(OutfitWarning::display_text)
        .filter(|s| !s.is_empty())
        .collect()
}

fn value_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Vec<OutfitWarning> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_mixed_string_and_object_warnings() {
        let warnings = parse(
            r#"[
                "Rain expected this afternoon",
                {"type": "weather", "message": "Cold front incoming"},
                {"message": "Shoes clash with belt"}
            ]"#,
        );

        assert_eq!(
            format_warnings(&warnings),
            vec![
                "Rain expected this afternoon",
                "weather: Cold front incoming",
                "Shoes clash with belt",
            ]
        );
    }

    #[test]
    fn test_object_without_message_falls_back_to_json() {
        let warnings = parse(r#"[{"severity": "high"}]"#);
        assert_eq!(format_warnings(&warnings), vec![r#"{"severity":"high"}"#]);
    }

    #[test]
    fn test_kind_alias_and_empty_entries() {
        let warnings = parse(r#"["  ", {}, {"kind": "fit", "message": "Sleeves run long"}]"#);
        assert_eq!(format_warnings(&warnings), vec!["fit: Sleeves run long"]);
    }

    #[test]
    fn test_non_object_entries_render_as_json() {
        let warnings = parse(r#"[null, 42, true, ["a", "b"], "Too warm"]"#);
        assert_eq!(warnings[1], OutfitWarning::Other(serde_json::json!(42)));
        assert_eq!(
            format_warnings(&warnings),
            vec!["42", "true", r#"["a","b"]"#, "Too warm"]
        );
    }

    #[test]
    fn test_display_impl() {
        let w = OutfitWarning::from("Too formal for the occasion");
        assert_eq!(w.to_string(), "Too formal for the occasion");
    }
}
