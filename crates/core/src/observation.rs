//! Observations — what a tool invocation produced.

use serde::{Serialize, Serializer};

/// Arguments passed to a tool, exactly as the planner supplied them.
pub type Args = serde_json::Map<String, serde_json::Value>;

/// The structured output of a successful tool invocation.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// The result of invoking a tool: either its payload or an error message.
///
/// Serializes as the payload object itself, or as `{"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    Payload(Payload),
    Error(String),
}

impl Observation {
    /// Build an error observation.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The error message, if this observation is an error.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            Self::Payload(_) => None,
        }
    }

    /// The wire form of this observation.
    pub fn to_value(&self) -> serde_json::Value {
        match self {
            Self::Payload(payload) => serde_json::Value::Object(payload.clone()),
            Self::Error(message) => serde_json::json!({ "error": message }),
        }
    }

    /// Compact JSON text of the wire form.
    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }
}

impl Serialize for Observation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Payload(payload) => payload.serialize(serializer),
            Self::Error(message) => {
                use serde::ser::SerializeMap;
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", message)?;
                map.end()
            }
        }
    }
}

impl From<Payload> for Observation {
    fn from(payload: Payload) -> Self {
        Self::Payload(payload)
    }
}

/// Truncate `text` to at most `max_chars` characters without splitting one.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_serializes_as_the_map_itself() {
        let mut payload = Payload::new();
        payload.insert("is_holiday".into(), json!(true));
        let obs = Observation::from(payload);
        assert_eq!(serde_json::to_value(&obs).unwrap(), json!({"is_holiday": true}));
        assert_eq!(obs.to_json(), r#"{"is_holiday":true}"#);
        assert!(!obs.is_error());
    }

    #[test]
    fn error_serializes_under_error_key() {
        let obs = Observation::error("Unknown tool 'x'.");
        assert_eq!(
            serde_json::to_value(&obs).unwrap(),
            json!({"error": "Unknown tool 'x'."})
        );
        assert_eq!(obs.error_message(), Some("Unknown tool 'x'."));
        assert_eq!(obs.to_value(), serde_json::to_value(&obs).unwrap());
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
        assert_eq!(truncate_chars("abc", 0), "");
    }
}
