use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown contact method '{0}'")]
pub struct ParseContactError(pub String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("response did not include a submission id")]
    MissingId,
    #[error("response did not include {0}")]
    MissingField(&'static str),
}

/// Error body returned by the collection resource: `{"detail": ...}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorBody {
    /// Human-readable detail, if the body carried one.
    ///
    /// The backend sends a plain string for most failures, nests the string
    /// one level deeper for duplicate emails, and a list of `{ "msg": .. }`
    /// items for schema failures.
    pub fn message(&self) -> Option<String> {
        self.detail.as_ref().and_then(detail_text)
    }

    pub fn parse(raw: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(raw)
            .ok()
            .and_then(|body| body.message())
    }
}

fn detail_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        Value::Object(map) => map
            .get("detail")
            .or_else(|| map.get("msg"))
            .or_else(|| map.get("message"))
            .and_then(detail_text),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(detail_text).collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_plain_string_detail() {
        assert_eq!(
            ErrorBody::parse(r#"{"detail":"Submission not found"}"#).as_deref(),
            Some("Submission not found")
        );
    }

    #[test]
    fn unwraps_nested_duplicate_email_detail() {
        assert_eq!(
            ErrorBody::parse(r#"{"detail":{"detail":"Duplicate email"}}"#).as_deref(),
            Some("Duplicate email")
        );
    }

    #[test]
    fn joins_validation_item_messages() {
        let raw = r#"{"detail":[{"loc":["body","age"],"msg":"too young"},{"msg":"bad phone"}]}"#;
        assert_eq!(
            ErrorBody::parse(raw).as_deref(),
            Some("too young; bad phone")
        );
    }

    #[test]
    fn missing_or_blank_detail_yields_none() {
        assert_eq!(ErrorBody::parse("{}"), None);
        assert_eq!(ErrorBody::parse(r#"{"detail":"  "}"#), None);
        assert_eq!(ErrorBody::parse("<html>bad gateway</html>"), None);
    }
}
