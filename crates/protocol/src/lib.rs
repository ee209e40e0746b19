//! # Atlas Protocol
//!
//! Wire types shared by the HTTP service and the retrieval crates: the
//! structured error envelope, citation/result records, and request
//! validators that collect every violated constraint instead of stopping at
//! the first.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const CODE_BAD_REQUEST: &str = "BAD_REQUEST";
pub const CODE_NOT_FOUND: &str = "NOT_FOUND";
pub const CODE_INTERNAL: &str = "INTERNAL";

/// `{error: {code, message, details}}`, the only error shape the service
/// ever emits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub details: Value,
}

impl ErrorEnvelope {
    pub fn new(code: &str, message: impl Into<String>, details: Value) -> Self {
        Self {
            error: ErrorBody {
                code: code.to_string(),
                message: message.into(),
                details,
            },
        }
    }

    pub fn bad_request(violations: &[String]) -> Self {
        let message = violations.first().cloned().unwrap_or_default();
        Self::new(
            CODE_BAD_REQUEST,
            message,
            json!({ "violations": violations }),
        )
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(CODE_NOT_FOUND, message, json!({}))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(CODE_INTERNAL, message, json!({}))
    }
}

/// A cited location inside a vault document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Citation {
    pub path: String,
    pub anchor: Option<String>,
    pub quote: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindResponse {
    pub term: String,
    pub results: Vec<Citation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    pub citations: Vec<Citation>,
}

/// Validated `/context/current` parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextParams {
    pub max_sources: Option<usize>,
    pub include: Vec<String>,
}

/// Validated `/find` parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindParams {
    pub term: String,
    pub max_results: Option<usize>,
}

/// Validated `/query` parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pub question: String,
}

/// Accept only integers within `[min, max]`; floats, strings and
/// out-of-range values are violations.
fn clamp_int(value: &Value, min: i64, max: i64) -> Option<i64> {
    // as_i64 is None for floats and strings, so 2.5 and "10" both fail here.
    let num = value.as_i64()?;
    (min..=max).contains(&num).then_some(num)
}

fn validate_bounded_int(
    body: &Value,
    field: &str,
    violations: &mut Vec<String>,
) -> Option<usize> {
    match body.get(field) {
        None | Some(Value::Null) => None,
        Some(raw) => match clamp_int(raw, 1, 50) {
            Some(num) => Some(num as usize),
            None => {
                violations.push(format!("{field} must be an integer 1-50"));
                None
            }
        },
    }
}

pub fn validate_context_request(body: &Value) -> Result<ContextParams, Vec<String>> {
    let mut violations = Vec::new();
    let max_sources = validate_bounded_int(body, "max_sources", &mut violations);

    let include = match body.get("include") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => {
            let mut paths = Vec::new();
            for item in items {
                match item.as_str() {
                    Some(path) => paths.push(path.to_string()),
                    None => {
                        violations.push("include entries must be strings".to_string());
                        break;
                    }
                }
            }
            paths
        }
        Some(_) => {
            violations.push("include must be an array of paths".to_string());
            Vec::new()
        }
    };

    if violations.is_empty() {
        Ok(ContextParams {
            max_sources,
            include,
        })
    } else {
        Err(violations)
    }
}

pub fn validate_find_request(body: &Value) -> Result<FindParams, Vec<String>> {
    let mut violations = Vec::new();
    let term = body
        .get("term")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or("")
        .to_string();
    if term.is_empty() {
        violations.push("term is required".to_string());
    }
    let max_results = validate_bounded_int(body, "max_results", &mut violations);

    if violations.is_empty() {
        Ok(FindParams { term, max_results })
    } else {
        Err(violations)
    }
}

pub fn validate_query_request(body: &Value) -> Result<QueryParams, Vec<String>> {
    let question = body
        .get("question")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or("")
        .to_string();
    if question.is_empty() {
        return Err(vec!["question is required".to_string()]);
    }
    Ok(QueryParams { question })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn context_accepts_defaults() {
        let params = validate_context_request(&json!({})).unwrap();
        assert_eq!(params.max_sources, None);
        assert!(params.include.is_empty());
    }

    #[test]
    fn context_rejects_out_of_range_and_non_integers() {
        assert!(validate_context_request(&json!({"max_sources": 100})).is_err());
        assert!(validate_context_request(&json!({"max_sources": 0})).is_err());
        assert!(validate_context_request(&json!({"max_sources": 2.5})).is_err());
        assert!(validate_context_request(&json!({"max_sources": "ten"})).is_err());
        assert!(validate_context_request(&json!({"max_sources": 50})).is_ok());
    }

    #[test]
    fn context_rejects_non_array_include() {
        let err = validate_context_request(&json!({"include": "vault/x.md"})).unwrap_err();
        assert_eq!(err, vec!["include must be an array of paths".to_string()]);
    }

    #[test]
    fn context_collects_every_violation() {
        let err =
            validate_context_request(&json!({"max_sources": 999, "include": 7})).unwrap_err();
        assert_eq!(err.len(), 2);
    }

    #[test]
    fn find_requires_non_blank_term() {
        assert!(validate_find_request(&json!({})).is_err());
        assert!(validate_find_request(&json!({"term": "   "})).is_err());
        let params = validate_find_request(&json!({"term": " vault ", "max_results": 5})).unwrap();
        assert_eq!(params.term, "vault");
        assert_eq!(params.max_results, Some(5));
    }

    #[test]
    fn envelope_shape_is_stable() {
        let envelope = ErrorEnvelope::bad_request(&["term is required".to_string()]);
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["error"]["code"], "BAD_REQUEST");
        assert_eq!(value["error"]["details"]["violations"][0], "term is required");
    }
}
