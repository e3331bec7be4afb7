//! Request and Response message types.
//!
//! Defines the line format exchanged with a worker process: one JSON
//! object per line in each direction.

// ============================================================================
// Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::{Operation, Value};

// ============================================================================
// Line Encoding
// ============================================================================

/// Serializes a payload as one newline-terminated line.
///
/// Compact JSON escapes control characters inside strings, so the only
/// raw `\n` in the output is the terminator.
///
/// # Errors
///
/// Returns [`Error::Json`](crate::Error::Json) if the payload cannot be serialized.
pub fn encode_line<T: Serialize + ?Sized>(payload: &T) -> Result<Vec<u8>> {
    let mut line = serde_json::to_vec(payload)?;
    line.push(b'\n');
    Ok(line)
}

// ============================================================================
// Request
// ============================================================================

/// A computation request sent to a worker.
///
/// # Format
///
/// ```json
/// {"operation": "evaluate_expression", "args": {"expr": "1 + 1"}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Operation identifier the worker dispatches on.
    pub operation: String,

    /// Operation arguments.
    #[serde(default)]
    pub args: BTreeMap<String, Value>,
}

impl Request {
    /// Creates a request with no arguments.
    #[inline]
    #[must_use]
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            args: BTreeMap::new(),
        }
    }

    /// Creates a request for a known operation.
    #[inline]
    #[must_use]
    pub fn for_operation(operation: Operation) -> Self {
        Self::new(operation.name())
    }

    /// Adds one argument.
    #[inline]
    #[must_use]
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    /// Replaces all arguments.
    #[inline]
    #[must_use]
    pub fn with_args(mut self, args: BTreeMap<String, Value>) -> Self {
        self.args = args;
        self
    }
}

// ============================================================================
// Text
// ============================================================================

/// A display string or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Text {
    /// Single string.
    One(String),
    /// Several strings, e.g. one per solution.
    Many(Vec<String>),
}

impl Text {
    /// Returns the strings as a list.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::One(s) => vec![s.clone()],
            Self::Many(items) => items.clone(),
        }
    }
}

// ============================================================================
// Response
// ============================================================================

/// A parsed worker response line.
///
/// # Format
///
/// Success:
/// ```json
/// {"pretty": {"expr": "1 + 1"}, "image": "<base64 png>", "answer": "2"}
/// ```
///
/// Failure:
/// ```json
/// {"name": "ParsingError", "message": "1+ is invalid"}
/// ```
///
/// Fault (unknown operation or unhandled exception in the worker):
/// ```json
/// {"error": "Unknown operation: frobnicate"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    /// The operation produced a result.
    Success {
        /// Display strings keyed by label.
        pretty: BTreeMap<String, Text>,
        /// Rendered image, base64 encoded.
        #[serde(default)]
        image: Option<String>,
        /// Machine-readable answer.
        #[serde(default)]
        answer: Option<Text>,
    },

    /// The operation rejected its input.
    Failure {
        /// Error kind, e.g. `ParsingError`.
        name: String,
        /// Human-readable message.
        message: String,
    },

    /// The worker could not run the operation at all.
    Fault {
        /// Description of the fault.
        error: String,
    },
}

impl Response {
    /// Parses one raw response line as returned by a dispatch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if the line matches none
    /// of the response shapes.
    pub fn parse(line: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(line)?)
    }

    /// Returns `true` if this is a success response.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns `true` if the worker reported an error of either kind.
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        !self.is_success()
    }

    /// Returns the answer of a success response.
    #[inline]
    #[must_use]
    pub fn answer(&self) -> Option<&Text> {
        match self {
            Self::Success { answer, .. } => answer.as_ref(),
            _ => None,
        }
    }

    /// Returns the error message of a failure or fault.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { message, .. } => Some(message),
            Self::Fault { error } => Some(error),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn test_request_serialization() {
        let request = Request::for_operation(Operation::EvaluateExpression).arg("expr", "1 + 1");
        let json = serde_json::to_string(&request).expect("serialize");

        assert_eq!(
            json,
            r#"{"operation":"evaluate_expression","args":{"expr":"1 + 1"}}"#
        );
    }

    #[test]
    fn test_request_nested_args() {
        let request = Request::new("graph_func_multiple")
            .arg("funcs", vec!["x", "x^2"])
            .arg("xlim", vec![-5, 5])
            .arg("dark", true);

        let parsed: Request =
            serde_json::from_str(&serde_json::to_string(&request).unwrap()).unwrap();
        assert_eq!(parsed, request);
    }

    #[test]
    fn test_request_missing_args_defaults_empty() {
        let request: Request = serde_json::from_str(r#"{"operation":"display_text"}"#).unwrap();
        assert!(request.args.is_empty());
    }

    #[test]
    fn test_encode_line_is_terminated() {
        let line = encode_line(&Request::new("x").arg("s", "a\nb")).unwrap();
        assert_eq!(line.last(), Some(&b'\n'));
        assert_eq!(line.iter().filter(|&&b| b == b'\n').count(), 1);
    }

    #[test]
    fn test_success_response() {
        let line = b"{\"pretty\": {\"expr\": \"1 + 1\"}, \"image\": \"abc\", \"answer\": \"2\"}\n";
        let response = Response::parse(line).expect("parse");

        assert!(response.is_success());
        assert_eq!(response.answer(), Some(&Text::One("2".to_string())));
        assert_eq!(response.error_message(), None);
    }

    #[test]
    fn test_success_response_list_answer_and_null() {
        let response =
            Response::parse(br#"{"pretty": {"sols": ["1", "-1"]}, "image": "i", "answer": ["1", "-1"]}"#)
                .unwrap();
        assert_eq!(
            response.answer().map(Text::to_vec),
            Some(vec!["1".to_string(), "-1".to_string()])
        );

        let response =
            Response::parse(br#"{"pretty": {"text": "hi"}, "image": "i", "answer": null}"#).unwrap();
        assert!(response.is_success());
        assert!(response.answer().is_none());
    }

    #[test]
    fn test_failure_response() {
        let response =
            Response::parse(br#"{"name": "ParsingError", "message": "1+ is invalid"}"#).unwrap();

        assert!(response.is_error());
        assert_eq!(
            response,
            Response::Failure {
                name: "ParsingError".to_string(),
                message: "1+ is invalid".to_string(),
            }
        );
    }

    #[test]
    fn test_fault_response() {
        let response = Response::parse(br#"{"error": "Unknown operation: nope"}"#).unwrap();
        assert_eq!(response.error_message(), Some("Unknown operation: nope"));
    }

    #[test]
    fn test_unrecognized_response() {
        assert!(Response::parse(br#"{"answer": "2"}"#).is_err());
        assert!(Response::parse(b"not json").is_err());
    }

    proptest! {
        #[test]
        fn prop_encoded_request_is_single_line(expr in ".*", key in "[a-z]{1,8}") {
            let line = encode_line(&Request::new("evaluate_expression").arg(key, expr)).unwrap();
            prop_assert_eq!(line.iter().filter(|&&b| b == b'\n').count(), 1);
            prop_assert_eq!(line.last(), Some(&b'\n'));
        }
    }
}
