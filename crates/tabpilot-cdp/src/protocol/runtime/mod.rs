//! Runtime domain types.
//!
//! JavaScript evaluation in the page.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event method names of the Runtime domain.
pub const EVENTS: &[&str] = &[
    "Runtime.consoleAPICalled",
    "Runtime.exceptionThrown",
    "Runtime.executionContextCreated",
];

/// Parameters for Runtime.evaluate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateParams {
    /// Expression to evaluate.
    pub expression: String,
    /// Whether the result should be a JSON object sent by value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_by_value: Option<bool>,
    /// Whether execution should await any resulting promise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub await_promise: Option<bool>,
}

impl EvaluateParams {
    /// Evaluate `expression`, returning the result by value and awaiting
    /// promises.
    pub fn expression(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            return_by_value: Some(true),
            await_promise: Some(true),
        }
    }
}

/// Mirror object referencing the original JavaScript object.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObject {
    /// Object type.
    #[serde(rename = "type")]
    pub object_type: String,
    /// Remote object value for primitive or JSON-serializable values.
    pub value: Option<Value>,
    /// String representation of the object.
    pub description: Option<String>,
    /// Unique object identifier for non-primitive values.
    pub object_id: Option<String>,
}

/// Detailed information about an exception.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionDetails {
    /// Exception id.
    pub exception_id: i64,
    /// Exception text.
    pub text: String,
    /// Line number of the exception location (0-based).
    pub line_number: i64,
    /// Column number of the exception location (0-based).
    pub column_number: i64,
    /// Exception object.
    pub exception: Option<RemoteObject>,
}

/// Result for Runtime.evaluate.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResult {
    /// Evaluation result.
    pub result: RemoteObject,
    /// Exception details when the evaluation threw.
    pub exception_details: Option<ExceptionDetails>,
}
