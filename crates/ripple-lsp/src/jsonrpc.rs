//! JSON-RPC 2.0 message types exchanged with the editor.

use lsp_types::NumberOrString;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const JSONRPC_VERSION: &str = "2.0";

/// Error codes the server answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The payload was not valid JSON.
    ParseError,
    /// The payload was JSON but not a JSON-RPC message.
    InvalidRequest,
    /// The method is not handled by this server.
    MethodNotFound,
    /// The request parameters did not match the method.
    InvalidParams,
    /// The request failed inside the server.
    InternalError,
    /// A request arrived before a successful `initialize`.
    ServerNotInitialized,
}

impl ErrorCode {
    /// Numeric code sent on the wire.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::ParseError => -32_700,
            Self::InvalidRequest => -32_600,
            Self::MethodNotFound => -32_601,
            Self::InvalidParams => -32_602,
            Self::InternalError => -32_603,
            Self::ServerNotInitialized => -32_002,
        }
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseError {
    /// Error code.
    pub code: i64,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ResponseError {
    /// Builds an error without data.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
            data: None,
        }
    }

    /// Attaches structured data.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// An incoming message classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// A request expecting a response.
    Request {
        /// Request identifier echoed in the response.
        id: NumberOrString,
        /// Method name.
        method: String,
        /// Parameters, `null` when absent.
        params: Value,
    },
    /// A notification.
    Notification {
        /// Method name.
        method: String,
        /// Parameters, `null` when absent.
        params: Value,
    },
    /// A response to a request the server sent.
    Response {
        /// Identifier of the answered request.
        id: Option<NumberOrString>,
        /// Result on success.
        result: Option<Value>,
        /// Error on failure.
        error: Option<ResponseError>,
    },
}

#[derive(Deserialize)]
struct RawMessage {
    #[serde(default)]
    id: Option<NumberOrString>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ResponseError>,
}

impl Message {
    /// Parses and classifies a framed payload.
    ///
    /// # Errors
    ///
    /// Returns a [`ResponseError`] with [`ErrorCode::ParseError`] for invalid
    /// JSON and [`ErrorCode::InvalidRequest`] for JSON that is neither a
    /// request, a notification, nor a response.
    pub fn parse(payload: &[u8]) -> Result<Self, ResponseError> {
        let raw: RawMessage = serde_json::from_slice(payload)
            .map_err(|error| ResponseError::new(ErrorCode::ParseError, error.to_string()))?;
        let params = raw.params.unwrap_or(Value::Null);
        match (raw.id, raw.method) {
            (Some(id), Some(method)) => Ok(Self::Request { id, method, params }),
            (None, Some(method)) => Ok(Self::Notification { method, params }),
            (None, None) if raw.result.is_none() && raw.error.is_none() => Err(
                ResponseError::new(
                    ErrorCode::InvalidRequest,
                    "message has neither a method nor an id",
                ),
            ),
            (id, None) => Ok(Self::Response {
                id,
                result: raw.result,
                error: raw.error,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
enum Outcome {
    #[serde(rename = "result")]
    Result(Value),
    #[serde(rename = "error")]
    Error(ResponseError),
}

/// A response sent to the editor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    jsonrpc: &'static str,
    id: Option<NumberOrString>,
    #[serde(flatten)]
    outcome: Outcome,
}

impl Response {
    /// A successful response.
    #[must_use]
    pub const fn success(id: Option<NumberOrString>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            outcome: Outcome::Result(result),
        }
    }

    /// A failed response.
    #[must_use]
    pub const fn failure(id: Option<NumberOrString>, error: ResponseError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            outcome: Outcome::Error(error),
        }
    }

    /// The error carried by a failed response.
    #[must_use]
    pub const fn error(&self) -> Option<&ResponseError> {
        match &self.outcome {
            Outcome::Error(error) => Some(error),
            Outcome::Result(_) => None,
        }
    }
}

/// A request the server sends to the editor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingRequest {
    jsonrpc: &'static str,
    id: NumberOrString,
    method: String,
    params: Value,
}

impl OutgoingRequest {
    /// Builds a request with the given identifier.
    #[must_use]
    pub fn new(id: i32, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id: NumberOrString::Number(id),
            method: method.into(),
            params,
        }
    }
}
