//! JSON-RPC error values and the fixed error-code vocabulary.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::jsonrpc::RequestId;

/// Error codes understood by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // JSON-RPC 2.0 standard errors
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,

    // Server errors
    ApplicationError,
    Timeout,
    UserError,

    Custom(i32),
}

impl ErrorCode {
    pub fn code(&self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::ApplicationError => -32000,
            Self::Timeout => -32001,
            Self::UserError => -32100,
            Self::Custom(c) => *c,
        }
    }

    pub fn from_code(code: i32) -> Self {
        match code {
            -32700 => Self::ParseError,
            -32600 => Self::InvalidRequest,
            -32601 => Self::MethodNotFound,
            -32602 => Self::InvalidParams,
            -32603 => Self::InternalError,
            -32000 => Self::ApplicationError,
            -32001 => Self::Timeout,
            -32100 => Self::UserError,
            c => Self::Custom(c),
        }
    }

    /// Default human-readable message for the code.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ParseError => "Parse Error",
            Self::InvalidRequest => "Invalid Request",
            Self::MethodNotFound => "Method Not Found",
            Self::InvalidParams => "Invalid Parameters",
            Self::InternalError => "Internal Error",
            Self::ApplicationError => "Application Error",
            Self::Timeout => "Timeout",
            Self::UserError | Self::Custom(_) => "Unknown Error",
        }
    }
}

/// Wire shape of the `error` member of a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A protocol-level error bound to the request it answers.
///
/// Produced by the parser for malformed input, by the engine for lookup
/// failures and timeouts, and by handlers that want to control the code
/// their caller sees.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("JSON-RPC error [{code}]: {message}")]
pub struct RpcError {
    pub id: Option<RequestId>,
    pub code: i32,
    pub message: String,
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(id: Option<RequestId>, code: ErrorCode) -> Self {
        Self {
            id,
            code: code.code(),
            message: code.default_message().to_string(),
            data: None,
        }
    }

    /// A handler-raised error with an explicit message and the default
    /// user-error code.
    pub fn user(message: impl Into<String>) -> Self {
        Self {
            id: None,
            code: ErrorCode::UserError.code(),
            message: message.into(),
            data: None,
        }
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = code.code();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_id(mut self, id: Option<RequestId>) -> Self {
        self.id = id;
        self
    }

    pub fn invalid_request(id: Option<RequestId>) -> Self {
        Self::new(id, ErrorCode::InvalidRequest)
    }

    pub fn method_not_found(id: Option<RequestId>) -> Self {
        Self::new(id, ErrorCode::MethodNotFound)
    }

    pub fn invalid_params(id: Option<RequestId>) -> Self {
        Self::new(id, ErrorCode::InvalidParams)
    }

    pub fn internal(data: impl Into<String>) -> Self {
        Self::new(None, ErrorCode::InternalError).with_data(Value::String(data.into()))
    }

    pub fn application(id: Option<RequestId>, message: impl Into<String>) -> Self {
        Self::new(id, ErrorCode::ApplicationError).with_message(message)
    }

    pub fn timeout(id: Option<RequestId>) -> Self {
        Self::new(id, ErrorCode::Timeout)
    }

    pub fn error_code(&self) -> ErrorCode {
        ErrorCode::from_code(self.code)
    }

    pub fn to_object(&self) -> ErrorObject {
        ErrorObject {
            code: self.code,
            message: self.message.clone(),
            data: self.data.clone(),
        }
    }

    /// Full response envelope. The id is rendered as `null` when absent.
    pub fn as_response(&self) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": self.id,
            "error": self.to_object(),
        })
    }
}
