//! JSON-RPC 2.0 message model.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RpcError;

/// JSON-RPC 2.0 request ID: any JSON scalar other than `null`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl RequestId {
    /// Interpret the `id` member of an envelope.
    ///
    /// `Ok(None)` for a missing or `null` id (a notification). Objects and
    /// arrays are rejected as an invalid request.
    pub fn from_value(value: Option<&Value>) -> Result<Option<Self>, RpcError> {
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(Self::String(s.clone()))),
            Some(Value::Number(n)) => Ok(Some(Self::Number(n.clone()))),
            Some(Value::Bool(b)) => Ok(Some(Self::Bool(*b))),
            Some(_) => Err(RpcError::invalid_request(None)),
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s:?}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Call arguments. At most one of `args` / `kwargs` is populated, matching
/// whether the wire `params` was an array or an object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    pub args: Vec<Value>,
    pub kwargs: Map<String, Value>,
}

impl Params {
    pub fn positional(args: Vec<Value>) -> Self {
        Self {
            args,
            kwargs: Map::new(),
        }
    }

    pub fn named(kwargs: Map<String, Value>) -> Self {
        Self {
            args: Vec::new(),
            kwargs,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty() && self.kwargs.is_empty()
    }

    /// Bind an argument by keyword if the call used named params, otherwise
    /// by position.
    pub fn get<T: DeserializeOwned>(&self, index: usize, name: &str) -> Result<T, RpcError> {
        match self.raw(index, name) {
            Some(value) => convert(value, name),
            None => Err(RpcError::invalid_params(None)
                .with_message(format!("Missing argument '{name}'"))),
        }
    }

    /// Like [`Params::get`], but a missing argument yields `None`.
    pub fn get_opt<T: DeserializeOwned>(
        &self,
        index: usize,
        name: &str,
    ) -> Result<Option<T>, RpcError> {
        match self.raw(index, name) {
            Some(Value::Null) | None => Ok(None),
            Some(value) => convert(value, name).map(Some),
        }
    }

    fn raw(&self, index: usize, name: &str) -> Option<&Value> {
        if self.kwargs.is_empty() {
            self.args.get(index)
        } else {
            self.kwargs.get(name)
        }
    }
}

fn convert<T: DeserializeOwned>(value: &Value, name: &str) -> Result<T, RpcError> {
    T::deserialize(value).map_err(|e| {
        RpcError::invalid_params(None).with_message(format!("Invalid argument '{name}': {e}"))
    })
}

/// A validated JSON-RPC 2.0 request. `id == None` marks a notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub id: Option<RequestId>,
    pub method: String,
    pub params: Params,
}

impl Request {
    pub fn new(id: Option<RequestId>, method: impl Into<String>, params: Params) -> Self {
        Self {
            id,
            method: method.into(),
            params,
        }
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// One element of a batch: a request, or the error that replaced it.
pub type BatchEntry = Result<Request, RpcError>;

/// An ordered batch. One malformed element never invalidates the others.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchRequest {
    pub requests: Vec<BatchEntry>,
}

impl BatchRequest {
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

impl FromIterator<BatchEntry> for BatchRequest {
    fn from_iter<I: IntoIterator<Item = BatchEntry>>(iter: I) -> Self {
        Self {
            requests: iter.into_iter().collect(),
        }
    }
}

/// Everything the parser can hand back for one incoming body.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Single(BatchEntry),
    Batch(BatchRequest),
}

/// JSON-RPC 2.0 success response.
#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse<'a> {
    pub jsonrpc: &'a str,
    pub id: &'a RequestId,
    pub result: &'a Value,
}

impl<'a> SuccessResponse<'a> {
    pub fn new(id: &'a RequestId, result: &'a Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result,
        }
    }
}
