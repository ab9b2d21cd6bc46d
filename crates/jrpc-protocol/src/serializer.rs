//! Outcome values → JSON-RPC response structures.

use serde_json::Value;

use crate::encoding::Encoding;
use crate::error::RpcError;
use crate::jsonrpc::{RequestId, SuccessResponse};

/// The result of executing one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success {
        id: Option<RequestId>,
        result: Value,
    },
    Failure(RpcError),
}

impl Outcome {
    pub fn success(id: Option<RequestId>, result: Value) -> Self {
        Self::Success { id, result }
    }

    pub fn id(&self) -> Option<&RequestId> {
        match self {
            Self::Success { id, .. } => id.as_ref(),
            Self::Failure(err) => err.id.as_ref(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

impl From<RpcError> for Outcome {
    fn from(err: RpcError) -> Self {
        Self::Failure(err)
    }
}

/// Response object for one outcome, or `None` when there is nobody to
/// answer (no id).
pub fn single_result(outcome: &Outcome) -> Option<Value> {
    try_single_result(outcome).unwrap_or_else(|e| Some(RpcError::internal(e.to_string()).as_response()))
}

fn try_single_result(outcome: &Outcome) -> Result<Option<Value>, serde_json::Error> {
    let Some(id) = outcome.id() else {
        return Ok(None);
    };
    match outcome {
        Outcome::Failure(err) => Ok(Some(err.as_response())),
        Outcome::Success { result, .. } => {
            serde_json::to_value(SuccessResponse::new(id, result)).map(Some)
        }
    }
}

/// Response array for a batch. Entries without an id are dropped.
///
/// If any entry cannot be rendered the whole batch degrades to a single
/// internal-error object rather than a partial array.
pub fn batch_result(outcomes: &[Outcome]) -> Value {
    let mut res = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match try_single_result(outcome) {
            Ok(Some(value)) => res.push(value),
            Ok(None) => {}
            Err(e) => return RpcError::internal(e.to_string()).as_response(),
        }
    }
    Value::Array(res)
}

/// Serialize a response document into body bytes.
pub fn encode(response: &Value, encoding: Encoding) -> Vec<u8> {
    encoding.encode(&response.to_string())
}
