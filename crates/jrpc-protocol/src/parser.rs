//! Raw bytes → [`Message`].
//!
//! Parsing never fails in the Rust sense: every malformed input becomes an
//! [`RpcError`] value that flows through the engine like any other outcome.

use serde_json::Value;

use crate::encoding::Encoding;
use crate::error::RpcError;
use crate::jsonrpc::{BatchEntry, BatchRequest, Message, Params, Request, RequestId};

/// Decode and validate one request body.
pub fn parse(raw: &[u8], encoding: Encoding) -> Message {
    let data = match decode(raw, encoding) {
        Ok(data) => data,
        Err(reason) => {
            return Message::Single(Err(
                RpcError::invalid_request(None).with_data(Value::String(reason))
            ));
        }
    };

    match data {
        Value::Array(items) => Message::Batch(parse_batch(items)),
        other => Message::Single(parse_single(other)),
    }
}

fn decode(raw: &[u8], encoding: Encoding) -> Result<Value, String> {
    let text = encoding.decode(raw)?;
    serde_json::from_str(&text).map_err(|e| e.to_string())
}

/// Build a batch, replacing each invalid element with its error in place.
pub fn parse_batch(items: Vec<Value>) -> BatchRequest {
    items.into_iter().map(parse_single).collect()
}

/// Validate a single envelope, stopping at the first failing check.
pub fn parse_single(data: Value) -> BatchEntry {
    let Value::Object(mut obj) = data else {
        return Err(RpcError::invalid_request(None));
    };

    let id = RequestId::from_value(obj.get("id"))?;

    if obj.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
        return Err(RpcError::invalid_request(id));
    }

    let method = match obj.remove("method") {
        Some(Value::String(method)) if !method.is_empty() => method,
        _ => return Err(RpcError::invalid_request(id)),
    };

    let params = match obj.remove("params") {
        None => Params::default(),
        Some(Value::Array(args)) => Params::positional(args),
        Some(Value::Object(kwargs)) => Params::named(kwargs),
        Some(_) => return Err(RpcError::invalid_params(id)),
    };

    Ok(Request::new(id, method, params))
}
