//! JSON-RPC 2.0 protocol types for the dispatcher.
//!
//! This crate holds the message model, the parser that turns raw bodies into
//! messages, and the serializer that turns execution outcomes back into
//! response documents. It performs no I/O.

pub mod encoding;
pub mod error;
pub mod jsonrpc;
pub mod parser;
pub mod serializer;

pub use encoding::{Encoding, UnknownEncoding};
pub use error::{ErrorCode, ErrorObject, RpcError};
pub use jsonrpc::{BatchEntry, BatchRequest, Message, Params, Request, RequestId};
pub use parser::parse;
pub use serializer::{Outcome, batch_result, encode, single_result};
