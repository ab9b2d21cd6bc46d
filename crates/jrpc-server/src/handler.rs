//! Handler descriptors and the error type handlers return.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use jrpc_protocol::{Params, RequestId, RpcError};
use serde_json::{Value, json};

/// What a handler can fail with.
///
/// `Rpc` errors are forwarded to the caller as-is (with the id corrected);
/// anything else is reported as a generic application error.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Rpc(#[from] RpcError),
    #[error(transparent)]
    Application(#[from] anyhow::Error),
    #[error("{0}")]
    Panic(String),
}

/// Result from a method handler.
pub type HandlerResult = Result<Value, HandlerError>;

type Callable = dyn Fn(Params) -> HandlerResult + Send + Sync;

/// A callable plus its exposure and atomicity flags.
#[derive(Clone)]
pub struct Method {
    callable: Arc<Callable>,
    exposed: bool,
    atomic: bool,
}

impl Method {
    /// Wrap a handler. The method starts out unexposed and non-atomic.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Params) -> HandlerResult + Send + Sync + 'static,
    {
        Self {
            callable: Arc::new(f),
            exposed: false,
            atomic: false,
        }
    }

    /// Make the method reachable by remote callers.
    pub fn expose(mut self) -> Self {
        self.exposed = true;
        self
    }

    /// Always run this method on the thread that received the batch.
    pub fn atomic(mut self) -> Self {
        self.atomic = true;
        self
    }

    pub fn is_exposed(&self) -> bool {
        self.exposed
    }

    pub fn is_atomic(&self) -> bool {
        self.atomic
    }

    /// Invoke the handler, converting a panic into [`HandlerError::Panic`].
    pub fn call(&self, params: Params) -> HandlerResult {
        match catch_unwind(AssertUnwindSafe(|| (self.callable)(params))) {
            Ok(result) => result,
            Err(payload) => {
                let msg = if let Some(s) = payload.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = payload.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "handler panicked".to_string()
                };
                Err(HandlerError::Panic(msg))
            }
        }
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("exposed", &self.exposed)
            .field("atomic", &self.atomic)
            .finish_non_exhaustive()
    }
}

impl HandlerError {
    /// Normalize into the error sent back for request `id`.
    pub fn into_rpc_error(self, id: RequestId) -> RpcError {
        match self {
            Self::Rpc(err) => err.with_id(Some(id)),
            Self::Application(err) => {
                let causes: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
                let rpc = RpcError::application(Some(id), err.to_string());
                if causes.is_empty() {
                    rpc
                } else {
                    rpc.with_data(json!(causes))
                }
            }
            Self::Panic(msg) => RpcError::application(Some(id), msg).with_data(json!("panic")),
        }
    }
}
