//! Execution engine: resolves, invokes and schedules requests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use jrpc_protocol::{
    BatchEntry, BatchRequest, Message, Outcome, Request, RpcError, batch_result, encode, parse,
    single_result,
};
use jrpc_transport::RequestHandler;
use serde_json::{Value, json};
use tracing::{debug, error};

use crate::config::{ConfigError, EngineConfig};
use crate::hooks::{NoopHooks, WorkerHooks};
use crate::pool;
use crate::registry::Registry;

/// Dispatches parsed messages against a frozen [`Registry`].
///
/// Cloning is cheap; clones share the registry, hooks and worker counter.
#[derive(Clone)]
pub struct Engine {
    registry: Arc<Registry>,
    config: EngineConfig,
    hooks: Arc<dyn WorkerHooks>,
    busy_workers: Arc<AtomicUsize>,
}

impl Engine {
    pub fn new(registry: impl Into<Arc<Registry>>, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            registry: registry.into(),
            config,
            hooks: Arc::new(NoopHooks),
            busy_workers: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Install the host's worker lifecycle hooks.
    pub fn with_hooks(mut self, hooks: Arc<dyn WorkerHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of batch workers currently inside a handler.
    pub fn busy_workers(&self) -> usize {
        self.busy_workers.load(Ordering::Relaxed)
    }

    /// Full pipeline for one body: parse, execute, serialize, encode.
    ///
    /// Returns an empty body when nothing has to be sent back.
    pub fn handle(&self, raw: &[u8]) -> Vec<u8> {
        let message = parse(raw, self.config.encoding);
        match self.execute(message) {
            Some(response) => encode(&response, self.config.encoding),
            None => Vec::new(),
        }
    }

    /// Execute a parsed message and build the response document.
    ///
    /// `None` only for a single message without an id. A batch always
    /// yields an array, empty if none of its members carried an id.
    pub fn execute(&self, message: Message) -> Option<Value> {
        match message {
            // A top-level error is answered only when its id was recovered.
            Message::Single(entry) => self
                .exec_single(entry)
                .and_then(|outcome| single_result(&outcome)),
            Message::Batch(batch) => Some(batch_result(&self.exec_batch(batch))),
        }
    }

    /// Run one request on the calling thread.
    ///
    /// Parse errors pass through untouched. Notifications never produce an
    /// outcome, whether they succeed, fail, or name an unknown method.
    pub fn exec_single(&self, msg: BatchEntry) -> Option<Outcome> {
        let req = match msg {
            Ok(req) => req,
            Err(err) => return Some(Outcome::Failure(err)),
        };

        debug!("call (id={:?}) {:?}", req.id, req.method);

        let Some(method) = self.registry.resolve(&req.method) else {
            error!("Method {:?} not found (id={:?})", req.method, req.id);
            return req
                .id
                .map(|id| Outcome::Failure(RpcError::method_not_found(Some(id))));
        };

        let Request { id, method: name, params } = req;
        let result = method.call(params);

        let Some(id) = id else {
            if let Err(e) = result {
                error!("Error while executing notification handler {name:?}: {e}");
            }
            return None;
        };

        Some(match result {
            Ok(value) => Outcome::success(Some(id), value),
            Err(e) => {
                error!("Error while executing method handler {name:?} (id={id}): {e:#}");
                Outcome::Failure(e.into_rpc_error(id))
            }
        })
    }

    /// Run a batch.
    ///
    /// Results are ordered as: parse failures, then outcomes of the
    /// concurrent group in completion order, then the atomic group in
    /// submission order.
    pub fn exec_batch(&self, batch: BatchRequest) -> Vec<Outcome> {
        let mut res = Vec::with_capacity(batch.len());
        let mut atomic = Vec::new();
        let mut concurrent = Vec::new();

        for entry in batch.requests {
            match entry {
                Err(err) => res.push(Outcome::Failure(err)),
                Ok(req) if !self.config.threaded_batch || self.is_atomic(&req) => atomic.push(req),
                Ok(req) => concurrent.push(req),
            }
        }

        if !concurrent.is_empty() {
            res.extend(pool::run_concurrent(self, concurrent));
        }

        for req in atomic {
            res.extend(self.exec_single(Ok(req)));
        }

        res
    }

    fn is_atomic(&self, req: &Request) -> bool {
        self.registry
            .resolve(&req.method)
            .is_some_and(|m| m.is_atomic())
    }

    pub(crate) fn hooks(&self) -> &dyn WorkerHooks {
        self.hooks.as_ref()
    }

    pub(crate) fn busy_counter(&self) -> &AtomicUsize {
        &self.busy_workers
    }
}

impl RequestHandler for Engine {
    fn handle_body(&self, body: &[u8]) -> Vec<u8> {
        self.handle(body)
    }

    fn content_type(&self) -> String {
        self.config.encoding.content_type()
    }

    fn status(&self) -> Value {
        json!({
            "methods": self.registry.methods().len(),
            "busyWorkers": self.busy_workers(),
        })
    }
}
