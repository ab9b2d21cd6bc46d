//! JSON-RPC dispatcher: method registry and execution engine.
//!
//! The [`Engine`] resolves requests against a [`Registry`] and runs them.
//! Single requests execute synchronously on the caller's thread. Batches are
//! split into an atomic group, which also runs on the caller's thread, and a
//! concurrent group, which runs on a worker pool created for that batch
//! alone and bounded by [`EngineConfig::batch_threads_max`].
//!
//! There is no admission control across batches: with `B` batches in flight
//! up to `B * batch_threads_max` worker threads may exist at once, and
//! threads abandoned at a batch deadline keep running until their handler
//! returns. Hosts that need a global bound must limit in-flight batches
//! themselves.

pub mod config;
pub mod engine;
pub mod handler;
pub mod hooks;
mod pool;
pub mod registry;

pub use config::{ConfigError, EngineConfig};
pub use engine::Engine;
pub use handler::{HandlerError, HandlerResult, Method};
pub use hooks::{NoopHooks, WorkerHooks};
pub use registry::{Namespace, Registry, RegistryBuilder, RegistryError};
