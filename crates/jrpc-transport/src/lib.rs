//! JSON-RPC HTTP transport
//!
//! Receives raw request bodies over HTTP and writes back whatever the
//! dispatcher produced. The transport knows nothing about methods or
//! batches; it is decoupled from the dispatcher via the `RequestHandler`
//! trait.

pub mod server;

pub use server::{RequestHandler, TransportConfig, TransportServer, router};
