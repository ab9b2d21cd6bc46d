//! Engine configuration.

use std::time::Duration;

use jrpc_protocol::Encoding;

/// Options controlling how the engine decodes bodies and schedules batches.
///
/// Constructed once by the host and handed to [`crate::Engine::new`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Text encoding of request and response bodies.
    pub encoding: Encoding,
    /// Run non-atomic batch members on a worker pool. When disabled every
    /// batch runs serially on the calling thread.
    pub threaded_batch: bool,
    /// Upper bound on worker threads spawned for a single batch.
    pub batch_threads_max: usize,
    /// Wall-clock budget for the concurrent part of a batch.
    pub batch_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            encoding: Encoding::Utf8,
            threaded_batch: true,
            batch_threads_max: 10,
            batch_timeout: Duration::from_secs(600),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("batch_threads_max must be at least 1")]
    NoWorkers,
    #[error("batch_timeout must be greater than zero")]
    ZeroTimeout,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_threads_max == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.batch_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}
