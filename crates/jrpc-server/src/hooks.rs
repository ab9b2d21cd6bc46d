//! Worker lifecycle notifications for the host.

/// Called around every request the engine places on a batch worker thread.
///
/// A host that binds per-thread resources (connections, thread-local
/// context) sets them up in `acquire_worker` and tears them down in
/// `release_worker`. Both run on the worker thread itself. `release_worker`
/// is called even if the handler panicked.
pub trait WorkerHooks: Send + Sync + 'static {
    fn acquire_worker(&self) {}

    fn release_worker(&self) {}
}

/// Hooks that do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl WorkerHooks for NoopHooks {}
