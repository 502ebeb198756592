use std::future::Future;

/// Drives the async parts of a test from the synchronous test hooks.
///
/// The runtime is single threaded. Polling, config changes and workload commands all happen on
/// one thread, one after the other.
#[derive(Debug)]
pub struct Executor {
    runtime: tokio::runtime::Runtime,
}

impl Executor {
    pub(crate) fn new(runtime: tokio::runtime::Runtime) -> Self {
        Self { runtime }
    }

    /// Run async code in place, blocking until it completes.
    pub fn execute_in_place<T>(
        &self,
        fut: impl Future<Output = anyhow::Result<T>>,
    ) -> anyhow::Result<T> {
        self.runtime.block_on(fut)
    }
}
