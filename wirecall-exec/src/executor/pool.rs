use std::future::Future;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::executor::{ExecError, PoolConfig};

#[derive(Debug, thiserror::Error)]
#[error("no tokio runtime available: {0}")]
pub struct PoolError(#[from] tokio::runtime::TryCurrentError);

/// Caller-sized pool shared by every command: tasks run on the given runtime, at most
/// `max_concurrency` at a time.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    handle: Handle,
    permits: Arc<Semaphore>,
    max_concurrency: usize,
}

impl WorkerPool {
    pub fn new(handle: Handle, config: &PoolConfig) -> Self {
        let max = config.max_concurrency.max(1);
        Self {
            handle,
            permits: Arc::new(Semaphore::new(max)),
            max_concurrency: max,
        }
    }

    /// Pool on the runtime the caller is running in.
    pub fn current(config: &PoolConfig) -> Result<Self, PoolError> {
        Ok(Self::new(Handle::try_current()?, config))
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// The task waits for a permit before polling `fut`, and holds it until `fut` finishes.
    pub fn spawn<F, T>(&self, fut: F) -> JoinHandle<Result<T, ExecError>>
    where
        F: Future<Output = Result<T, ExecError>> + Send + 'static,
        T: Send + 'static,
    {
        let permits = self.permits.clone();
        self.handle.spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|_| ExecError::Cancelled)?;
            fut.await
        })
    }

    /// Runs `fut` on the pool's runtime without taking a permit. For coordinating tasks whose
    /// own work is submitted as commands; metering both would let coordinators starve them.
    pub(crate) fn spawn_unmetered<F, T>(&self, fut: F) -> JoinHandle<Result<T, ExecError>>
    where
        F: Future<Output = Result<T, ExecError>> + Send + 'static,
        T: Send + 'static,
    {
        self.handle.spawn(fut)
    }
}
