mod client;
mod command;
mod config;
mod error;
mod handle;
mod pool;

use std::sync::Arc;

use tracing::debug;
use wirecall_core::Request;

use crate::classify::FromSentinel;
use crate::descriptor::Operation;
use crate::transport::Transport;

pub use client::RestClient;
pub use command::CommandState;
pub use config::{ExecutorConfig, PoolConfig, SensitiveHeadersConfig};
pub use error::ExecError;
pub use handle::CommandHandle;
pub use pool::{PoolError, WorkerPool};

/// Dispatches bound requests on a bounded pool. Each call becomes one independent command.
#[derive(Clone)]
pub struct CommandExecutor {
    transport: Arc<dyn Transport>,
    pool: WorkerPool,
    config: Arc<ExecutorConfig>,
}

impl CommandExecutor {
    pub fn new(transport: Arc<dyn Transport>, pool: WorkerPool, config: ExecutorConfig) -> Self {
        Self {
            transport,
            pool,
            config: Arc::new(config),
        }
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// `request` is the unfiltered request; the operation's filters run on every attempt.
    pub fn execute<T>(&self, request: Request, operation: &Operation<T>) -> CommandHandle<T>
    where
        T: FromSentinel + Send + 'static,
    {
        debug!(operation = %operation.id(), request = %request.request_line(), "submitting command");
        let run = command::run(
            request,
            operation.clone(),
            self.transport.clone(),
            self.config.clone(),
        );
        CommandHandle::new(operation.id().clone(), self.pool.spawn(run))
    }
}
