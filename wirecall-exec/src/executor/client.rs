use wirecall_core::{BindError, Binder, CallArgs, Request};

use crate::classify::FromSentinel;
use crate::descriptor::Operation;
use crate::executor::{CommandExecutor, CommandHandle};

/// A provider client: binder for the provider's endpoint plus a shared executor.
#[derive(Clone)]
pub struct RestClient {
    binder: Binder,
    executor: CommandExecutor,
}

impl RestClient {
    pub fn new(binder: Binder, executor: CommandExecutor) -> Self {
        Self { binder, executor }
    }

    pub fn binder(&self) -> &Binder {
        &self.binder
    }

    pub fn executor(&self) -> &CommandExecutor {
        &self.executor
    }

    /// Binds without sending.
    pub fn bind<T>(&self, operation: &Operation<T>, args: &CallArgs) -> Result<Request, BindError> {
        self.binder.bind(operation.descriptor().shape(), args)
    }

    /// Argument and binding errors come back here, before anything is spawned.
    pub fn submit<T>(
        &self,
        operation: &Operation<T>,
        args: &CallArgs,
    ) -> Result<CommandHandle<T>, BindError>
    where
        T: FromSentinel + Send + 'static,
    {
        let request = self.bind(operation, args)?;
        Ok(self.executor.execute(request, operation))
    }
}
