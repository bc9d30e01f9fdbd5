use std::future::Future;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use tokio::task::{AbortHandle, JoinHandle};

use crate::descriptor::OperationId;
use crate::executor::ExecError;

/// Completion handle for one command. Resolves exactly once.
///
/// Cancellation is best effort: a request already on the wire may still complete at the
/// server, but no transform or retry runs afterwards. Dropping an unfinished handle cancels
/// the command.
pub struct CommandHandle<T> {
    operation: OperationId,
    inner: JoinHandle<Result<T, ExecError>>,
}

impl<T> CommandHandle<T> {
    pub(crate) fn new(operation: OperationId, inner: JoinHandle<Result<T, ExecError>>) -> Self {
        Self { operation, inner }
    }

    pub fn operation(&self) -> &OperationId {
        &self.operation
    }

    pub fn cancel(&self) {
        self.inner.abort();
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.inner.abort_handle()
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }
}

impl<T> Drop for CommandHandle<T> {
    fn drop(&mut self) {
        self.inner.abort();
    }
}

impl<T> Future for CommandHandle<T> {
    type Output = Result<T, ExecError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let joined = ready!(Pin::new(&mut self.inner).poll(cx));
        Poll::Ready(match joined {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(ExecError::Cancelled),
            Err(e) => Err(ExecError::Panicked(e.to_string())),
        })
    }
}
