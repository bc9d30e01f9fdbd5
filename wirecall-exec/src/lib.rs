#![forbid(unsafe_code)]

//! Runtime for wirecall operations: request filters and signing, async dispatch through an
//! injected transport, status classification with per-operation retry policies, and bounded
//! fan-out aggregation.

pub mod aggregate;
pub mod classify;
pub mod descriptor;
pub mod executor;
pub mod filter;
pub mod retry;
pub mod transform;
pub mod transport;

pub use crate::aggregate::{run_all, AggregateError, BatchJob, BatchResult, DuplicateItem};
pub use crate::classify::{ClassifierTable, Disposition, FromSentinel, ProtocolError, Sentinel, StatusClass};
pub use crate::descriptor::{
    DescriptorError, Operation, OperationDescriptor, OperationId, OperationRegistry, RegistryError,
};
pub use crate::executor::{
    CommandExecutor, CommandHandle, CommandState, ExecError, ExecutorConfig, PoolConfig, RestClient,
    WorkerPool,
};
pub use crate::filter::{FilterChain, FilterError, RequestFilter};
pub use crate::retry::{BackoffRetry, NoRetry, RetryConfig, RetryDecision, RetryPolicy};
pub use crate::transform::ResponseTransform;
pub use crate::transport::{ReqwestTransport, Transport, TransportError};
