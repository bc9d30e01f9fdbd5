mod config;
mod decision;
mod headers;

pub use config::{HintFormat, RetryConfig, RetryHeadersConfig, RetryHint};
pub use decision::{
    decide_retry, BackoffRetry, FailureKind, NoRetry, RetryContext, RetryDecision, RetryPolicy,
    RetryReason,
};
pub use headers::parse_retry_after;
