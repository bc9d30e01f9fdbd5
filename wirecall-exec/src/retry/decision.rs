use std::fmt;
use std::time::{Duration, SystemTime};

use wirecall_core::Headers;

use crate::retry::config::RetryConfig;
use crate::retry::headers::parse_retry_after;
use crate::transport::TransportError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter { delay: Duration, reason: RetryReason },
    Stop { reason: RetryReason },
}

impl RetryDecision {
    pub fn is_retry(&self) -> bool {
        matches!(self, RetryDecision::RetryAfter { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryReason {
    NotRetryable,
    AttemptsExhausted,
    RedirectLimit,
    TransportFailure,
    HttpStatus(u16),
    RetryAfterHeader,
    Redirect,
    Backoff,
}

/// What went wrong with the attempt that just finished.
#[derive(Debug, Clone, Copy)]
pub enum FailureKind<'a> {
    /// Classified as retryable.
    Status { status: u16, headers: &'a Headers },
    /// Classified as a redirect with a usable `Location`.
    Redirect { status: u16 },
    Transport(&'a TransportError),
}

#[derive(Debug, Clone, Copy)]
pub struct RetryContext<'a> {
    /// 1-based number of the attempt that just finished. Redirect hops are not attempts.
    pub attempt_no: u32,
    pub redirects: u32,
    pub failure: FailureKind<'a>,
    pub now: SystemTime,
}

pub trait RetryPolicy: Send + Sync + fmt::Debug {
    fn decide(&self, ctx: &RetryContext<'_>) -> RetryDecision;
}

/// Bounded exponential backoff with full jitter; `Retry-After` wins when present.
#[derive(Debug, Clone, Default)]
pub struct BackoffRetry {
    config: RetryConfig,
}

impl BackoffRetry {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}

impl RetryPolicy for BackoffRetry {
    fn decide(&self, ctx: &RetryContext<'_>) -> RetryDecision {
        decide_retry(&self.config, ctx, || fastrand::u64(..))
    }
}

/// Fails on the first non-success, redirects included.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetry;

impl RetryPolicy for NoRetry {
    fn decide(&self, _ctx: &RetryContext<'_>) -> RetryDecision {
        RetryDecision::Stop {
            reason: RetryReason::NotRetryable,
        }
    }
}

/// Decide if we should retry and how long to wait.
///
/// - `rand_u64`: RNG for full jitter.
pub fn decide_retry(
    cfg: &RetryConfig,
    ctx: &RetryContext<'_>,
    rand_u64: impl Fn() -> u64,
) -> RetryDecision {
    let (status, headers) = match ctx.failure {
        FailureKind::Redirect { .. } => {
            return if ctx.redirects < cfg.max_redirects {
                RetryDecision::RetryAfter {
                    delay: Duration::ZERO,
                    reason: RetryReason::Redirect,
                }
            } else {
                RetryDecision::Stop {
                    reason: RetryReason::RedirectLimit,
                }
            };
        }
        FailureKind::Transport(_) if !cfg.retry_transport_errors => {
            return RetryDecision::Stop {
                reason: RetryReason::NotRetryable,
            };
        }
        FailureKind::Transport(_) => (None, None),
        FailureKind::Status { status, headers } => (Some(status), Some(headers)),
    };

    if ctx.attempt_no >= cfg.max_attempts {
        return RetryDecision::Stop {
            reason: RetryReason::AttemptsExhausted,
        };
    }

    if let Some(delay) = headers.and_then(|h| parse_retry_after(h, &cfg.headers, ctx.now)) {
        return RetryDecision::RetryAfter {
            delay: delay.min(cfg.max_delay),
            reason: RetryReason::RetryAfterHeader,
        };
    }

    // Exponential backoff: base * factor^(attempt_no-1), with full jitter.
    let exp = ctx.attempt_no.saturating_sub(1) as i32;
    let raw = (cfg.base_delay.as_millis() as f64) * cfg.factor.powi(exp);
    let raw_ms = raw.min(cfg.max_delay.as_millis() as f64).max(0.0) as u64;

    let jitter_ms = if raw_ms == 0 { 0 } else { rand_u64() % (raw_ms + 1) };
    RetryDecision::RetryAfter {
        delay: Duration::from_millis(jitter_ms),
        reason: status
            .map(RetryReason::HttpStatus)
            .unwrap_or(RetryReason::TransportFailure),
    }
}
