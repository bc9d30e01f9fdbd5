use std::time::Duration;

/// Per-operation retry bounds. Whether a status is retryable is decided by the classifier;
/// this only bounds how often and how long.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub factor: f64,
    pub max_delay: Duration,
    pub max_redirects: u32,
    pub headers: RetryHeadersConfig,
    /// Transport failures are terminal unless this is set.
    pub retry_transport_errors: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(1000),
            factor: 2.0,
            max_delay: Duration::from_secs(60),
            max_redirects: 5,
            headers: RetryHeadersConfig::default(),
            retry_transport_errors: false,
        }
    }
}

/// Where to look for a server-provided delay. `Retry-After` is always consulted first.
#[derive(Debug, Clone, Default)]
pub struct RetryHeadersConfig {
    pub hints: Vec<RetryHint>,
}

/// A provider-specific header carrying a retry delay, e.g. `X-RateLimit-Reset`.
#[derive(Debug, Clone)]
pub struct RetryHint {
    pub header: String,
    pub format: HintFormat,
}

impl RetryHint {
    pub fn new(header: impl Into<String>, format: HintFormat) -> Self {
        Self {
            header: header.into(),
            format,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintFormat {
    Seconds,
    EpochSeconds,
    HttpDate,
}
