use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Per attempt.
    pub request_timeout: Duration,
    pub max_response_bytes: usize,
    pub sensitive_headers: SensitiveHeadersConfig,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_response_bytes: 4 * 1024 * 1024,
            sensitive_headers: SensitiveHeadersConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SensitiveHeadersConfig {
    /// Lowercased header names that must always be redacted.
    pub always_redact: Vec<String>,
}

impl Default for SensitiveHeadersConfig {
    fn default() -> Self {
        Self {
            always_redact: vec![
                "authorization".to_string(),
                "cookie".to_string(),
                "set-cookie".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_concurrency: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { max_concurrency: 10 }
    }
}
