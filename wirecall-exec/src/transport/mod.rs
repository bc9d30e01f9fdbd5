mod reqwest_transport;

use std::time::Duration;

use async_trait::async_trait;
use wirecall_core::{Request, Response};

pub use reqwest_transport::ReqwestTransport;

/// I/O failure before a complete response was received. Never retried implicitly.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("timeout")]
    Timeout,
    #[error("connect/dns/tls error: {0}")]
    Connect(String),
    #[error("response too large (>{max_bytes} bytes)")]
    ResponseTooLarge { max_bytes: usize },
    #[error("transport error: {0}")]
    Other(String),
}

/// Sends one request and drains the whole response body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: Request,
        timeout: Duration,
        max_response_bytes: usize,
    ) -> Result<Response, TransportError>;
}
