mod basic;
mod credentials;
mod hmac_signer;
mod signing;
mod timestamp;

use std::fmt;
use std::sync::Arc;

use wirecall_core::Request;

pub use basic::BasicAuthFilter;
pub use credentials::{Credentials, SecretValue};
pub use hmac_signer::{canonical_path, HmacSha256Signer};
pub use signing::{RequestSigner, SigningFilter};
pub use timestamp::{Clock, FixedClock, SystemClock, TimestampCache};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{filter}: {message}")]
pub struct FilterError {
    pub filter: String,
    pub message: String,
}

impl FilterError {
    pub fn new(filter: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            message: message.into(),
        }
    }
}

/// A pure request mutator. Given the same input request it must return the same output,
/// and it must not perform I/O.
pub trait RequestFilter: Send + Sync + fmt::Debug {
    fn filter(&self, request: Request) -> Result<Request, FilterError>;
}

/// Filters applied in declaration order to every attempt of a command.
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    filters: Vec<Arc<dyn RequestFilter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, filter: impl RequestFilter + 'static) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    pub fn push(&mut self, filter: Arc<dyn RequestFilter>) {
        self.filters.push(filter);
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn apply(&self, request: Request) -> Result<Request, FilterError> {
        self.filters
            .iter()
            .try_fold(request, |req, f| f.filter(req))
    }
}
