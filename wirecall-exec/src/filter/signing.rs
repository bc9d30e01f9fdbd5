use std::fmt;
use std::sync::Arc;

use wirecall_core::Request;

use crate::filter::{Credentials, FilterError, RequestFilter, TimestampCache};

/// Provider-specific signing algorithm.
pub trait RequestSigner: Send + Sync + fmt::Debug {
    fn sign(
        &self,
        request: Request,
        credentials: &Credentials,
        timestamp: &str,
    ) -> Result<Request, FilterError>;
}

/// Adapts a [`RequestSigner`] into the filter chain. The timestamp comes from a shared cache
/// so signing under load does not format a fresh one per request.
#[derive(Debug, Clone)]
pub struct SigningFilter {
    signer: Arc<dyn RequestSigner>,
    credentials: Credentials,
    timestamps: Arc<TimestampCache>,
}

impl SigningFilter {
    pub fn new(
        signer: Arc<dyn RequestSigner>,
        credentials: Credentials,
        timestamps: Arc<TimestampCache>,
    ) -> Self {
        Self {
            signer,
            credentials,
            timestamps,
        }
    }
}

impl RequestFilter for SigningFilter {
    fn filter(&self, request: Request) -> Result<Request, FilterError> {
        let ts = self.timestamps.current();
        self.signer.sign(request, &self.credentials, &ts)
    }
}
