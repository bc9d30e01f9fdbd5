use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use wirecall_core::Request;

use crate::filter::{Credentials, FilterError, RequestFilter};

/// `Authorization: Basic base64(identity:secret)`.
#[derive(Debug, Clone)]
pub struct BasicAuthFilter {
    credentials: Credentials,
}

impl BasicAuthFilter {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

impl RequestFilter for BasicAuthFilter {
    fn filter(&self, mut request: Request) -> Result<Request, FilterError> {
        let mut raw = self.credentials.identity().as_bytes().to_vec();
        raw.push(b':');
        raw.extend_from_slice(self.credentials.secret().expose_bytes());
        let value = format!("Basic {}", STANDARD.encode(&raw));
        request.headers_mut().replace("Authorization", value);
        Ok(request)
    }
}
