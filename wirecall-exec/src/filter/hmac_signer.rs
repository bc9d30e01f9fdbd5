use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use wirecall_core::Request;

use crate::filter::{Credentials, FilterError, RequestSigner};

type HmacSha256 = Hmac<Sha256>;

const CONTENT_HASH: &str = "X-Content-Hash";
const USER_ID: &str = "X-Userid";
const TIMESTAMP: &str = "X-Timestamp";
const AUTHORIZATION: &str = "Authorization";

/// Shared-key signer over method, hashed path, body hash, timestamp and user id.
///
/// ```text
/// Method:POST
/// Hashed Path:<b64 sha256(canonical path)>
/// X-Content-Hash:<b64 sha256(body)>
/// X-Timestamp:2009-07-01T00:00:00Z
/// X-Userid:webui
/// ```
///
/// The result goes out as `Authorization: HMAC-SHA256 <userid>:<b64 hmac>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSha256Signer;

impl HmacSha256Signer {
    pub fn string_to_sign(request: &Request, identity: &str, timestamp: &str) -> String {
        format!(
            "Method:{}\nHashed Path:{}\n{CONTENT_HASH}:{}\n{TIMESTAMP}:{}\n{USER_ID}:{}",
            request.method(),
            hash_b64(canonical_path(request.uri().path()).as_bytes()),
            hash_b64(request.body()),
            timestamp,
            identity,
        )
    }
}

impl RequestSigner for HmacSha256Signer {
    fn sign(
        &self,
        mut request: Request,
        credentials: &Credentials,
        timestamp: &str,
    ) -> Result<Request, FilterError> {
        let to_sign = Self::string_to_sign(&request, credentials.identity(), timestamp);
        let mut mac = HmacSha256::new_from_slice(credentials.secret().expose_bytes())
            .map_err(|e| FilterError::new("hmac-sha256", e.to_string()))?;
        mac.update(to_sign.as_bytes());
        let signature = STANDARD.encode(mac.finalize().into_bytes());

        let content_hash = hash_b64(request.body());
        let headers = request.headers_mut();
        headers.replace(CONTENT_HASH, content_hash);
        headers.replace(USER_ID, credentials.identity());
        headers.replace(TIMESTAMP, timestamp);
        headers.replace(
            AUTHORIZATION,
            format!("HMAC-SHA256 {}:{}", credentials.identity(), signature),
        );
        Ok(request)
    }
}

/// Collapses runs of `/` and drops a trailing `/` (the root path stays `/`).
pub fn canonical_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    if out.len() > 1 && out.ends_with('/') {
        out.pop();
    }
    out
}

fn hash_b64(bytes: &[u8]) -> String {
    STANDARD.encode(Sha256::digest(bytes))
}
