use std::time::Duration;

use async_trait::async_trait;
use wirecall_core::{Headers, Method, Request, Response};

use crate::transport::{Transport, TransportError};

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Redirects are disabled: they are classified and followed by the executor.
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("wirecall/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: Request,
        timeout: Duration,
        max_response_bytes: usize,
    ) -> Result<Response, TransportError> {
        let (method, uri, headers, payload) = request.into_parts();
        let mut rb = self
            .client
            .request(to_reqwest_method(method), uri)
            .timeout(timeout);

        for (k, v) in headers.iter() {
            rb = rb.header(k, v);
        }
        if let Some(p) = payload {
            rb = rb.body(p.into_bytes());
        }

        let mut resp = rb.send().await.map_err(map_reqwest_error)?;
        let status = resp.status().as_u16();

        let mut out_headers = Headers::new();
        for (k, v) in resp.headers().iter() {
            if let Ok(s) = v.to_str() {
                out_headers.append(k.as_str(), s);
            }
        }

        if let Some(len) = resp.content_length() {
            if len as usize > max_response_bytes {
                return Err(TransportError::ResponseTooLarge {
                    max_bytes: max_response_bytes,
                });
            }
        }
        // Content-Length may be absent or wrong; enforce the cap while reading.
        let mut body = Vec::new();
        while let Some(chunk) = resp.chunk().await.map_err(map_reqwest_error)? {
            if body.len() + chunk.len() > max_response_bytes {
                return Err(TransportError::ResponseTooLarge {
                    max_bytes: max_response_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(Response::new(status, out_headers, body))
    }
}

fn to_reqwest_method(m: Method) -> reqwest::Method {
    match m {
        Method::Get => reqwest::Method::GET,
        Method::Put => reqwest::Method::PUT,
        Method::Post => reqwest::Method::POST,
        Method::Delete => reqwest::Method::DELETE,
        Method::Head => reqwest::Method::HEAD,
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        return TransportError::Timeout;
    }
    if e.is_connect() || e.is_request() {
        return TransportError::Connect(e.to_string());
    }
    TransportError::Other(e.to_string())
}
