use url::Url;

use crate::http::{Headers, Method, CONTENT_LENGTH, CONTENT_TYPE};

/// Encoded request body together with its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    bytes: Vec<u8>,
    content_type: String,
}

impl Payload {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// A fully addressed HTTP request.
///
/// The payload can only be attached through [`Request::set_payload`], which also rewrites the
/// `Content-Length` and `Content-Type` headers, so the declared length always matches the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    uri: Url,
    headers: Headers,
    payload: Option<Payload>,
}

impl Request {
    pub fn new(method: Method, uri: Url) -> Self {
        Self {
            method,
            uri,
            headers: Headers::new(),
            payload: None,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn set_method(&mut self, method: Method) {
        self.method = method;
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn set_uri(&mut self, uri: Url) {
        self.uri = uri;
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    pub fn set_payload(&mut self, payload: Payload) {
        self.headers
            .replace(CONTENT_LENGTH, payload.len().to_string());
        self.headers
            .replace(CONTENT_TYPE, payload.content_type().to_string());
        self.payload = Some(payload);
    }

    pub fn clear_payload(&mut self) {
        self.headers.remove(CONTENT_LENGTH);
        self.headers.remove(CONTENT_TYPE);
        self.payload = None;
    }

    /// Payload bytes, or an empty slice when there is none.
    pub fn body(&self) -> &[u8] {
        self.payload.as_ref().map(Payload::as_bytes).unwrap_or(&[])
    }

    pub fn into_parts(self) -> (Method, Url, Headers, Option<Payload>) {
        (self.method, self.uri, self.headers, self.payload)
    }

    /// `"<METHOD> <uri> HTTP/1.1"`.
    pub fn request_line(&self) -> String {
        format!("{} {} HTTP/1.1", self.method, self.uri)
    }

    pub fn headers_text(&self) -> String {
        self.headers.to_sorted_text()
    }

    pub fn payload_text(&self) -> Option<String> {
        self.payload
            .as_ref()
            .map(|p| String::from_utf8_lossy(p.as_bytes()).into_owned())
    }
}
