//! Decoders applied to responses the classifier accepted as success.

use std::marker::PhantomData;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use wirecall_core::Response;

use crate::executor::ExecError;

pub trait ResponseTransform<T>: Send + Sync {
    fn transform(&self, response: Response) -> Result<T, ExecError>;
}

impl<T, F> ResponseTransform<T> for F
where
    F: Fn(Response) -> Result<T, ExecError> + Send + Sync,
{
    fn transform(&self, response: Response) -> Result<T, ExecError> {
        self(response)
    }
}

/// Deserializes the body as JSON.
pub struct JsonTransform<T>(PhantomData<fn() -> T>);

impl<T> JsonTransform<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for JsonTransform<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> ResponseTransform<T> for JsonTransform<T> {
    fn transform(&self, response: Response) -> Result<T, ExecError> {
        serde_json::from_slice(&response.body).map_err(|e| ExecError::Decode(e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BodyText;

impl ResponseTransform<String> for BodyText {
    fn transform(&self, response: Response) -> Result<String, ExecError> {
        String::from_utf8(response.into_body()).map_err(|e| ExecError::Decode(e.to_string()))
    }
}

/// Discards the body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReturnVoid;

impl ResponseTransform<()> for ReturnVoid {
    fn transform(&self, _response: Response) -> Result<(), ExecError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TrueIf2xx;

impl ResponseTransform<bool> for TrueIf2xx {
    fn transform(&self, response: Response) -> Result<bool, ExecError> {
        Ok(response.is_success())
    }
}

/// First value of a response header, if present.
#[derive(Debug, Clone)]
pub struct HeaderValue {
    name: String,
}

impl HeaderValue {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl ResponseTransform<Option<String>> for HeaderValue {
    fn transform(&self, response: Response) -> Result<Option<String>, ExecError> {
        Ok(response.header(&self.name).map(str::to_string))
    }
}

/// Raw digest carried base64-encoded in `Content-MD5`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentMd5;

impl ResponseTransform<Vec<u8>> for ContentMd5 {
    fn transform(&self, response: Response) -> Result<Vec<u8>, ExecError> {
        let value = response
            .header("Content-MD5")
            .ok_or_else(|| ExecError::Decode("missing Content-MD5 header".to_string()))?;
        STANDARD
            .decode(value.trim())
            .map_err(|e| ExecError::Decode(format!("invalid Content-MD5: {e}")))
    }
}
