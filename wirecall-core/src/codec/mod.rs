use serde_json::Value as JsonValue;

use crate::error::CodecError;
use crate::http::Payload;

pub const APPLICATION_JSON: &str = "application/json";
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Serializes structured payload arguments. The binder hands over the value and never inspects
/// the resulting bytes.
pub trait PayloadCodec: Send + Sync {
    fn encode(&self, value: &JsonValue) -> Result<Payload, CodecError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl PayloadCodec for JsonCodec {
    fn encode(&self, value: &JsonValue) -> Result<Payload, CodecError> {
        let bytes = serde_json::to_vec(value).map_err(|e| CodecError::Encode(e.to_string()))?;
        Ok(Payload::new(bytes, APPLICATION_JSON))
    }
}
