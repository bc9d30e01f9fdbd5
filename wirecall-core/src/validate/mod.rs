mod dns;
mod simple;

use std::fmt;

use serde_json::Value as JsonValue;

use crate::error::ValidationError;

pub use dns::{BucketNameValidator, DnsNameValidator};
pub use simple::{LengthValidator, PatternValidator};

/// Checks one call argument before anything is bound or sent.
pub trait ArgValidator: Send + Sync + fmt::Debug {
    fn validate(&self, value: &JsonValue) -> Result<(), ValidationError>;
}

pub(crate) fn expect_str(value: &JsonValue) -> Result<&str, ValidationError> {
    value
        .as_str()
        .ok_or_else(|| ValidationError::new(value.to_string(), "expected a string"))
}
