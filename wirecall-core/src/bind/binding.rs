use std::sync::Arc;

use crate::validate::ArgValidator;

/// Where a call argument lands on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BindingRole {
    /// Substituted into the `{key}` token of the path template.
    Path,
    Query,
    /// `;key=value` appended to the path.
    Matrix,
    /// `application/x-www-form-urlencoded` body parameter.
    Form,
    Header,
    /// The whole argument is the payload, encoded by the codec.
    Payload,
    /// One field of a structured payload assembled from several arguments.
    PayloadField,
    /// Replaces the endpoint host (absolute URL, or a scope such as a region).
    EndpointOverride,
}

impl BindingRole {
    pub fn requires_key(&self) -> bool {
        !matches!(self, BindingRole::Payload | BindingRole::EndpointOverride)
    }
}

#[derive(Debug, Clone)]
pub struct Binding {
    pub index: usize,
    pub role: BindingRole,
    pub key: Option<String>,
    pub validators: Vec<Arc<dyn ArgValidator>>,
}

impl Binding {
    pub fn new(index: usize, role: BindingRole, key: Option<String>) -> Self {
        Self {
            index,
            role,
            key,
            validators: Vec::new(),
        }
    }

    pub fn path(index: usize, key: impl Into<String>) -> Self {
        Self::new(index, BindingRole::Path, Some(key.into()))
    }

    pub fn query(index: usize, key: impl Into<String>) -> Self {
        Self::new(index, BindingRole::Query, Some(key.into()))
    }

    pub fn matrix(index: usize, key: impl Into<String>) -> Self {
        Self::new(index, BindingRole::Matrix, Some(key.into()))
    }

    pub fn form(index: usize, key: impl Into<String>) -> Self {
        Self::new(index, BindingRole::Form, Some(key.into()))
    }

    pub fn header(index: usize, key: impl Into<String>) -> Self {
        Self::new(index, BindingRole::Header, Some(key.into()))
    }

    pub fn payload(index: usize) -> Self {
        Self::new(index, BindingRole::Payload, None)
    }

    pub fn payload_field(index: usize, key: impl Into<String>) -> Self {
        Self::new(index, BindingRole::PayloadField, Some(key.into()))
    }

    pub fn endpoint_override(index: usize) -> Self {
        Self::new(index, BindingRole::EndpointOverride, None)
    }

    pub fn validate_with(mut self, validator: impl ArgValidator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    pub(crate) fn key_str(&self) -> &str {
        self.key.as_deref().unwrap_or("")
    }
}
