use thiserror::Error;

use crate::bind::BindingRole;

/// Failure to turn call arguments into a request. Always local and synchronous: a request that
/// fails to bind never reaches the transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("operation takes {expected} arguments, got {got}")]
    TooManyArguments { expected: usize, got: usize },
    #[error("argument {index} rejected: {source}")]
    Validation {
        index: usize,
        #[source]
        source: ValidationError,
    },
    #[error("unresolved path token {{{token}}} in template {template}")]
    UnresolvedToken { token: String, template: String },
    #[error("argument {index} must be a scalar or an array of scalars for {role:?} binding")]
    UnsupportedValue { index: usize, role: BindingRole },
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl BindError {
    /// Configuration errors mean the operation itself is malformed, not the arguments.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            BindError::UnresolvedToken { .. } | BindError::Endpoint(EndpointError::NoScopedTemplate)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    #[error("invalid endpoint url {url}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("endpoint override given but no scoped endpoint template is configured")]
    NoScopedTemplate,
}

/// Malformed operation declaration, detected when the shape is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("path token {{{0}}} has no path binding")]
    UnboundPathToken(String),
    #[error("path binding {0} does not match any token in the template")]
    UnknownPathToken(String),
    #[error("binding for argument {index} ({role:?}) requires a key")]
    MissingKey { index: usize, role: BindingRole },
    #[error("at most one endpoint override binding is allowed")]
    MultipleEndpointOverrides,
    #[error("form parameters cannot be combined with a structured payload")]
    ConflictingPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unclosed path token (missing '}}')")]
    UnclosedToken,
    #[error("empty path token '{{}}'")]
    EmptyToken,
    #[error("unexpected '}}' at byte {0}")]
    UnexpectedClose(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("failed to encode payload: {0}")]
    Encode(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid argument '{value}': {reason}")]
pub struct ValidationError {
    pub value: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            reason: reason.into(),
        }
    }
}
