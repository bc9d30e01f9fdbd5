#![forbid(unsafe_code)]

//! Wire model and request synthesis for declaratively described HTTP operations.
//!
//! The runtime (filters, dispatch, retries, fan-out) lives in `wirecall-exec`.

pub mod bind;
pub mod codec;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod validate;

pub use crate::bind::{Binder, Binding, BindingRole, CallArgs, RequestShape, RequestShapeBuilder};
pub use crate::codec::{JsonCodec, PayloadCodec};
pub use crate::endpoint::{Endpoint, PathTemplate};
pub use crate::error::{BindError, CodecError, EndpointError, ShapeError, TemplateError, ValidationError};
pub use crate::http::{Headers, Method, Payload, Request, Response};
