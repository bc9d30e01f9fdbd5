mod headers;
mod method;
mod request;
mod response;

pub use headers::Headers;
pub use method::{Method, UnknownMethod};
pub use request::{Payload, Request};
pub use response::Response;

pub const CONTENT_LENGTH: &str = "Content-Length";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const LOCATION: &str = "Location";
