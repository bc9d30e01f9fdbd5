mod resolve;
pub(crate) mod template;

pub use resolve::Endpoint;
pub use template::{PathTemplate, Segment};
