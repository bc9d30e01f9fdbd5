mod args;
mod binder;
mod binding;
mod shape;

pub use args::CallArgs;
pub use binder::Binder;
pub use binding::{Binding, BindingRole};
pub use shape::{RequestShape, RequestShapeBuilder};
