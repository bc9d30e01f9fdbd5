mod error;
mod sentinel;
mod table;

pub use error::{ErrorBody, ProtocolError};
pub use sentinel::{FromSentinel, Sentinel};
pub use table::{redirect_with_location, retry_on, ClassifierTable, Disposition, StatusClass, StatusHandler};
