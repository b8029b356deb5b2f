mod count;
mod guards;

pub use count::{ConnectionCount, ConnectionSnapshot};
pub use guards::ConnectionGuard;
