mod limits;
mod listen;
mod loader;
mod root;
mod telemetry;
mod timeout;

pub use limits::LimitsConfig;
pub use listen::ListenConfig;
pub use loader::{load_from_path, validate};
pub use root::Config;
pub use telemetry::LoggingConfig;
pub use timeout::TimeoutConfig;
