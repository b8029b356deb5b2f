pub mod connection;
pub mod forward;
pub mod handler;
pub mod listener;
pub mod relay;
pub mod request;
pub mod response;
pub mod server;
pub mod session;
pub mod target;
pub mod tunnel;

pub use relay::{relay, RelayEnd, RelayReport, READ_BUFFER_SIZE};
pub use request::{read_request, ParsedRequest, RequestError};
pub use server::{run, ProxyServer};
pub use session::{run_relays, SessionContext, SessionError, SessionReport};
pub use target::Target;
