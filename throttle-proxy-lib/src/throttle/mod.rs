//! Per-connection bandwidth throttling.
//!
//! Each relay direction of each connection owns its own [`Limiter`]; nothing
//! here is shared between connections, so there is no locking and one busy
//! session cannot eat into another's budget.
//!
//! # Architecture
//!
//! 1. **RateProfile** (`rate.rs`): the process-wide upload/download limits in
//!    kilobits per second, converted to bytes per second on demand.
//!
//! 2. **TokenBucket** (`bucket.rs`): the clock-driven state machine. Given the
//!    current instant and a pending chunk length it either grants a number of
//!    bytes or asks the caller to wait.
//!
//! 3. **Limiter** (`limiter.rs`): the async wrapper a relay awaits. It sleeps
//!    on a fixed back-off until the bucket grants something, and reports a
//!    refused direction when the configured rate is zero or negative.
//!
//! # Example Usage
//!
//! ```ignore
//! use throttle_proxy_lib::throttle::{Limiter, RateProfile};
//!
//! let profile = RateProfile::new(8.0, 1000.0);
//! let mut upload = Limiter::new(profile.upload_kbps());
//!
//! // 8 kbps is 1000 bytes per second; the bucket starts with one second.
//! assert_eq!(upload.acquire(5000).await, Some(1000));
//! ```

mod bucket;
mod limiter;
mod rate;

pub use bucket::{Grant, TokenBucket, MAX_GRANT_BYTES};
pub use limiter::{Limiter, BACKOFF_INTERVAL};
pub use rate::{kbps_to_bytes_per_sec, Direction, RateProfile};
