use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::trace;

use crate::throttle::bucket::{Grant, TokenBucket};
use crate::throttle::rate::kbps_to_bytes_per_sec;

/// Sleep between two attempts when the bucket is empty.
pub const BACKOFF_INTERVAL: Duration = Duration::from_millis(10);

/// Async rate limiter for one relay direction.
///
/// A limiter built from a rate of zero or less is *refused*: every
/// [`acquire`](Limiter::acquire) returns `None` and the caller is expected to
/// close the direction without sending anything.
#[derive(Debug)]
pub struct Limiter {
    bucket: Option<TokenBucket>,
    backoff: Duration,
}

impl Limiter {
    /// Build a limiter from a kilobit-per-second rate, bucket full at one second.
    pub fn new(rate_kbps: f64) -> Self {
        Self::with_backoff(rate_kbps, BACKOFF_INTERVAL)
    }

    pub fn with_backoff(rate_kbps: f64, backoff: Duration) -> Self {
        let bucket = TokenBucket::new(kbps_to_bytes_per_sec(rate_kbps), Instant::now());
        Self { bucket, backoff }
    }

    pub fn is_refused(&self) -> bool {
        self.bucket.is_none()
    }

    /// Wait until at least one byte of a `len` byte chunk may be sent.
    ///
    /// Returns the number of bytes granted (at most `len`), or `None` when the
    /// direction is refused. Cancel-safe: dropping the future mid-sleep leaves
    /// the bucket untouched.
    pub async fn acquire(&mut self, len: usize) -> Option<usize> {
        let backoff = self.backoff;
        let bucket = self.bucket.as_mut()?;
        loop {
            match bucket.grant(Instant::now(), len) {
                Grant::Send(n) => return Some(n),
                Grant::Wait(eta) => {
                    trace!(pending = len, ?eta, "bucket empty, backing off");
                    sleep(backoff).await;
                }
            }
        }
    }
}
