//! Token bucket state for one direction of one connection.

use std::time::Duration;

use tokio::time::Instant;

/// Ceiling on a single grant, whatever the bucket holds.
///
/// Keeps one write no larger than an edge-sized burst even at high rates.
pub const MAX_GRANT_BYTES: usize = 16 * 1024;

/// Seconds of traffic the bucket may hold.
const BURST_SECONDS: f64 = 2.0;

/// Seconds of traffic the bucket starts with.
const INITIAL_SECONDS: f64 = 1.0;

/// Outcome of asking the bucket for a chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    /// This many bytes may be written now; already debited.
    Send(usize),
    /// Not even one byte is affordable; `Duration` is the time until one is,
    /// saturating at `Duration::MAX` for rates too slow to express.
    Wait(Duration),
}

/// Continuous-refill token bucket measured in bytes.
///
/// `0 <= tokens <= capacity` holds after every method call. Time is passed
/// in by the caller so the refill math does not depend on a live clock.
#[derive(Debug, Clone)]
pub struct TokenBucket {
    tokens: f64,
    capacity: f64,
    refill_rate: f64,
    last_refill: Instant,
}

impl TokenBucket {
    /// Create a bucket refilling at `refill_rate` bytes per second.
    ///
    /// Returns `None` for a rate that can never grant a byte (zero, negative or NaN).
    pub fn new(refill_rate: f64, now: Instant) -> Option<Self> {
        if refill_rate.is_nan() || refill_rate <= 0.0 {
            return None;
        }
        let capacity = refill_rate * BURST_SECONDS;
        let tokens = (refill_rate * INITIAL_SECONDS).min(capacity);
        Some(Self { tokens, capacity, refill_rate, last_refill: now })
    }

    pub fn tokens(&self) -> f64 {
        self.tokens
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn refill_rate(&self) -> f64 {
        self.refill_rate
    }

    /// Credit the time elapsed since the last refill, clamped to capacity.
    ///
    /// An instant earlier than the last refill credits nothing.
    pub fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill);
        self.tokens = (self.tokens + elapsed.as_secs_f64() * self.refill_rate).min(self.capacity);
        if now > self.last_refill {
            self.last_refill = now;
        }
    }

    /// Grant as much of a `len` byte chunk as the bucket affords right now.
    ///
    /// The grant is `floor(min(tokens, MAX_GRANT_BYTES, len))` and is debited
    /// immediately. A zero-length request is granted as `Send(0)`.
    pub fn grant(&mut self, now: Instant, len: usize) -> Grant {
        self.refill(now);
        if len == 0 {
            return Grant::Send(0);
        }

        let affordable = self.tokens.min(MAX_GRANT_BYTES as f64).min(len as f64).floor();
        if affordable < 1.0 {
            let missing = 1.0 - self.tokens;
            let eta = Duration::try_from_secs_f64(missing / self.refill_rate)
                .unwrap_or(Duration::MAX);
            return Grant::Wait(eta);
        }

        self.tokens = (self.tokens - affordable).max(0.0);
        Grant::Send(affordable as usize)
    }
}
