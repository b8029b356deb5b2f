use std::fmt;

/// Bits per kilobit. Decimal, so "100 kbps" maps to a round byte rate.
const BITS_PER_KILOBIT: f64 = 1000.0;

/// Convert a kilobit-per-second limit into bytes per second.
///
/// # Example
/// ```ignore
/// assert_eq!(kbps_to_bytes_per_sec(8.0), 1000.0);
/// ```
#[inline]
pub fn kbps_to_bytes_per_sec(rate_kbps: f64) -> f64 {
    rate_kbps * BITS_PER_KILOBIT / 8.0
}

/// Which way bytes flow through the proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// client -> target
    Upload,
    /// target -> client
    Download,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Upload => "upload",
            Direction::Download => "download",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The upload/download pair applied uniformly to every connection.
///
/// Fixed at startup; copied into each session, never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateProfile {
    upload_kbps: f64,
    download_kbps: f64,
}

impl RateProfile {
    pub fn new(upload_kbps: f64, download_kbps: f64) -> Self {
        Self { upload_kbps, download_kbps }
    }

    pub fn upload_kbps(&self) -> f64 {
        self.upload_kbps
    }

    pub fn download_kbps(&self) -> f64 {
        self.download_kbps
    }

    /// Limit for one direction, in kilobits per second
    pub fn kbps(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Upload => self.upload_kbps,
            Direction::Download => self.download_kbps,
        }
    }
}
