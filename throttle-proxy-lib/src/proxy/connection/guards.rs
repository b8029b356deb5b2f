use std::sync::Arc;

use super::count::ConnectionCount;

/// Counts a connection as open for as long as the guard lives.
pub struct ConnectionGuard {
    counts: Arc<ConnectionCount>,
}

impl ConnectionGuard {
    pub fn new(counts: Arc<ConnectionCount>) -> Self {
        counts.increment();
        Self { counts }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.counts.decrement();
    }
}
