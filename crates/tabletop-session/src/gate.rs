//! One-shot teardown guard.

use std::sync::atomic::{AtomicBool, Ordering};

/// Lets several tasks race to tear a connection down while guaranteeing
/// only the first one does the work.
///
/// The reader task (peer closed, read error, rate limit) and the writer
/// task (write error) each call [`try_close`](Self::try_close) when they
/// give up. Whichever gets `true` detaches from the room, marks the player
/// disconnected, and closes the socket. Everyone else just returns.
#[derive(Debug, Default)]
pub struct TeardownGate {
    closed: AtomicBool,
}

impl TeardownGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` exactly once, to the first caller.
    pub fn try_close(&self) -> bool {
        self.closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
