//! Cooperative cancellation token
//!
//! Shared by every blocking operation in the venue. Cancelling is a single
//! atomic transition; anything that parks on a condition variable must be
//! woken separately after the token flips (see `ShutdownCoordinator`).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct StopToken {
    stopped: Arc<AtomicBool>,
}

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Flip the token. Returns `true` only for the call that performed the transition.
    pub fn cancel(&self) -> bool {
        self.stopped
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_once() {
        let token = StopToken::new();
        assert!(!token.is_stopped());

        assert!(token.cancel());
        assert!(token.is_stopped());

        // Second cancel is a no-op
        assert!(!token.cancel());
        assert!(token.is_stopped());
    }

    #[test]
    fn test_clones_share_state() {
        let token = StopToken::new();
        let clone = token.clone();

        let handle = std::thread::spawn(move || clone.cancel());
        assert!(handle.join().unwrap());

        assert!(token.is_stopped());
    }
}
