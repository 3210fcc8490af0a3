// src/campaign/cancel.rs
use std::sync::Arc;

use tokio::sync::watch;

/// Cooperative cancellation signal for the send loop.
///
/// Clones share one flag; the loop checks `is_cancelled()` at the top of each
/// iteration, so an in-flight send is always allowed to finish.
#[derive(Debug, Clone)]
pub struct CancelToken {
    state: Arc<CancelState>,
}

#[derive(Debug)]
struct CancelState {
    tx: watch::Sender<bool>,
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            state: Arc::new(CancelState { tx, rx }),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.state.rx.borrow()
    }

    pub fn cancel(&self) {
        let _ = self.state.tx.send(true);
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_observe_the_same_cancellation() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());

        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn fresh_tokens_are_independent() {
        let first = CancelToken::new();
        first.cancel();
        assert!(!CancelToken::new().is_cancelled());
    }
}
