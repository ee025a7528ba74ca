//! Completion signal shared by the server aggregate and its waiters.

use std::sync::Arc;

use tokio::sync::watch;

/// One-shot, clonable "everything stopped" notification.
///
/// Any number of tasks may wait on it, before or after it fires.
#[derive(Clone)]
pub struct DoneSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl DoneSignal {
    /// Create a signal that has not fired yet.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Fire the signal. Returns `true` only for the call that fired it.
    pub fn trigger(&self) -> bool {
        self.tx.send_if_modified(|done| {
            if *done {
                false
            } else {
                *done = true;
                true
            }
        })
    }

    /// Whether the signal has fired.
    pub fn is_done(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until the signal fires.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|done| *done).await;
    }
}

impl Default for DoneSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn fires_once() {
        let done = DoneSignal::new();
        assert!(!done.is_done());
        assert!(done.trigger());
        assert!(!done.trigger());
        assert!(done.is_done());
    }

    #[tokio::test]
    async fn wakes_waiters_registered_before_and_after() {
        let done = DoneSignal::new();
        let early = {
            let done = done.clone();
            tokio::spawn(async move { done.wait().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        done.trigger();

        tokio::time::timeout(Duration::from_secs(1), early)
            .await
            .unwrap()
            .unwrap();
        tokio::time::timeout(Duration::from_secs(1), done.wait())
            .await
            .unwrap();
    }
}
