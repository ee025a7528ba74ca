//! Several availability controllers behind one start/stop pair.

use std::sync::Arc;

use crate::availability::harness::HarnessServer;
use crate::availability::jitter::JitterServer;
use crate::availability::AvailabilityController;
use crate::config::BehaviorConfig;
use crate::error::ServerError;
use crate::http::SharedEngine;
use crate::lifecycle::DoneSignal;

/// Runs every member listener and reports their joint shutdown as one
/// [`DoneSignal`].
pub struct ServerAggregate {
    members: Vec<Arc<dyn AvailabilityController>>,
    done: DoneSignal,
}

impl ServerAggregate {
    pub fn new(members: Vec<Arc<dyn AvailabilityController>>) -> Self {
        Self {
            members,
            done: DoneSignal::new(),
        }
    }

    /// Manual-kill listener on `port` plus jitter listener on `jitter_port`,
    /// both serving `engine`.
    pub fn from_config(config: &BehaviorConfig, engine: SharedEngine) -> Self {
        let harness: Arc<dyn AvailabilityController> =
            Arc::new(HarnessServer::new(config, engine.clone()));
        let jitter: Arc<dyn AvailabilityController> = Arc::new(JitterServer::new(config, engine));
        Self::new(vec![harness, jitter])
    }

    pub fn members(&self) -> &[Arc<dyn AvailabilityController>] {
        &self.members
    }

    /// Start members in order. If one fails, those already started are
    /// stopped again and the error is returned.
    pub async fn start(&self) -> Result<(), ServerError> {
        for (index, member) in self.members.iter().enumerate() {
            if let Err(e) = member.start().await {
                tracing::error!(listener = member.name(), error = %e, "Failed to start");
                for started in self.members[..index].iter().rev() {
                    if let Err(e) = started.stop().await {
                        tracing::warn!(listener = started.name(), error = %e, "Failed to stop");
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// Stop every member, then fire the done signal.
    ///
    /// All members are stopped even if one fails; the first error is
    /// returned. The done signal fires once no matter how often this runs.
    /// Member `stop` waits for any stop already in flight, so an overlapping
    /// call also returns only after every listener is down.
    pub async fn stop(&self) -> Result<(), ServerError> {
        let mut first_error = None;
        for member in self.members.iter().rev() {
            if let Err(e) = member.stop().await {
                tracing::warn!(listener = member.name(), error = %e, "Failed to stop");
                first_error.get_or_insert(e);
            }
        }

        if self.done.trigger() {
            tracing::info!("All listeners stopped");
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn done(&self) -> DoneSignal {
        self.done.clone()
    }

    /// Wait until `stop` has completed.
    pub async fn wait(&self) {
        self.done.wait().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::AvailabilityState;
    use async_trait::async_trait;
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::watch;

    struct Recorder {
        fail_start: bool,
        starts: AtomicUsize,
        stops: AtomicUsize,
        state: watch::Sender<AvailabilityState>,
    }

    impl Recorder {
        fn new(fail_start: bool) -> Arc<Self> {
            let (state, _) = watch::channel(AvailabilityState::Down);
            Arc::new(Self {
                fail_start,
                starts: AtomicUsize::new(0),
                stops: AtomicUsize::new(0),
                state,
            })
        }
    }

    fn members(recorders: &[&Arc<Recorder>]) -> Vec<Arc<dyn AvailabilityController>> {
        recorders
            .iter()
            .map(|r| (*r).clone() as Arc<dyn AvailabilityController>)
            .collect()
    }

    #[async_trait]
    impl AvailabilityController for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        async fn start(&self) -> Result<(), ServerError> {
            if self.fail_start {
                return Err(ServerError::Stopped("recorder"));
            }
            self.starts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn stop(&self) -> Result<(), ServerError> {
            self.stops.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn state(&self) -> AvailabilityState {
            *self.state.borrow()
        }

        fn subscribe(&self) -> watch::Receiver<AvailabilityState> {
            self.state.subscribe()
        }

        fn local_addr(&self) -> Option<SocketAddr> {
            None
        }
    }

    #[tokio::test]
    async fn stop_reaches_every_member_and_fires_done_once() {
        let a = Recorder::new(false);
        let b = Recorder::new(false);
        let aggregate = ServerAggregate::new(members(&[&a, &b]));

        aggregate.start().await.unwrap();
        assert!(!aggregate.done().is_done());

        aggregate.stop().await.unwrap();
        aggregate.stop().await.unwrap();
        aggregate.wait().await;

        assert_eq!(a.stops.load(Ordering::SeqCst), 2);
        assert_eq!(b.stops.load(Ordering::SeqCst), 2);
        assert!(aggregate.done().is_done());
        assert!(!aggregate.done().trigger());
    }

    #[tokio::test]
    async fn failed_start_rolls_back_started_members() {
        let a = Recorder::new(false);
        let b = Recorder::new(true);
        let c = Recorder::new(false);
        let aggregate = ServerAggregate::new(members(&[&a, &b, &c]));

        assert!(aggregate.start().await.is_err());
        assert_eq!(a.starts.load(Ordering::SeqCst), 1);
        assert_eq!(a.stops.load(Ordering::SeqCst), 1);
        assert_eq!(b.stops.load(Ordering::SeqCst), 0);
        assert_eq!(c.starts.load(Ordering::SeqCst), 0);
    }
}
