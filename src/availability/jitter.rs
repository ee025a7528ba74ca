//! Timer-driven up/down listener.
//!
//! Every `jitter_interval` the listener flips: an open listener is closed,
//! a closed one is rebound. A zero interval disables the controller.

use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use tokio::sync::{oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::availability::state::{AvailabilityState, StateCell};
use crate::availability::AvailabilityController;
use crate::config::BehaviorConfig;
use crate::error::ServerError;
use crate::http::routes;
use crate::http::SharedEngine;
use crate::net::{ListenerError, ServingListener};

const NAME: &str = "jitter";

enum Lifecycle {
    Idle,
    Running {
        stop: oneshot::Sender<()>,
        task: JoinHandle<()>,
    },
    Disabled,
    Finished,
}

/// Listener that alternates between up and down on a fixed period.
pub struct JitterServer {
    address: String,
    interval: Duration,
    engine: SharedEngine,
    state: StateCell,
    bound: OnceLock<SocketAddr>,
    lifecycle: Mutex<Lifecycle>,
}

impl JitterServer {
    pub fn new(config: &BehaviorConfig, engine: SharedEngine) -> Self {
        Self::with_address(config.jitter_address(), config.jitter_interval, engine)
    }

    pub fn with_address(address: String, interval: Duration, engine: SharedEngine) -> Self {
        Self {
            address,
            interval,
            engine,
            state: StateCell::new(NAME),
            bound: OnceLock::new(),
            lifecycle: Mutex::new(Lifecycle::Idle),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.interval.is_zero()
    }
}

#[async_trait]
impl AvailabilityController for JitterServer {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn start(&self) -> Result<(), ServerError> {
        let mut lifecycle = self.lifecycle.lock().await;
        match *lifecycle {
            Lifecycle::Idle => {}
            Lifecycle::Running { .. } | Lifecycle::Disabled => {
                return Err(ServerError::AlreadyStarted(NAME))
            }
            Lifecycle::Finished => return Err(ServerError::Stopped(NAME)),
        }

        if !self.is_enabled() {
            tracing::info!(listener = NAME, "Jitter disabled");
            *lifecycle = Lifecycle::Disabled;
            return Ok(());
        }

        let router = routes::traced(routes::behavior_router(self.engine.clone()));
        let listener = ServingListener::bind(&self.address, router.clone()).await?;
        let address = listener.local_addr();
        let _ = self.bound.set(address);

        tracing::info!(listener = NAME, %address, interval = ?self.interval, "Listening");
        self.state.transition(AvailabilityState::Up);

        let (stop, stopped) = oneshot::channel();
        let actor = Actor {
            address,
            interval: self.interval,
            router,
            state: self.state.clone(),
            listener: Some(listener),
        };
        let task = tokio::spawn(actor.run(stopped));

        *lifecycle = Lifecycle::Running { stop, task };
        Ok(())
    }

    async fn stop(&self) -> Result<(), ServerError> {
        // Held until the actor exits so overlapping stops both see Down.
        let mut lifecycle = self.lifecycle.lock().await;
        let previous = std::mem::replace(&mut *lifecycle, Lifecycle::Finished);

        if let Lifecycle::Running { stop, task } = previous {
            let _ = stop.send(());
            if let Err(e) = task.await {
                tracing::error!(listener = NAME, error = %e, "Controller task failed");
            }
            tracing::info!(listener = NAME, "Stopped");
        }
        Ok(())
    }

    fn state(&self) -> AvailabilityState {
        self.state.get()
    }

    fn subscribe(&self) -> watch::Receiver<AvailabilityState> {
        self.state.subscribe()
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        self.bound.get().copied()
    }
}

struct Actor {
    address: SocketAddr,
    interval: Duration,
    router: Router,
    state: StateCell,
    listener: Option<ServingListener>,
}

impl Actor {
    async fn run(mut self, mut stopped: oneshot::Receiver<()>) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let stop_requested = loop {
            tokio::select! {
                biased;
                _ = &mut stopped => break true,
                _ = ticker.tick() => {
                    if let Err(e) = self.toggle().await {
                        tracing::error!(listener = NAME, error = %e, "Rebind failed; staying down");
                        break false;
                    }
                }
            }
        };

        if let Some(listener) = self.listener.take() {
            self.state.transition(AvailabilityState::GoingDown);
            listener.close().await;
        }
        self.state.transition(AvailabilityState::Down);

        // A failed rebind ends the ticks; hold until stop so the owner sees
        // the same shutdown sequence either way.
        if !stop_requested {
            let _ = stopped.await;
        }
    }

    async fn toggle(&mut self) -> Result<(), ListenerError> {
        match self.listener.take() {
            Some(listener) => {
                self.state.transition(AvailabilityState::GoingDown);
                listener.close().await;
                self.state.transition(AvailabilityState::Down);
            }
            None => {
                self.state.transition(AvailabilityState::Restarting);
                let listener =
                    ServingListener::bind(&self.address.to_string(), self.router.clone()).await?;
                self.listener = Some(listener);
                self.state.transition(AvailabilityState::Up);
            }
        }
        Ok(())
    }
}
