//! Manual-kill listener.
//!
//! # Responsibilities
//! - Serve every behavior plus `/dead_or_alive`
//! - On a kill, close the listener, stay down for `dead_time`, then rebind
//! - Ignore kills that arrive while already down or restarting
//!
//! A single actor task owns the listener. The kill handler and `stop` only
//! send it commands, so transitions never overlap.

use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;

use crate::availability::state::{AvailabilityState, StateCell};
use crate::availability::AvailabilityController;
use crate::config::BehaviorConfig;
use crate::error::ServerError;
use crate::http::routes;
use crate::http::SharedEngine;
use crate::net::ServingListener;

/// Path of the kill endpoint.
pub const KILL_PATH: &str = "/dead_or_alive";

const NAME: &str = "harness";

#[derive(Debug)]
enum Command {
    /// Kill issued by a request served by listener `generation`.
    Kill { generation: u64 },
    Stop,
}

enum Lifecycle {
    Idle,
    Running {
        commands: mpsc::UnboundedSender<Command>,
        task: JoinHandle<()>,
    },
    Finished,
}

/// Handler state for the kill route of one listener generation.
#[derive(Clone)]
struct KillSwitch {
    commands: mpsc::UnboundedSender<Command>,
    generation: u64,
}

async fn dead_or_alive(State(switch): State<KillSwitch>) -> Response {
    tracing::warn!(generation = switch.generation, "Kill requested");
    let _ = switch.commands.send(Command::Kill {
        generation: switch.generation,
    });
    (StatusCode::OK, [(header::CONNECTION, "close")]).into_response()
}

fn router(engine: &SharedEngine, switch: KillSwitch) -> Router {
    let kill = Router::new()
        .route(KILL_PATH, any(dead_or_alive))
        .with_state(switch);
    routes::traced(routes::behavior_router(engine.clone()).merge(kill))
}

/// Listener that goes down on `/dead_or_alive` and revives itself after
/// `dead_time`.
pub struct HarnessServer {
    address: String,
    dead_time: Duration,
    engine: SharedEngine,
    state: StateCell,
    bound: OnceLock<SocketAddr>,
    lifecycle: Mutex<Lifecycle>,
}

impl HarnessServer {
    pub fn new(config: &BehaviorConfig, engine: SharedEngine) -> Self {
        Self::with_address(config.harness_address(), config.dead_time, engine)
    }

    pub fn with_address(address: String, dead_time: Duration, engine: SharedEngine) -> Self {
        Self {
            address,
            dead_time,
            engine,
            state: StateCell::new(NAME),
            bound: OnceLock::new(),
            lifecycle: Mutex::new(Lifecycle::Idle),
        }
    }
}

#[async_trait]
impl AvailabilityController for HarnessServer {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn start(&self) -> Result<(), ServerError> {
        let mut lifecycle = self.lifecycle.lock().await;
        match *lifecycle {
            Lifecycle::Idle => {}
            Lifecycle::Running { .. } => return Err(ServerError::AlreadyStarted(NAME)),
            Lifecycle::Finished => return Err(ServerError::Stopped(NAME)),
        }

        let (commands, inbox) = mpsc::unbounded_channel();
        let switch = KillSwitch {
            commands: commands.clone(),
            generation: 0,
        };
        let listener = ServingListener::bind(&self.address, router(&self.engine, switch)).await?;
        let address = listener.local_addr();
        let _ = self.bound.set(address);

        tracing::info!(listener = NAME, %address, dead_time = ?self.dead_time, "Listening");
        self.state.transition(AvailabilityState::Up);

        let actor = Actor {
            address,
            dead_time: self.dead_time,
            engine: self.engine.clone(),
            commands: commands.clone(),
            state: self.state.clone(),
            listener: Some(listener),
            generation: 0,
        };
        let task = tokio::spawn(actor.run(inbox));

        *lifecycle = Lifecycle::Running { commands, task };
        Ok(())
    }

    /// Close the listener for good.
    ///
    /// The lifecycle lock is held until the actor has finished, so a
    /// concurrent `stop` returns only once the listener is down.
    async fn stop(&self) -> Result<(), ServerError> {
        let mut lifecycle = self.lifecycle.lock().await;
        let previous = std::mem::replace(&mut *lifecycle, Lifecycle::Finished);

        if let Lifecycle::Running { commands, task } = previous {
            let _ = commands.send(Command::Stop);
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

enum Flow {
    Continue,
    Exit,
}

struct Actor {
    address: SocketAddr,
    dead_time: Duration,
    engine: SharedEngine,
    commands: mpsc::UnboundedSender<Command>,
    state: StateCell,
    listener: Option<ServingListener>,
    generation: u64,
}

impl Actor {
    async fn run(mut self, mut inbox: mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = inbox.recv().await {
            match command {
                Command::Stop => break,
                Command::Kill { generation }
                    if generation == self.generation && self.listener.is_some() =>
                {
                    if let Flow::Exit = self.kill_and_revive(&mut inbox).await {
                        break;
                    }
                }
                Command::Kill { generation } => {
                    tracing::debug!(generation, current = self.generation, "Stale kill ignored");
                }
            }
        }

        if let Some(listener) = self.listener.take() {
            self.state.transition(AvailabilityState::GoingDown);
            listener.close().await;
        }
        self.state.transition(AvailabilityState::Down);
    }

    async fn kill_and_revive(&mut self, inbox: &mut mpsc::UnboundedReceiver<Command>) -> Flow {
        self.state.transition(AvailabilityState::GoingDown);
        if let Some(listener) = self.listener.take() {
            listener.close().await;
        }
        self.state.transition(AvailabilityState::Down);

        self.state.transition(AvailabilityState::Restarting);
        let dead = tokio::time::sleep(self.dead_time);
        tokio::pin!(dead);
        loop {
            tokio::select! {
                _ = &mut dead => break,
                command = inbox.recv() => match command {
                    Some(Command::Kill { .. }) => continue,
                    Some(Command::Stop) | None => {
                        self.state.transition(AvailabilityState::Down);
                        return Flow::Exit;
                    }
                },
            }
        }

        self.generation += 1;
        let switch = KillSwitch {
            commands: self.commands.clone(),
            generation: self.generation,
        };
        match ServingListener::bind(&self.address.to_string(), router(&self.engine, switch)).await {
            Ok(listener) => {
                self.listener = Some(listener);
                self.state.transition(AvailabilityState::Up);
                Flow::Continue
            }
            Err(e) => {
                tracing::error!(listener = NAME, error = %e, "Restart failed; staying down");
                self.state.transition(AvailabilityState::Down);
                Flow::Exit
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{FixedRandom, Generators};
    use crate::http::FaultEngine;
    use std::sync::Arc;

    fn engine() -> SharedEngine {
        let config = Arc::new(BehaviorConfig::default());
        let generators = Generators::from_config(&config, Arc::new(FixedRandom::new())).unwrap();
        Arc::new(FaultEngine::new(config, generators).unwrap())
    }

    fn server(dead_time: Duration) -> HarnessServer {
        HarnessServer::with_address("127.0.0.1:0".to_string(), dead_time, engine())
    }

    #[tokio::test]
    async fn start_twice_fails() {
        let server = server(Duration::from_millis(50));
        server.start().await.unwrap();
        assert!(matches!(server.start().await, Err(ServerError::AlreadyStarted(_))));
        server.stop().await.unwrap();
        assert!(matches!(server.start().await, Err(ServerError::Stopped(_))));
    }

    #[tokio::test]
    async fn stop_is_idempotent_and_final() {
        let server = server(Duration::from_millis(50));
        server.start().await.unwrap();
        assert_eq!(server.state(), AvailabilityState::Up);

        server.stop().await.unwrap();
        server.stop().await.unwrap();
        assert_eq!(server.state(), AvailabilityState::Down);

        let addr = server.local_addr().unwrap();
        assert!(tokio::net::TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn overlapping_stops_both_return_after_down() {
        let server = server(Duration::from_millis(50));
        server.start().await.unwrap();

        let (first, state_after_second) = tokio::join!(server.stop(), async {
            server.stop().await.unwrap();
            server.state()
        });
        first.unwrap();
        assert_eq!(state_after_second, AvailabilityState::Down);

        let addr = server.local_addr().unwrap();
        assert!(tokio::net::TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn stop_before_start_is_a_no_op() {
        let server = server(Duration::from_millis(50));
        server.stop().await.unwrap();
        assert_eq!(server.local_addr(), None);
        assert_eq!(server.state(), AvailabilityState::Down);
    }
}
