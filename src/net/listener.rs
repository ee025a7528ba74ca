//! TCP listener that can be closed and reopened.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Run the accept loop and hand each connection to hyper
//! - Release the port as soon as `close` returns
//! - Ask open connections to finish their in-flight request and close

use std::net::SocketAddr;

use axum::Router;
use hyper::body::Incoming;
use hyper::Request;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tower::Service;

/// Error type for listener operations.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Bound socket has no readable local address.
    #[error("Failed to read local address: {0}")]
    LocalAddr(#[source] std::io::Error),
}

/// A bound listener serving one router until closed.
///
/// Dropping it without calling [`ServingListener::close`] also stops the
/// accept loop, but does not wait for the port to be released.
pub struct ServingListener {
    local_addr: SocketAddr,
    stop_tx: watch::Sender<bool>,
    accept_task: JoinHandle<()>,
}

impl ServingListener {
    /// Bind `address` and start serving `router` on it.
    pub async fn bind(address: &str, router: Router) -> Result<Self, ListenerError> {
        let listener = TcpListener::bind(address)
            .await
            .map_err(|source| ListenerError::Bind {
                address: address.to_string(),
                source,
            })?;

        let local_addr = listener.local_addr().map_err(ListenerError::LocalAddr)?;

        tracing::debug!(address = %local_addr, "Listener bound");

        let (stop_tx, stop_rx) = watch::channel(false);
        let accept_task = tokio::spawn(accept_loop(listener, router, stop_rx));

        Ok(Self {
            local_addr,
            stop_tx,
            accept_task,
        })
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting and release the port.
    ///
    /// Returns once the listening socket is closed. Connections already
    /// accepted finish their current request in the background.
    pub async fn close(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.accept_task.await {
            tracing::error!(address = %self.local_addr, error = %e, "Accept loop ended abnormally");
        }
        tracing::debug!(address = %self.local_addr, "Listener closed");
    }
}

async fn accept_loop(listener: TcpListener, router: Router, mut stop_rx: watch::Receiver<bool>) {
    loop {
        let (stream, peer_addr) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(connection) => connection,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to accept connection");
                    continue;
                }
            },
            _ = stop_rx.changed() => break,
        };

        tracing::trace!(peer_addr = %peer_addr, "Connection accepted");
        tokio::spawn(serve_connection(stream, router.clone(), stop_rx.clone()));
    }
    // `listener` drops here, closing the socket.
}

async fn serve_connection(stream: TcpStream, router: Router, mut stop_rx: watch::Receiver<bool>) {
    let service = hyper::service::service_fn(move |request: Request<Incoming>| {
        router.clone().call(request)
    });

    let builder = auto::Builder::new(TokioExecutor::new());
    let connection = builder.serve_connection(TokioIo::new(stream), service);
    tokio::pin!(connection);

    tokio::select! {
        result = connection.as_mut() => {
            if let Err(e) = result {
                tracing::debug!(error = %e, "Connection ended with error");
            }
            return;
        }
        _ = stop_rx.changed() => {}
    }

    connection.as_mut().graceful_shutdown();
    if let Err(e) = connection.await {
        tracing::debug!(error = %e, "Connection ended with error while draining");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;

    fn router() -> Router {
        Router::new().route("/ping", get(|| async { "pong" }))
    }

    #[tokio::test]
    async fn close_releases_the_port() {
        let listener = ServingListener::bind("127.0.0.1:0", router()).await.unwrap();
        let addr = listener.local_addr();
        assert!(TcpStream::connect(addr).await.is_ok());

        listener.close().await;
        assert!(TcpStream::connect(addr).await.is_err());

        let reopened = ServingListener::bind(&addr.to_string(), router()).await.unwrap();
        assert_eq!(reopened.local_addr(), addr);
        assert!(TcpStream::connect(addr).await.is_ok());
        reopened.close().await;
    }

    #[tokio::test]
    async fn serves_http() {
        let listener = ServingListener::bind("127.0.0.1:0", router()).await.unwrap();
        let url = format!("http://{}/ping", listener.local_addr());

        let body = reqwest::Client::builder()
            .no_proxy()
            .build()
            .unwrap()
            .get(url)
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "pong");
        listener.close().await;
    }

    #[tokio::test]
    async fn second_bind_on_same_port_fails() {
        let listener = ServingListener::bind("127.0.0.1:0", router()).await.unwrap();
        let result = ServingListener::bind(&listener.local_addr().to_string(), router()).await;
        assert!(matches!(result, Err(ListenerError::Bind { .. })));
        listener.close().await;
    }
}
