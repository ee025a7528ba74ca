//! Per-request timing log around any behavior engine.

use std::time::Instant;

use async_trait::async_trait;
use axum::http::request::Parts;
use axum::response::Response;

use crate::http::behavior::{Behavior, BehaviorEngine};

/// Wraps an engine and logs elapsed time, final status and path of every
/// request it serves. Responses pass through untouched.
pub struct VerboseEngine<E> {
    inner: E,
}

impl<E: BehaviorEngine> VerboseEngine<E> {
    pub fn new(inner: E) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    async fn observe(&self, behavior: Behavior, request: &Parts) -> Response {
        let start = Instant::now();
        let response = behavior.invoke(&self.inner, request).await;

        tracing::info!(
            elapsed = ?start.elapsed(),
            status = response.status().as_u16(),
            path = %request.uri.path(),
            "Request served"
        );
        response
    }
}

#[async_trait]
impl<E: BehaviorEngine> BehaviorEngine for VerboseEngine<E> {
    async fn success(&self, request: &Parts) -> Response {
        self.observe(Behavior::Success, request).await
    }

    async fn server_error(&self, request: &Parts) -> Response {
        self.observe(Behavior::ServerError, request).await
    }

    async fn content_size(&self, request: &Parts) -> Response {
        self.observe(Behavior::ContentSize, request).await
    }

    async fn wait(&self, request: &Parts) -> Response {
        self.observe(Behavior::Wait, request).await
    }

    async fn redirect(&self, request: &Parts) -> Response {
        self.observe(Behavior::Redirect, request).await
    }

    async fn client_error(&self, request: &Parts) -> Response {
        self.observe(Behavior::ClientError, request).await
    }

    async fn defined(&self, request: &Parts) -> Response {
        self.observe(Behavior::Defined, request).await
    }
}
