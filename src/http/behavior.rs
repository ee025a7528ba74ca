//! Behavior endpoints and the engine that produces their responses.
//!
//! # Endpoints
//! ```text
//! /success       configured headers, 200, configured content
//! /server_error  configured headers, drawn 5xx
//! /content_size  configured headers, 200, filler body of fixed or drawn length
//! /wait          fixed or drawn delay, then exactly like /success
//! /redirect      configured headers, drawn 3xx, `location: /redirect`
//!                for 301/302/303/307 unless a location is already set
//! /client_error  configured headers, drawn 4xx
//! /defined       configured headers, status from `?code=`, 400 if absent
//!                or not an integer
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::Query;
use axum::http::request::Parts;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use serde::Deserialize;

use crate::config::schema::BehaviorConfig;
use crate::generators::Generators;
use crate::http::headers::{HeaderError, ResponseHeaders};

/// One fault-injection response class, addressed by its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Behavior {
    Success,
    ServerError,
    ContentSize,
    Wait,
    Redirect,
    ClientError,
    Defined,
}

impl Behavior {
    pub const ALL: [Behavior; 7] = [
        Behavior::Success,
        Behavior::ServerError,
        Behavior::ContentSize,
        Behavior::Wait,
        Behavior::Redirect,
        Behavior::ClientError,
        Behavior::Defined,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Behavior::Success => "/success",
            Behavior::ServerError => "/server_error",
            Behavior::ContentSize => "/content_size",
            Behavior::Wait => "/wait",
            Behavior::Redirect => "/redirect",
            Behavior::ClientError => "/client_error",
            Behavior::Defined => "/defined",
        }
    }

    /// Label used in logs and metrics.
    pub fn name(self) -> &'static str {
        &self.path()[1..]
    }

    /// Run the matching engine operation.
    pub async fn invoke(self, engine: &dyn BehaviorEngine, request: &Parts) -> Response {
        match self {
            Behavior::Success => engine.success(request).await,
            Behavior::ServerError => engine.server_error(request).await,
            Behavior::ContentSize => engine.content_size(request).await,
            Behavior::Wait => engine.wait(request).await,
            Behavior::Redirect => engine.redirect(request).await,
            Behavior::ClientError => engine.client_error(request).await,
            Behavior::Defined => engine.defined(request).await,
        }
    }
}

/// The seven behavior operations. Decorators implement this trait too and
/// wrap another engine.
#[async_trait]
pub trait BehaviorEngine: Send + Sync {
    async fn success(&self, request: &Parts) -> Response;
    async fn server_error(&self, request: &Parts) -> Response;
    async fn content_size(&self, request: &Parts) -> Response;
    async fn wait(&self, request: &Parts) -> Response;
    async fn redirect(&self, request: &Parts) -> Response;
    async fn client_error(&self, request: &Parts) -> Response;
    async fn defined(&self, request: &Parts) -> Response;
}

pub type SharedEngine = Arc<dyn BehaviorEngine>;

/// Redirect codes whose semantics call for a target.
const TARGETED_REDIRECTS: [StatusCode; 4] = [
    StatusCode::MOVED_PERMANENTLY,
    StatusCode::FOUND,
    StatusCode::SEE_OTHER,
    StatusCode::TEMPORARY_REDIRECT,
];

#[derive(Debug, Deserialize)]
struct DefinedQuery {
    code: Option<String>,
}

/// The default engine: configured content and headers, randomness from
/// [`Generators`].
pub struct FaultEngine {
    config: Arc<BehaviorConfig>,
    headers: ResponseHeaders,
    generators: Generators,
}

impl FaultEngine {
    pub fn new(config: Arc<BehaviorConfig>, generators: Generators) -> Result<Self, HeaderError> {
        let headers = ResponseHeaders::parse(&config.headers)?;
        Ok(Self {
            config,
            headers,
            generators,
        })
    }

    fn respond(&self, status: StatusCode, body: Body) -> Response {
        let mut response = Response::new(body);
        self.headers.apply(response.headers_mut());
        *response.status_mut() = status;
        response
    }

    fn content(&self) -> Response {
        self.respond(StatusCode::OK, Body::from(self.config.content.clone()))
    }
}

#[async_trait]
impl BehaviorEngine for FaultEngine {
    async fn success(&self, _request: &Parts) -> Response {
        self.content()
    }

    async fn server_error(&self, _request: &Parts) -> Response {
        self.respond(self.generators.server_error.generate(), Body::empty())
    }

    async fn content_size(&self, _request: &Parts) -> Response {
        self.respond(StatusCode::OK, Body::from(self.generators.body.generate()))
    }

    async fn wait(&self, request: &Parts) -> Response {
        let slept = self.generators.snoozer.snooze().await;
        tracing::trace!(path = %request.uri.path(), slept = ?slept, "Wait finished");
        self.content()
    }

    async fn redirect(&self, request: &Parts) -> Response {
        let status = self.generators.redirection.generate();
        let mut response = self.respond(status, Body::empty());

        if TARGETED_REDIRECTS.contains(&status) && !response.headers().contains_key(header::LOCATION) {
            if let Ok(target) = HeaderValue::from_str(request.uri.path()) {
                response.headers_mut().insert(header::LOCATION, target);
            }
        }
        response
    }

    async fn client_error(&self, _request: &Parts) -> Response {
        self.respond(self.generators.client_error.generate(), Body::empty())
    }

    async fn defined(&self, request: &Parts) -> Response {
        let status = Query::<DefinedQuery>::try_from_uri(&request.uri)
            .ok()
            .and_then(|Query(query)| query.code)
            .and_then(|code| code.parse::<i64>().ok())
            .and_then(|code| u16::try_from(code).ok())
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::BAD_REQUEST);

        self.respond(status, Body::empty())
    }
}
