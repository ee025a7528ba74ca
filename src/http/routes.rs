//! Router assembly for the behavior endpoints.
//!
//! Every endpoint answers any method; GET, POST, PUT and DELETE behave the
//! same.

use std::time::Instant;

use axum::extract::{Request, State};
use axum::response::Response;
use axum::routing::any;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::http::behavior::{Behavior, SharedEngine};
use crate::observability::metrics;

/// Routes for the seven behavior endpoints, without middleware.
pub fn behavior_router(engine: SharedEngine) -> Router {
    let mut router = Router::new();
    for behavior in Behavior::ALL {
        router = router.route(
            behavior.path(),
            any(move |State(engine): State<SharedEngine>, request: Request| async move {
                serve(behavior, engine, request).await
            }),
        );
    }
    router.with_state(engine)
}

/// Add request tracing to a fully assembled router.
pub fn traced(router: Router) -> Router {
    router.layer(TraceLayer::new_for_http())
}

async fn serve(behavior: Behavior, engine: SharedEngine, request: Request) -> Response {
    let start = Instant::now();
    let (parts, _body) = request.into_parts();
    let response = behavior.invoke(engine.as_ref(), &parts).await;
    metrics::record_response(behavior.name(), response.status().as_u16(), start);
    response
}
