use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;
use super::handlers;

pub fn create_router(state: AppState) -> Router {
    let ops = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render));

    // Player ids are unauthenticated client tokens
    let game = Router::new()
        .route("/api/players", get(handlers::players::get_or_create))
        .route("/api/prices", get(handlers::prices::current))
        .route("/api/guesses", post(handlers::guesses::place))
        .route(
            "/api/guesses/resolve",
            post(handlers::guesses::resolve).delete(handlers::guesses::clear),
        );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    ops.merge(game)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
