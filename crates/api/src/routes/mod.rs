pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// All `/api/v1` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/mappings", post(handlers::mappings::build))
        .route(
            "/imports",
            get(handlers::imports::list).post(handlers::imports::create),
        )
        .route("/imports/{id}", get(handlers::imports::show))
        .route("/imports/{id}/run", post(handlers::imports::run))
}
