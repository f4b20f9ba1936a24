use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/healthz", get(handlers::healthz))
        .route("/api/view", get(handlers::get_view).post(handlers::post_view))
        .route("/api/charts/:series/:grouping", get(handlers::get_chart))
        .route("/api/charts/:series/:grouping/spec", get(handlers::get_chart_spec))
        .with_state(state)
}
