use std::sync::Arc;

use axum::{Json, Router, response::IntoResponse, routing::get};
use tracing::info;

use crate::assets::serve_embedded;
use crate::config::Config;
use crate::search::SearchBackend;
use crate::storefront;

#[derive(Clone)]
pub struct AppState {
    pub search: Arc<dyn SearchBackend>,
    pub config: Arc<Config>,
}

pub async fn healthcheck() -> impl IntoResponse {
    info!("got healthcheck request");
    Json(serde_json::json!({ "status": "ok" }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(healthcheck))
        .merge(storefront::routes())
        .fallback(serve_embedded)
        .with_state(state)
}
