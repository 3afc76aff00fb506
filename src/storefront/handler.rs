use axum::{
    Json,
    extract::{OriginalUri, Path, State},
    http::{HeaderMap, header},
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;

use super::page::{PageBuilder, ServerState, render_collection, render_home};
use crate::error::StorefrontError;
use crate::handler::AppState;
use crate::routing::{RoutingConfig, build_routing, request_url};
use crate::search::build_request;

/// Payload served to client-side navigations instead of HTML.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderData {
    pub server_state: ServerState,
    pub server_url: String,
    pub handle: String,
}

fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"))
}

pub async fn homepage(State(state): State<AppState>) -> Result<Html<String>, StorefrontError> {
    let html = render_home(&state.config.app.featured_collections)?;
    Ok(Html(html))
}

pub async fn collection(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Result<Response, StorefrontError> {
    if handle.trim().is_empty() {
        return Err(StorefrontError::MissingHandle);
    }

    let search_cfg = &state.config.search;
    let server_url = request_url(state.config.app.public_url.as_deref(), &headers, &uri);

    let router = build_routing(&RoutingConfig {
        index_name: search_cfg.index_name.clone(),
        server_url: server_url.clone(),
        configure: search_cfg.collection_configure(&handle),
    })?;

    let ui_state = router.read();
    let index_state = ui_state
        .index(&search_cfg.index_name)
        .cloned()
        .unwrap_or_default();
    let request = build_request(&index_state, &search_cfg.index_name, &search_cfg.facets);

    tracing::info!(
        handle = %handle,
        index = %request.index_name,
        page = request.params.page,
        "rendering collection"
    );
    let results = state.search.search(&request).await?;

    let server_state = ServerState {
        index_name: search_cfg.index_name.clone(),
        route_state: router.route_state(),
        ui_state: ui_state.clone(),
        results,
    };

    if wants_json(&headers) {
        return Ok(Json(LoaderData {
            server_state,
            server_url,
            handle,
        })
        .into_response());
    }

    let page = PageBuilder::new(&router, &ui_state).build(
        &handle,
        &state.config.app.featured_collections,
        &search_cfg.sort_options,
        &search_cfg.facets,
        &server_state,
    )?;

    Ok(Html(render_collection(&page)?).into_response())
}
