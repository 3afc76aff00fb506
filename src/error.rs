use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouteStateError {
    #[error("facet filter with an empty name")]
    EmptyFacetName,
}

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("invalid url {url}")]
    InvalidUri {
        url: String,
        #[source]
        source: axum::http::uri::InvalidUri,
    },
    #[error("url {0} is not absolute")]
    NotAbsolute(String),
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed")]
    Transport(#[from] reqwest::Error),
    #[error("search backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode search response")]
    Decode(#[from] serde_json::Error),
    #[error("invalid search configuration: {0}")]
    Config(String),
}

#[derive(Debug, Error)]
pub enum StorefrontError {
    #[error("collection handle is missing")]
    MissingHandle,
    #[error("bad request location")]
    Location(#[from] LocationError),
    #[error("search failed")]
    Search(#[from] SearchError),
    #[error("failed to render page")]
    Render(#[from] minijinja::Error),
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl StorefrontError {
    fn status(&self) -> StatusCode {
        use StorefrontError::*;
        match self {
            MissingHandle | Location(_) => StatusCode::BAD_REQUEST,
            Search(_) => StatusCode::BAD_GATEWAY,
            Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for StorefrontError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = crate::unpack_error(&self);
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %detail, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %detail, "request rejected");
        }

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
