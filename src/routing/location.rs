use std::str::FromStr;

use axum::http::{HeaderMap, Uri, header};
use serde::Serialize;

use crate::error::LocationError;

/// The parts of a URL the router reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    /// Scheme and authority, e.g. `https://shop.example.com`.
    pub origin: String,
    pub pathname: String,
    /// Query string including its leading `?`, or empty.
    pub search: String,
}

impl FromStr for Location {
    type Err = LocationError;

    fn from_str(url: &str) -> Result<Self, Self::Err> {
        let uri: Uri = url.parse().map_err(|source| LocationError::InvalidUri {
            url: url.to_string(),
            source,
        })?;

        let (Some(scheme), Some(authority)) = (uri.scheme_str(), uri.authority()) else {
            return Err(LocationError::NotAbsolute(url.to_string()));
        };

        let pathname = match uri.path() {
            "" => "/".to_string(),
            path => path.to_string(),
        };
        let search = uri
            .query()
            .filter(|q| !q.is_empty())
            .map(|q| format!("?{q}"))
            .unwrap_or_default();

        Ok(Location {
            origin: format!("{scheme}://{authority}"),
            pathname,
            search,
        })
    }
}

/// Source of the current location.
pub trait GetLocation {
    fn get_location(&self) -> Location;
}

impl GetLocation for Location {
    fn get_location(&self) -> Location {
        self.clone()
    }
}

/// Location synthesized from the URL of the request being rendered.
#[derive(Debug, Clone)]
pub struct ServerLocation {
    location: Location,
}

impl ServerLocation {
    pub fn new(server_url: &str) -> Result<Self, LocationError> {
        Ok(ServerLocation {
            location: server_url.parse()?,
        })
    }
}

impl GetLocation for ServerLocation {
    fn get_location(&self) -> Location {
        self.location.clone()
    }
}

/// Rebuilds the absolute URL of an incoming request. A configured public base
/// URL wins over the `Host` header.
pub fn request_url(public_url: Option<&str>, headers: &HeaderMap, uri: &Uri) -> String {
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    if let Some(base) = public_url {
        return format!("{}{}", base.trim_end_matches('/'), path_and_query);
    }

    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .unwrap_or("localhost");

    format!("http://{host}{path_and_query}")
}
