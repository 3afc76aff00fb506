//! Routing State Module
//!
//! Keeps the search UI state (pagination, sort, query, facet refinements) in
//! sync with the page URL.
//!
//! # Architecture
//!
//! - `qs` reads and writes the query string, arrays comma-joined
//! - `RouteState` is the flat record carried by the URL
//! - `UiState` is the nested record consumed by the search page, keyed by index
//! - `StateMapping` converts between the two; defaults never reach the URL
//! - `HistoryRouter` ties a location source to the mapping
//!
//! # Usage
//!
//! ```rust,ignore
//! use storefront::routing::{RoutingConfig, build_routing};
//!
//! let router = build_routing(&RoutingConfig {
//!     index_name: "products".to_string(),
//!     server_url: "http://localhost:3000/collections/summer?page=2".to_string(),
//!     configure: Default::default(),
//! })?;
//! let ui_state = router.read();
//! let next_page_url = router.href_for(&ui_state);
//! ```

pub mod location;
pub mod mapping;
pub mod qs;
pub mod route_state;
pub mod router;
pub mod ui_state;

pub use location::{GetLocation, Location, ServerLocation, request_url};
pub use mapping::{
    DEFAULT_HITS_PER_PAGE, DEFAULT_PAGE, DEFAULT_SORT_BY, StateMapping,
    refinement_list_from_route_state,
};
pub use route_state::{MAX_ITEMS_PER_PAGE, RESERVED_KEYS, RouteState, RouteValue};
pub use router::{HistoryRouter, RoutingConfig, build_routing};
pub use ui_state::{Configure, IndexUiState, RefinementList, UiState};
