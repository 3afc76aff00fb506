//! Storefront Pages
//!
//! Server-rendered homepage and collection pages. A collection request is
//! searched on the server for its own URL, so the response already carries
//! the results and the search state the client resumes from.
//!
//! # Routes
//!
//! - `GET /` links to the featured collections
//! - `GET /collections/:handle` renders the search page; with
//!   `Accept: application/json` it returns the loader payload instead
//!
//! # Usage
//!
//! ```rust,ignore
//! use storefront::storefront;
//!
//! let app = Router::new()
//!     .merge(storefront::routes())
//!     .with_state(app_state);
//! ```

mod handler;
mod page;
mod routes;


pub use handler::LoaderData;
pub use page::ServerState;
pub use routes::routes;
