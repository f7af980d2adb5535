//! Web server module
//!
//! Serves the search page and a small JSON API over the search session.

mod handlers;
mod routes;
mod state;
mod templates;

pub use routes::create_router;
pub use state::{AppState, ModelSelection};
pub use templates::Templates;
