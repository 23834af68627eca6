//! Web layer for the station wait-time app.
//!
//! Serves the HTML pages and the JSON API the pages call.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, Backend, Firebase};
