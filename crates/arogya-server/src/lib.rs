//! Arogya server: HTTP API and command-line entry points.

pub mod cli;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
