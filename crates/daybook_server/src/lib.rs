//! HTTP surface of daybook: configuration, routing, session cookies and
//! error rendering over `daybook_core`.

pub mod config;
pub mod error;
pub mod routes;
pub mod session;
pub mod state;

pub use config::{CliArgs, ServerConfig};
pub use routes::router;
pub use state::AppState;
