use std::sync::Arc;

use hello_db::HumanStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Record store used for point lookups.
    pub humans: Arc<dyn HumanStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
