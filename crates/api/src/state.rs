use std::sync::Arc;

use backoffice_access::NotificationService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; the service holds its store behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Authorization-enforcing access to notifications and preferences.
    pub notifications: NotificationService,
}
