use std::sync::Arc;

use labelhub_core::gateway::Gateway;
use labelhub_core::store::{AccountStore, Store};

use crate::auth::provider::LocalIdentityProvider;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Ownership-scoped access to the project tree.
    pub gateway: Gateway,
    /// Account registration, sign-in and token issuance.
    pub identity: Arc<LocalIdentityProvider>,
    /// Server configuration (JWT secret, password policy, timeouts).
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, accounts: Arc<dyn AccountStore>, config: ServerConfig) -> Self {
        let identity = LocalIdentityProvider::new(
            accounts,
            config.jwt.clone(),
            config.min_password_length,
        );
        Self {
            gateway: Gateway::new(store),
            identity: Arc::new(identity),
            config: Arc::new(config),
        }
    }
}
