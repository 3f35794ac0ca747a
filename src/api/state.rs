//! Application state - dependency injection container for handlers.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{CacheStore, Database};
use crate::services::ServiceContainer;

/// Shared by every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    /// Every application service
    pub services: Arc<dyn ServiceContainer>,
    /// Redis, for rate limits and health checks
    pub cache: Arc<dyn CacheStore>,
    /// Database connection, for health checks
    pub database: Arc<Database>,
    pub config: Config,
}

impl AppState {
    pub fn new(
        services: Arc<dyn ServiceContainer>,
        cache: Arc<dyn CacheStore>,
        database: Arc<Database>,
        config: Config,
    ) -> Self {
        Self {
            services,
            cache,
            database,
            config,
        }
    }
}
