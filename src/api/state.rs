//! Application state shared by every handler.

use std::sync::Arc;

use super::graphql::{build_schema, AppSchema};
use super::guard::AccessGuard;
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::Database;
use crate::services::{AuthService, ServiceContainer, Services, UserService};

#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// User service
    pub user_service: Arc<dyn UserService>,
    /// Access guard, consulted before any service call
    pub guard: AccessGuard,
    /// Executable GraphQL schema
    pub schema: AppSchema,
    /// Database handle for health checks; absent when services are
    /// wired without one
    pub database: Option<Arc<Database>>,
}

impl AppState {
    /// Create application state from database connection and config.
    pub fn from_config(database: Arc<Database>, config: &Config) -> AppResult<Self> {
        let services = Services::from_connection(database.get_connection(), config)?;
        Ok(Self::from_services(&services, Some(database)))
    }

    /// Create application state from an already wired container.
    pub fn from_services<C: ServiceContainer>(
        container: &C,
        database: Option<Arc<Database>>,
    ) -> Self {
        let auth_service = container.auth();
        let user_service = container.users();

        Self {
            schema: build_schema(auth_service.clone(), user_service.clone()),
            guard: AccessGuard::new(container.tokens()),
            auth_service,
            user_service,
            database,
        }
    }
}
