use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::database::{DatabaseError, DatabaseManager, Store};
use crate::services::{AccountService, BillService, FamilyService, IdentityResolver, MembershipGuard};

/// Connectivity probe behind `GET /health`
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn check(&self) -> Result<(), DatabaseError>;
}

#[async_trait]
impl HealthCheck for PgPool {
    async fn check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(self).await
    }
}

/// Always healthy; used when the app runs without a database
pub struct NoopHealth;

#[async_trait]
impl HealthCheck for NoopHealth {
    async fn check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

/// Shared, immutable per-process state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub accounts: AccountService,
    pub families: FamilyService,
    pub bills: BillService,
    pub health: Arc<dyn HealthCheck>,
}

impl AppState {
    /// Wires every service onto the same store handle
    pub fn new<S>(config: AppConfig, store: Arc<S>, health: Arc<dyn HealthCheck>) -> Self
    where
        S: Store + 'static,
    {
        let config = Arc::new(config);
        let identity = IdentityResolver::new(store.clone());
        let guard = MembershipGuard::new(identity.clone(), store.clone());

        Self {
            accounts: AccountService::new(
                identity.clone(),
                store.clone(),
                Arc::new(config.security.clone()),
            ),
            families: FamilyService::new(
                identity,
                guard.clone(),
                store.clone(),
                store.clone(),
                store.clone(),
            ),
            bills: BillService::new(guard, store),
            health,
            config,
        }
    }
}
