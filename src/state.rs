use sqlx::PgPool;
use std::sync::Arc;

use crate::auth::{AuthError, CredentialCodec};
use crate::config::AppConfig;
use crate::services::{CollectionService, UserService};

/// Shared application state, built once at startup and read-only afterwards.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub codec: Arc<CredentialCodec>,
    pub pool: PgPool,
    pub users: UserService,
    pub collections: CollectionService,
}

impl AppState {
    pub fn new(config: AppConfig, pool: PgPool) -> Result<Self, AuthError> {
        let codec = CredentialCodec::from_config(&config.security)?;
        Ok(Self {
            users: UserService::new(pool.clone(), &config.filter),
            collections: CollectionService::new(pool.clone(), &config.filter),
            codec: Arc::new(codec),
            config: Arc::new(config),
            pool,
        })
    }
}
