use std::sync::Arc;

use anyhow::Context;

use crate::auth::{self, TokenVerifier};
use crate::config::AppConfig;
use crate::database::{self, schema, Store};

/// Everything a request handler needs, built once at startup and shared
/// behind an Arc. Handlers receive this through axum state, never through
/// globals, so tests can stand up their own instances.
pub struct AppState {
    pub store: Store,
    pub verifier: Arc<dyn TokenVerifier>,
    pub config: AppConfig,
}

impl AppState {
    /// Connect, reconcile the schema, and build the token verifier. Any
    /// failure here aborts startup; a process that cannot verify tokens
    /// or reach its database should not accept requests.
    pub async fn new(config: AppConfig) -> anyhow::Result<Arc<Self>> {
        let pool = database::connect(&config.database.url, config.database.max_connections)
            .await
            .context("Failed to connect to database")?;

        schema::init(&pool)
            .await
            .context("Schema reconciliation failed")?;

        let verifier = auth::build(&config.verifier).await?;

        Ok(Arc::new(Self {
            store: Store::new(pool),
            verifier,
            config,
        }))
    }
}
