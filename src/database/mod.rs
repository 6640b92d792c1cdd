use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

pub mod models;
pub mod schema;
pub mod store;

pub use models::{Card, Collection};
pub use store::{Store, StoreError};

/// Open the connection pool. There is exactly one pool per process and it
/// is handed to request handlers through the application state rather than
/// a global lookup.
pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await?;

    info!("Created database pool (max_connections={})", max_connections);
    Ok(pool)
}
