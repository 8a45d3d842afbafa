//! Persistence layer: connection configuration, pool construction, the
//! startup gate, and the `human` table mapping.

use sqlx::mysql::MySqlPoolOptions;

pub mod config;
pub mod models;
pub mod repositories;
pub mod startup;
pub mod store;

pub use config::{DatabaseConfig, StartupGateConfig};
pub use store::{HumanStore, MySqlHumanStore};

pub type DbPool = sqlx::MySqlPool;

/// Build a connection pool without opening any connection yet.
///
/// The first real connection attempt is left to [`startup::wait_for_database`],
/// which owns the retry policy.
pub fn create_pool(config: &DatabaseConfig) -> DbPool {
    MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect_lazy_with(config.connect_options())
}

/// Verify the database is reachable by checking out a connection and
/// running a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
