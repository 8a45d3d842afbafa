//! The lookup seam request handlers depend on.
//!
//! Handlers hold an `Arc<dyn HumanStore>` so they can be exercised against an
//! in-memory store without a database.

use async_trait::async_trait;
use hello_core::types::DbId;

use crate::models::human::Human;
use crate::repositories::HumanRepo;
use crate::DbPool;

/// Point lookups of [`Human`] records.
#[async_trait]
pub trait HumanStore: Send + Sync {
    /// Find the record with this id, `None` if there is none.
    ///
    /// An `Err` means the store itself could not answer.
    async fn find_by_id(&self, id: DbId) -> Result<Option<Human>, sqlx::Error>;
}

/// [`HumanStore`] backed by the shared connection pool.
#[derive(Clone)]
pub struct MySqlHumanStore {
    pool: DbPool,
}

impl MySqlHumanStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HumanStore for MySqlHumanStore {
    async fn find_by_id(&self, id: DbId) -> Result<Option<Human>, sqlx::Error> {
        HumanRepo::find_by_id(&self.pool, id).await
    }
}
