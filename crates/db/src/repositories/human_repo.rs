//! Repository for the `human` table.

use hello_core::types::DbId;
use sqlx::MySqlPool;

use crate::models::human::Human;

/// Column list for `human` queries.
const COLUMNS: &str = "id, name";

/// Read-only queries against the `human` table.
pub struct HumanRepo;

impl HumanRepo {
    /// Point lookup by primary key.
    ///
    /// Returns `Ok(None)` when no row has this id.
    pub async fn find_by_id(pool: &MySqlPool, id: DbId) -> Result<Option<Human>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM human WHERE id = ?");
        sqlx::query_as::<_, Human>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All rows with exactly this name, ordered by id.
    pub async fn find_by_name(pool: &MySqlPool, name: &str) -> Result<Vec<Human>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM human WHERE name = ? ORDER BY id");
        sqlx::query_as::<_, Human>(&query)
            .bind(name)
            .fetch_all(pool)
            .await
    }
}
