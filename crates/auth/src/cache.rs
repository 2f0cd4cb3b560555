//! Process-wide permission table cache.
//!
//! Read-mostly shared state: the table is built lazily on first use and
//! reused for the process lifetime until explicitly invalidated. The build
//! path holds the write lock across the persistence fetch so concurrent cold
//! starts perform exactly one fetch and every reader observes a fully built
//! table, never a partial one.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::store::{PermissionSource, StoreError};
use crate::table::{PermissionTable, RoleKey};

pub struct TableCache {
    role_key: RoleKey,
    cell: RwLock<Option<Arc<PermissionTable>>>,
}

impl TableCache {
    pub fn new(role_key: RoleKey) -> Self {
        Self {
            role_key,
            cell: RwLock::new(None),
        }
    }

    /// Return the cached table, building it from `source` when empty.
    pub async fn get_or_build(
        &self,
        source: &dyn PermissionSource,
    ) -> Result<Arc<PermissionTable>, StoreError> {
        if let Some(table) = self.cell.read().await.as_ref() {
            return Ok(Arc::clone(table));
        }

        let mut slot = self.cell.write().await;
        // Double-checked: another request may have built it while we waited.
        if let Some(table) = slot.as_ref() {
            return Ok(Arc::clone(table));
        }

        let rows = source.active_role_permission_joins().await?;
        let table = Arc::new(PermissionTable::build(rows, self.role_key));
        tracing::info!(items = table.len(), "permission table built");
        *slot = Some(Arc::clone(&table));
        Ok(table)
    }

    /// Drop the cached table; the next request rebuilds it.
    ///
    /// There is deliberately no TTL-based refresh: staleness after an admin
    /// edit is resolved by calling this explicitly.
    pub async fn invalidate(&self) {
        *self.cell.write().await = None;
        tracing::info!("permission table invalidated");
    }

    pub async fn is_populated(&self) -> bool {
        self.cell.read().await.is_some()
    }
}
