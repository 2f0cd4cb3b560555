//! Postgres-backed implementations of the auth store traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use gateward_auth::{
    AuthUser, LoginUser, PermissionSource, Role, RolePermissionRow, StoreError, UserStore,
};
use gateward_core::UserId;

/// Shared-pool store serving both user lookups and the permission join.
#[derive(Clone)]
pub struct PgAuthStore {
    pool: PgPool,
}

impl PgAuthStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a small dedicated pool and wrap it.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(store_err)?;
        Ok(Self::new(pool))
    }
}

fn store_err(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
            StoreError::Unavailable(e.to_string())
        }
        other => StoreError::Query(other.to_string()),
    }
}

type UserRow = (i64, String, bool, bool, DateTime<Utc>);

fn to_auth_user(row: UserRow) -> AuthUser {
    AuthUser {
        id: UserId::new(row.0),
        login_name: row.1,
        enabled: row.2,
        deleted: row.3,
        critical_modify_time: row.4,
    }
}

#[async_trait]
impl UserStore for PgAuthStore {
    async fn find_user_by_id(&self, id: UserId) -> Result<Option<AuthUser>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, login_name, enabled, is_deleted, critical_modify_time \
             FROM sys_user WHERE id = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(row.map(to_auth_user))
    }

    async fn find_user_by_login(
        &self,
        login_name: &str,
        password_digest: &str,
    ) -> Result<Option<LoginUser>, StoreError> {
        let id: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM sys_user \
             WHERE login_name = $1 AND password_digest = $2 \
               AND is_deleted = FALSE AND enabled = TRUE",
        )
        .bind(login_name)
        .bind(password_digest)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        let Some((id,)) = id else {
            return Ok(None);
        };

        let roles: Vec<(String,)> = sqlx::query_as(
            "SELECT r.name FROM sys_role r \
             JOIN sys_user_role ur ON ur.role_id = r.id \
             WHERE ur.user_id = $1 AND r.is_deleted = FALSE AND ur.is_deleted = FALSE \
             ORDER BY r.id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(Some(LoginUser {
            id: UserId::new(id),
            roles: roles.into_iter().map(|(name,)| Role::new(name)).collect(),
        }))
    }

    async fn list_users(&self) -> Result<Vec<AuthUser>, StoreError> {
        let rows: Vec<UserRow> = sqlx::query_as(
            "SELECT id, login_name, enabled, is_deleted, critical_modify_time \
             FROM sys_user WHERE is_deleted = FALSE ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(rows.into_iter().map(to_auth_user).collect())
    }
}

#[async_trait]
impl PermissionSource for PgAuthStore {
    async fn active_role_permission_joins(&self) -> Result<Vec<RolePermissionRow>, StoreError> {
        // The table build filters soft-deleted rows; surface one flag that
        // covers the join row and both joined entities.
        let rows: Vec<(i64, i64, String, String, bool)> = sqlx::query_as(
            "SELECT rmp.id, rmp.role_id, r.name, m.link_url, \
                    (rmp.is_deleted OR r.is_deleted OR m.is_deleted) AS is_deleted \
             FROM role_module_permission rmp \
             JOIN sys_role r ON r.id = rmp.role_id \
             JOIN sys_module m ON m.id = rmp.module_id \
             ORDER BY rmp.id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(rows
            .into_iter()
            .map(|(id, role_id, role_name, url, deleted)| RolePermissionRow {
                id,
                role_id,
                role_name,
                url,
                deleted,
            })
            .collect())
    }
}
