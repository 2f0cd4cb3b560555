//! In-memory store implementations for tests and database-less development.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use gateward_auth::{
    AuthUser, LoginUser, PermissionSource, Role, RolePermissionRow, SessionStore, StoreError,
    UserStore,
};
use gateward_core::UserId;

struct MemoryUser {
    user: AuthUser,
    password_digest: String,
    roles: Vec<Role>,
}

/// In-memory user and permission store with a builder-style setup API.
#[derive(Default)]
pub struct MemoryAuthStore {
    users: RwLock<HashMap<i64, MemoryUser>>,
    rows: RwLock<Vec<RolePermissionRow>>,
}

impl MemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(
        self,
        id: i64,
        login_name: &str,
        password_digest: &str,
        roles: &[&str],
    ) -> Self {
        self.insert_user(id, login_name, password_digest, roles);
        self
    }

    pub fn with_permission(self, id: i64, role_id: i64, role_name: &str, url: &str) -> Self {
        self.rows.write().expect("rows lock").push(RolePermissionRow {
            id,
            role_id,
            role_name: role_name.to_string(),
            url: url.to_string(),
            deleted: false,
        });
        self
    }

    pub fn insert_user(&self, id: i64, login_name: &str, password_digest: &str, roles: &[&str]) {
        self.users.write().expect("users lock").insert(
            id,
            MemoryUser {
                user: AuthUser {
                    id: UserId::new(id),
                    login_name: login_name.to_string(),
                    enabled: true,
                    deleted: false,
                    critical_modify_time: Utc::now() - chrono::Duration::days(1),
                },
                password_digest: password_digest.to_string(),
                roles: roles.iter().map(|r| Role::new(r.to_string())).collect(),
            },
        );
    }

    pub fn set_enabled(&self, id: i64, enabled: bool) {
        if let Some(u) = self.users.write().expect("users lock").get_mut(&id) {
            u.user.enabled = enabled;
        }
    }

    pub fn set_deleted(&self, id: i64, deleted: bool) {
        if let Some(u) = self.users.write().expect("users lock").get_mut(&id) {
            u.user.deleted = deleted;
        }
    }

    /// Record a security-relevant change, invalidating earlier tokens.
    pub fn touch_critical_modify(&self, id: i64, at: DateTime<Utc>) {
        if let Some(u) = self.users.write().expect("users lock").get_mut(&id) {
            u.user.critical_modify_time = at;
        }
    }
}

#[async_trait]
impl UserStore for MemoryAuthStore {
    async fn find_user_by_id(&self, id: UserId) -> Result<Option<AuthUser>, StoreError> {
        Ok(self
            .users
            .read()
            .expect("users lock")
            .get(&id.as_i64())
            .map(|u| u.user.clone()))
    }

    async fn find_user_by_login(
        &self,
        login_name: &str,
        password_digest: &str,
    ) -> Result<Option<LoginUser>, StoreError> {
        Ok(self
            .users
            .read()
            .expect("users lock")
            .values()
            .find(|u| {
                u.user.login_name == login_name
                    && u.password_digest == password_digest
                    && !u.user.deleted
                    && u.user.enabled
            })
            .map(|u| LoginUser {
                id: u.user.id,
                roles: u.roles.clone(),
            }))
    }

    async fn list_users(&self) -> Result<Vec<AuthUser>, StoreError> {
        let mut users: Vec<AuthUser> = self
            .users
            .read()
            .expect("users lock")
            .values()
            .filter(|u| !u.user.deleted)
            .map(|u| u.user.clone())
            .collect();
        users.sort_by_key(|u| u.id.as_i64());
        Ok(users)
    }
}

#[async_trait]
impl PermissionSource for MemoryAuthStore {
    async fn active_role_permission_joins(&self) -> Result<Vec<RolePermissionRow>, StoreError> {
        Ok(self.rows.read().expect("rows lock").clone())
    }
}

/// Keyed string session storage.
#[derive(Default)]
pub struct MemorySessionStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get_string(&self, key: &str) -> Option<String> {
        self.values.read().expect("session lock").get(key).cloned()
    }

    fn set_string(&self, key: &str, value: &str) {
        self.values
            .write()
            .expect("session lock")
            .insert(key.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateward_auth::{DOCS_SESSION_KEY, DOCS_SESSION_OK};

    #[tokio::test]
    async fn login_requires_active_account_and_matching_digest() {
        let store = MemoryAuthStore::new().with_user(1, "alice", "digest-a", &["Admin"]);

        let found = store.find_user_by_login("alice", "digest-a").await.unwrap();
        assert_eq!(found.unwrap().roles, vec![Role::new("Admin")]);

        assert!(store
            .find_user_by_login("alice", "wrong")
            .await
            .unwrap()
            .is_none());

        store.set_deleted(1, true);
        assert!(store
            .find_user_by_login("alice", "digest-a")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn list_users_hides_soft_deleted() {
        let store = MemoryAuthStore::new()
            .with_user(1, "alice", "a", &["Admin"])
            .with_user(2, "bob", "b", &["Client"]);
        store.set_deleted(2, true);

        let users = store.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].login_name, "alice");
    }

    #[test]
    fn session_store_round_trips() {
        let sessions = MemorySessionStore::new();
        assert!(sessions.get_string(DOCS_SESSION_KEY).is_none());
        sessions.set_string(DOCS_SESSION_KEY, DOCS_SESSION_OK);
        assert_eq!(
            sessions.get_string(DOCS_SESSION_KEY).as_deref(),
            Some(DOCS_SESSION_OK)
        );
    }
}
