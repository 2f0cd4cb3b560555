//! The role→URL permission table.
//!
//! Patterns are compiled and validated when the table is built; a malformed
//! stored pattern is logged and skipped there instead of being caught on
//! every request.

use regex::Regex;

use crate::store::RolePermissionRow;

/// Which column of the join addresses a role in the table.
///
/// Deployments fronted by an external identity provider carry role *ids* in
/// their tokens; locally issued tokens carry role *names*. Chosen once from
/// settings.
#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKey {
    Id,
    Name,
}

/// A stored URL pattern, compiled to an anchored, case-insensitive matcher.
#[derive(Debug, Clone)]
pub struct UrlPattern {
    raw: String,
    regex: Regex,
}

impl UrlPattern {
    /// Compile a stored pattern. Anchoring reproduces the first-match,
    /// full-string semantics of matching the whole request path: a pattern
    /// like `/api/users.*` matches `/api/users/5` but `/api/users` does not
    /// match `/api/users/5/orders` unless the pattern says so.
    pub fn compile(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("(?i)^(?:{pattern})$"))?;
        Ok(Self {
            raw: pattern.to_string(),
            regex,
        })
    }

    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// "Role R may access URLs matching U". Immutable value.
#[derive(Debug, Clone)]
pub struct PermissionItem {
    pub role: String,
    pub url: UrlPattern,
}

/// Ordered collection of permission items, keyed conceptually by role.
///
/// Built once per cache epoch from the persistence join; order follows the
/// underlying row id ascending so that first-match semantics stay
/// deterministic across rebuilds.
#[derive(Debug, Clone, Default)]
pub struct PermissionTable {
    items: Vec<PermissionItem>,
}

impl PermissionTable {
    /// Convert join rows into the flat item list.
    ///
    /// Soft-deleted rows are excluded; invalid patterns are rejected here
    /// (logged, skipped) so the match loop never sees one.
    pub fn build(mut rows: Vec<RolePermissionRow>, role_key: RoleKey) -> Self {
        rows.retain(|r| !r.deleted);
        rows.sort_by_key(|r| r.id);

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let role = match role_key {
                RoleKey::Id => row.role_id.to_string(),
                RoleKey::Name => row.role_name.clone(),
            };
            match UrlPattern::compile(&row.url) {
                Ok(url) => items.push(PermissionItem { role, url }),
                Err(e) => {
                    tracing::warn!(
                        row_id = row.id,
                        pattern = %row.url,
                        error = %e,
                        "skipping permission row with invalid url pattern"
                    );
                }
            }
        }
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[PermissionItem] {
        &self.items
    }

    /// Does any item for one of `roles` match `path`? First match wins.
    pub fn matches(&self, roles: &[String], path: &str) -> bool {
        self.items
            .iter()
            .filter(|item| roles.iter().any(|r| r == &item.role))
            .any(|item| item.url.matches(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, role_id: i64, role_name: &str, url: &str, deleted: bool) -> RolePermissionRow {
        RolePermissionRow {
            id,
            role_id,
            role_name: role_name.to_string(),
            url: url.to_string(),
            deleted,
        }
    }

    #[test]
    fn pattern_matches_full_path_only() {
        let p = UrlPattern::compile("/api/users.*").unwrap();
        assert!(p.matches("/api/users"));
        assert!(p.matches("/api/users/5"));
        assert!(!p.matches("/api/orders/5"));

        let exact = UrlPattern::compile("/api/users").unwrap();
        assert!(exact.matches("/api/users"));
        assert!(!exact.matches("/api/users/5"));
    }

    #[test]
    fn pattern_is_case_insensitive() {
        let p = UrlPattern::compile("/Api/Users.*").unwrap();
        assert!(p.matches("/api/users/5"));
    }

    #[test]
    fn build_excludes_soft_deleted_rows() {
        let table = PermissionTable::build(
            vec![
                row(1, 10, "Admin", "/api/users.*", false),
                row(2, 10, "Admin", "/api/orders.*", true),
            ],
            RoleKey::Name,
        );
        assert_eq!(table.len(), 1);
        assert!(!table.matches(&["Admin".into()], "/api/orders/5"));
    }

    #[test]
    fn build_orders_by_row_id() {
        let table = PermissionTable::build(
            vec![
                row(5, 10, "Admin", "/api/b.*", false),
                row(2, 10, "Admin", "/api/a.*", false),
            ],
            RoleKey::Name,
        );
        assert_eq!(table.items()[0].url.as_str(), "/api/a.*");
        assert_eq!(table.items()[1].url.as_str(), "/api/b.*");
    }

    #[test]
    fn build_skips_invalid_patterns_without_failing() {
        let table = PermissionTable::build(
            vec![
                row(1, 10, "Admin", "/api/(unclosed", false),
                row(2, 10, "Admin", "/api/users.*", false),
            ],
            RoleKey::Name,
        );
        assert_eq!(table.len(), 1);
        assert!(table.matches(&["Admin".into()], "/api/users/5"));
    }

    #[test]
    fn role_id_addressing_mode() {
        let table = PermissionTable::build(
            vec![row(1, 77, "Admin", "/api/users.*", false)],
            RoleKey::Id,
        );
        assert!(table.matches(&["77".into()], "/api/users/5"));
        assert!(!table.matches(&["Admin".into()], "/api/users/5"));
    }

    #[test]
    fn no_items_for_role_means_no_match() {
        let table = PermissionTable::build(
            vec![row(1, 10, "Admin", "/api/users.*", false)],
            RoleKey::Name,
        );
        assert!(!table.matches(&["Client".into()], "/api/users/5"));
        assert!(!table.matches(&[], "/api/users/5"));
    }
}
