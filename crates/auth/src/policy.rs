//! Static declarative role policies.
//!
//! Endpoints can opt into coarse-grained role gating instead of per-URL
//! permission matching: a policy is satisfied when the caller holds any of
//! its roles. Pure function of the resolved role set; no state.

use std::collections::HashMap;

use crate::roles::Role;

/// "Has any of these roles" check, registered under a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePolicy {
    name: String,
    any_of: Vec<Role>,
}

impl RolePolicy {
    pub fn new(name: impl Into<String>, any_of: Vec<Role>) -> Self {
        Self {
            name: name.into(),
            any_of,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn roles(&self) -> &[Role] {
        &self.any_of
    }

    pub fn satisfied_by(&self, held: &[String]) -> bool {
        self.any_of
            .iter()
            .any(|required| held.iter().any(|r| r == required.as_str()))
    }
}

/// Registry of named policies, seeded at startup.
#[derive(Debug, Clone, Default)]
pub struct PolicyRegistry {
    policies: HashMap<String, RolePolicy>,
}

impl PolicyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock policy set wired at startup.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(RolePolicy::new("Client", vec![Role::new("Client")]));
        registry.register(RolePolicy::new("Admin", vec![Role::new("Admin")]));
        registry.register(RolePolicy::new(
            "SystemOrAdmin",
            vec![Role::new("Admin"), Role::new("System")],
        ));
        registry.register(RolePolicy::new(
            "A_S_O",
            vec![Role::new("Admin"), Role::new("System"), Role::new("Others")],
        ));
        registry
    }

    pub fn register(&mut self, policy: RolePolicy) {
        self.policies.insert(policy.name().to_string(), policy);
    }

    pub fn get(&self, name: &str) -> Option<&RolePolicy> {
        self.policies.get(name)
    }

    /// `None` when no policy is registered under `name`.
    pub fn check(&self, name: &str, held: &[String]) -> Option<bool> {
        self.policies.get(name).map(|p| p.satisfied_by(held))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(roles: &[&str]) -> Vec<String> {
        roles.iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn any_of_semantics() {
        let registry = PolicyRegistry::builtin();

        assert_eq!(registry.check("SystemOrAdmin", &held(&["System"])), Some(true));
        assert_eq!(registry.check("SystemOrAdmin", &held(&["Admin"])), Some(true));
        assert_eq!(registry.check("SystemOrAdmin", &held(&["Client"])), Some(false));
        assert_eq!(registry.check("Admin", &held(&[])), Some(false));
    }

    #[test]
    fn unknown_policy_is_none() {
        let registry = PolicyRegistry::builtin();
        assert_eq!(registry.check("NoSuchPolicy", &held(&["Admin"])), None);
    }

    #[test]
    fn custom_policies_can_be_registered() {
        let mut registry = PolicyRegistry::builtin();
        registry.register(RolePolicy::new("Ops", vec![Role::new("Operator")]));
        assert_eq!(registry.check("Ops", &held(&["Operator"])), Some(true));
    }
}
