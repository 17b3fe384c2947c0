//! User → roles mapping consulted by role-based policies.
//! Unknown users hold no roles; absence of data is never an error.

use std::collections::HashMap;

use crate::identity::Principal;

#[derive(Debug, Clone, Default)]
pub struct RoleStore {
    roles_by_user: HashMap<String, Vec<String>>,
}

impl RoleStore {
    pub fn new() -> Self { Self::default() }

    /// Store holding exactly the principal's roles (request-scoped binding).
    /// Anonymous or role-less principals leave the store empty, so they stay unknown.
    pub fn from_principal(principal: &Principal) -> Self {
        let mut store = Self::new();
        if !principal.is_anonymous() && !principal.roles.is_empty() {
            store.add_roles(&principal.user_id, principal.roles.iter().cloned());
        }
        store
    }

    /// Append roles to the user's current set. Duplicates are kept; only membership matters.
    pub fn add_roles<I, S>(&mut self, user: &str, roles: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles_by_user
            .entry(user.to_string())
            .or_default()
            .extend(roles.into_iter().map(Into::into));
    }

    pub fn clear(&mut self) {
        self.roles_by_user.clear();
    }

    /// True iff the user is known and holds every role in `roles`.
    pub fn has_roles<S: AsRef<str>>(&self, user: &str, roles: &[S]) -> bool {
        let Some(held) = self.roles_by_user.get(user) else { return false; };
        let ok = roles.iter().all(|r| held.iter().any(|h| h == r.as_ref()));
        tracing::trace!(target: "rolegate::security", user, held = ?held, ok, "role check");
        ok
    }

    pub fn roles_for(&self, user: &str) -> &[String] {
        self.roles_by_user.get(user).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_known(&self, user: &str) -> bool {
        self.roles_by_user.contains_key(user)
    }
}
