//! Policy predicates. [`Policy`] is the extension point; the enforcer only
//! ever sees `dyn Policy`, so new predicate kinds need no enforcer changes.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;

use super::role_store::RoleStore;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyOutcome {
    pub granted: bool,
    /// Empty when granted.
    pub explanation: String,
}

impl PolicyOutcome {
    pub fn granted() -> Self { Self { granted: true, explanation: String::new() } }
    pub fn denied(explanation: impl Into<String>) -> Self { Self { granted: false, explanation: explanation.into() } }
}

pub trait Policy: Debug + Send + Sync {
    fn validate(&self, user: &str, roles: &RoleStore) -> PolicyOutcome;
}

/// Grants only when the user holds *all* listed roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleBasedPolicy {
    roles: Vec<String>,
}

impl RoleBasedPolicy {
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { roles: roles.into_iter().map(Into::into).collect() }
    }

    /// Validated constructor: at least one role, no blank names.
    pub fn try_new<I, S>(roles: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let policy = Self::new(roles);
        if policy.roles.is_empty() || policy.roles.iter().any(|r| r.trim().is_empty()) {
            return Err(AppError::unknown_config("role_based policy requires non-empty role names"));
        }
        Ok(policy)
    }

    pub fn roles(&self) -> &[String] { &self.roles }
}

impl Policy for RoleBasedPolicy {
    fn validate(&self, user: &str, roles: &RoleStore) -> PolicyOutcome {
        // an empty requirement grants nobody
        if self.roles.is_empty() {
            return PolicyOutcome::denied("Requires roles []");
        }
        if roles.has_roles(user, &self.roles) {
            PolicyOutcome::granted()
        } else {
            PolicyOutcome::denied(format!("Requires roles [{}]", self.roles.join(", ")))
        }
    }
}

/// Serialized policy definition as found in configuration documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicySpec {
    RoleBased { roles: Vec<String> },
}

impl PolicySpec {
    pub fn build(&self) -> AppResult<Arc<dyn Policy>> {
        match self {
            PolicySpec::RoleBased { roles } => Ok(Arc::new(RoleBasedPolicy::try_new(roles.iter().cloned())?)),
        }
    }
}
