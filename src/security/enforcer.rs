//! Decision algorithm tying permissions, policies and the role store together.
//!
//! First match wins: permission order is part of the configuration contract.
//! 1. No permissions configured → allow.
//! 2. For each permission selecting the resource:
//!    - actions not covered → remember why and keep scanning;
//!    - actions covered → the first policy decides (no policy → allow).
//! 3. Nothing decided → deny, explaining an action miss if there was one.
//!
//! `DecisionStrategy` and policies after the first are not consulted.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::permission::Permission;
use super::resource::Resource;
use super::role_store::RoleStore;
use super::taxonomy::{format_actions, Action};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub allow: bool,
    pub explanation: String,
}

impl Decision {
    pub fn allow() -> Self { Self { allow: true, explanation: String::new() } }
    pub fn deny(explanation: impl Into<String>) -> Self { Self { allow: false, explanation: explanation.into() } }
}

pub trait Enforcer: Send + Sync {
    fn enforce(
        &self,
        roles: &RoleStore,
        permissions: &[Permission],
        user: &str,
        resource: &dyn Resource,
        actions: &[Action],
    ) -> Decision;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyEnforcer;

impl Enforcer for PolicyEnforcer {
    fn enforce(
        &self,
        roles: &RoleStore,
        permissions: &[Permission],
        user: &str,
        resource: &dyn Resource,
        actions: &[Action],
    ) -> Decision {
        if permissions.is_empty() {
            return Decision::allow();
        }
        let target = format!("{}:{}", resource.resource_type(), resource.name());
        let mut action_miss: Option<String> = None;

        for p in permissions {
            if !p.matches_resource(resource) {
                continue;
            }
            if !p.matches_actions(actions) {
                debug!(target: "rolegate::security", permission = p.name(), %target, "actions not covered, continuing");
                action_miss.get_or_insert_with(|| {
                    format!("No permissions defined to manage {} on {}.", format_actions(actions), target)
                });
                continue;
            }
            let Some(policy) = p.policies().first() else {
                debug!(target: "rolegate::security", permission = p.name(), user, %target, "granted (no policies)");
                return Decision::allow();
            };
            let outcome = policy.validate(user, roles);
            if outcome.granted {
                debug!(target: "rolegate::security", permission = p.name(), user, %target, "granted");
                return Decision::allow();
            }
            let message = format!(
                "No permissions to execute {} on {}. {}",
                format_actions(actions),
                target,
                outcome.explanation
            );
            warn!(target: "rolegate::security", permission = p.name(), user, "denied: {}", message);
            return Decision::deny(message);
        }

        match action_miss {
            Some(message) => {
                warn!(target: "rolegate::security", user, "denied: {}", message);
                Decision::deny(message)
            }
            None => {
                warn!(target: "rolegate::security", user, %target, "denied: no permission matches resource");
                Decision::deny("")
            }
        }
    }
}
