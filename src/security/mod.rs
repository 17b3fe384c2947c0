//! Authorization engine: taxonomy, permissions, policies and the first-match
//! enforcer, bound per request through [`SecurityContext`].

mod context;
mod enforcer;
mod guard;
mod permission;
mod policy;
mod resource;
mod role_store;
mod taxonomy;

pub use context::{SecurityContext, SecurityManager};
pub use enforcer::{Decision, Enforcer, PolicyEnforcer};
pub use guard::{guarded, Guard};
pub use permission::{DecisionStrategy, Permission, PermissionBuilder, ResourceFilter};
pub use policy::{Policy, PolicyOutcome, PolicySpec, RoleBasedPolicy};
pub use resource::{Resource, TaggedResource, Tags};
pub use role_store::RoleStore;
pub use taxonomy::{format_actions, Action, ResourceType};
