//! Request-scoped security binding.
//!
//! [`SecurityManager`] is the process-wide, read-only half: the permission
//! list and the enforcer. Each inbound unit of work gets its own immutable
//! [`SecurityContext`] from [`SecurityManager::bind_identity`]; contexts are
//! passed explicitly to guarded calls and never rebound in place, so
//! concurrent requests cannot observe each other's identity.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::enforcer::{Decision, Enforcer, PolicyEnforcer};
use super::permission::Permission;
use super::resource::Resource;
use super::role_store::RoleStore;
use super::taxonomy::Action;
use crate::error::{AppError, AppResult};
use crate::identity::{IdentityProvider, IdentityRequest, Principal};

pub struct SecurityManager {
    permissions: RwLock<Arc<[Permission]>>,
    enforcer: Arc<dyn Enforcer>,
}

impl SecurityManager {
    pub fn new(permissions: Vec<Permission>) -> Self {
        Self::with_enforcer(permissions, Arc::new(PolicyEnforcer))
    }

    pub fn with_enforcer(permissions: Vec<Permission>, enforcer: Arc<dyn Enforcer>) -> Self {
        Self { permissions: RwLock::new(Arc::from(permissions)), enforcer }
    }

    /// Current permission snapshot.
    pub fn permissions(&self) -> Arc<[Permission]> {
        self.permissions.read().clone()
    }

    /// Replace the permission list. Contexts bound before the swap keep the
    /// snapshot they were created with; only later bindings see the new list.
    pub fn swap_permissions(&self, permissions: Vec<Permission>) -> Arc<[Permission]> {
        let next: Arc<[Permission]> = Arc::from(permissions);
        info!(target: "rolegate::security", count = next.len(), "permission list swapped");
        std::mem::replace(&mut *self.permissions.write(), next)
    }

    /// Bind `user` and its roles for one request.
    pub fn bind_identity<I, S>(&self, user: impl Into<String>, roles: I) -> SecurityContext
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bind_principal(&Principal::new(user, roles))
    }

    pub fn bind_principal(&self, principal: &Principal) -> SecurityContext {
        let ctx = SecurityContext {
            request_id: Uuid::new_v4(),
            user: principal.user_id.clone(),
            roles: Arc::new(RoleStore::from_principal(principal)),
            permissions: self.permissions(),
            enforcer: self.enforcer.clone(),
        };
        debug!(target: "rolegate::security", request_id = %ctx.request_id, user = %ctx.user, roles = ?principal.roles, "identity bound");
        ctx
    }

    /// Resolve the caller through `provider`, then bind it. Requests without
    /// an identity are bound as the anonymous principal.
    pub fn bind_request(&self, provider: &dyn IdentityProvider, request: &IdentityRequest) -> AppResult<SecurityContext> {
        let principal = provider.resolve(request)?.unwrap_or_else(Principal::anonymous);
        Ok(self.bind_principal(&principal))
    }
}

impl Debug for SecurityManager {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityManager").field("permissions", &self.permissions.read().len()).finish()
    }
}

/// Immutable "who is asking" for one unit of work. Cheap to clone.
#[derive(Clone)]
pub struct SecurityContext {
    request_id: Uuid,
    user: String,
    roles: Arc<RoleStore>,
    permissions: Arc<[Permission]>,
    enforcer: Arc<dyn Enforcer>,
}

impl SecurityContext {
    pub fn request_id(&self) -> Uuid { self.request_id }
    pub fn user(&self) -> &str { &self.user }
    pub fn role_store(&self) -> &RoleStore { &self.roles }
    pub fn permissions(&self) -> &[Permission] { &self.permissions }

    /// New context for another identity sharing this one's permissions and enforcer.
    /// `self` is left untouched.
    pub fn rebind(&self, principal: &Principal) -> SecurityContext {
        SecurityContext {
            request_id: Uuid::new_v4(),
            user: principal.user_id.clone(),
            roles: Arc::new(RoleStore::from_principal(principal)),
            permissions: self.permissions.clone(),
            enforcer: self.enforcer.clone(),
        }
    }

    pub fn check(&self, resource: &dyn Resource, actions: &[Action]) -> Decision {
        self.enforcer.enforce(&self.roles, &self.permissions, &self.user, resource, actions)
    }

    /// `Forbidden` carrying the explanation on denial.
    pub fn assert_permissions(&self, resource: &dyn Resource, actions: &[Action]) -> AppResult<()> {
        let decision = self.check(resource, actions);
        if decision.allow {
            Ok(())
        } else {
            debug!(target: "rolegate::security", request_id = %self.request_id, user = %self.user, "assert_permissions failed");
            Err(AppError::forbidden(decision.explanation))
        }
    }
}

impl Debug for SecurityContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityContext")
            .field("request_id", &self.request_id)
            .field("user", &self.user)
            .field("roles", &self.roles.roles_for(&self.user))
            .field("permissions", &self.permissions.len())
            .finish()
    }
}
