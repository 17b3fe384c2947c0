//! Guarded execution: enforce first, run the operation only on grant.
//!
//! Protected operations declare their required actions once:
//!
//! ```
//! use rolegate::security::{Action, Guard};
//! const EDIT: Guard = Guard::require(&[Action::Edit]);
//! assert_eq!(EDIT.actions(), &[Action::Edit]);
//! ```
//!
//! Operations that never go through a guard are unprotected and never
//! consult the engine.

use tracing::debug;

use super::context::SecurityContext;
use super::resource::Resource;
use super::taxonomy::{format_actions, Action};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Guard {
    actions: &'static [Action],
}

impl Guard {
    pub const fn require(actions: &'static [Action]) -> Self { Self { actions } }

    pub fn actions(&self) -> &'static [Action] { self.actions }

    /// Enforce, then call `op` with the resource. The operation's result is returned unchanged.
    pub fn run<R, T, F>(&self, ctx: &SecurityContext, resource: &R, op: F) -> AppResult<T>
    where
        R: Resource,
        F: FnOnce(&R) -> T,
    {
        self.check(ctx, resource)?;
        Ok(op(resource))
    }

    /// Like [`Guard::run`] for fallible operations; the operation's own error propagates as is.
    pub fn try_run<R, T, F>(&self, ctx: &SecurityContext, resource: &R, op: F) -> AppResult<T>
    where
        R: Resource,
        F: FnOnce(&R) -> AppResult<T>,
    {
        self.check(ctx, resource)?;
        op(resource)
    }

    fn check<R: Resource>(&self, ctx: &SecurityContext, resource: &R) -> AppResult<()> {
        if self.actions.is_empty() {
            return Err(AppError::contract("guard declares no required actions"));
        }
        if resource.name().is_empty() {
            return Err(AppError::contract(format!(
                "guarded {} operation received a resource without a name",
                resource.resource_type()
            )));
        }
        ctx.assert_permissions(resource, self.actions)?;
        debug!(target: "rolegate::security",
            request_id = %ctx.request_id(),
            user = %ctx.user(),
            resource = %format!("{}:{}", resource.resource_type(), resource.name()),
            actions = %format_actions(self.actions),
            "guarded call permitted");
        Ok(())
    }
}

/// One-off guarded execution without declaring a `Guard` constant.
pub fn guarded<R, T, F>(ctx: &SecurityContext, resource: &R, actions: &'static [Action], op: F) -> AppResult<T>
where
    R: Resource,
    F: FnOnce(&R) -> T,
{
    Guard::require(actions).run(ctx, resource, op)
}
