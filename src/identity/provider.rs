//! Identity providers resolve an inbound request into a [`Principal`].
//! Token-based providers live outside this crate; the ones here cover
//! development (`none`), fixed user tables (`static`) and gateway-injected
//! headers (`header`).

use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::principal::Principal;
use crate::error::{AppError, AppResult};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLES_HEADER: &str = "x-user-roles";

/// Transport-neutral view of an inbound request: header names are lowercased.
#[derive(Debug, Clone, Default)]
pub struct IdentityRequest {
    headers: HashMap<String, String>,
}

impl IdentityRequest {
    pub fn new() -> Self { Self::default() }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

pub trait IdentityProvider: Send + Sync {
    /// `Ok(None)` means the request carries no identity (anonymous caller).
    fn resolve(&self, request: &IdentityRequest) -> AppResult<Option<Principal>>;
}

/// Never resolves an identity; every caller is anonymous.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuthProvider;

impl IdentityProvider for NoAuthProvider {
    fn resolve(&self, _request: &IdentityRequest) -> AppResult<Option<Principal>> {
        Ok(None)
    }
}

/// Fixed user → roles table, keyed by the `x-user-id` header.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityProvider {
    users: BTreeMap<String, Vec<String>>,
}

impl StaticIdentityProvider {
    pub fn new(users: BTreeMap<String, Vec<String>>) -> Self { Self { users } }
}

impl IdentityProvider for StaticIdentityProvider {
    fn resolve(&self, request: &IdentityRequest) -> AppResult<Option<Principal>> {
        let Some(user) = request.header(USER_ID_HEADER) else { return Ok(None); };
        match self.users.get(user) {
            Some(roles) => {
                debug!(target: "rolegate::identity", user, roles = ?roles, "static identity resolved");
                Ok(Some(Principal::new(user, roles.iter().cloned())))
            }
            None => Err(AppError::unauthenticated(format!("unknown user '{}'", user))),
        }
    }
}

/// Trusts identity headers injected by an upstream gateway.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderIdentityProvider;

impl IdentityProvider for HeaderIdentityProvider {
    fn resolve(&self, request: &IdentityRequest) -> AppResult<Option<Principal>> {
        let Some(user) = request.header(USER_ID_HEADER).map(str::trim).filter(|u| !u.is_empty()) else {
            return Ok(None);
        };
        let roles: Vec<String> = request
            .header(USER_ROLES_HEADER)
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(String::from)
            .collect();
        debug!(target: "rolegate::identity", user, roles = ?roles, "header identity resolved");
        Ok(Some(Principal::new(user, roles)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthManagerKind {
    #[default]
    None,
    Static,
    Header,
}

impl AuthManagerKind {
    pub fn build(self, users: &BTreeMap<String, Vec<String>>) -> Box<dyn IdentityProvider> {
        debug!(target: "rolegate::identity", kind = %self, "creating identity provider");
        match self {
            AuthManagerKind::None => Box::new(NoAuthProvider),
            AuthManagerKind::Static => Box::new(StaticIdentityProvider::new(users.clone())),
            AuthManagerKind::Header => Box::new(HeaderIdentityProvider),
        }
    }
}

impl Display for AuthManagerKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            AuthManagerKind::None => "none",
            AuthManagerKind::Static => "static",
            AuthManagerKind::Header => "header",
        })
    }
}

impl FromStr for AuthManagerKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(AuthManagerKind::None),
            "static" => Ok(AuthManagerKind::Static),
            "header" => Ok(AuthManagerKind::Header),
            other => Err(AppError::unknown_config(format!("unknown auth manager '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> BTreeMap<String, Vec<String>> {
        BTreeMap::from([("a-reader".to_string(), vec!["a-reader".to_string()])])
    }

    #[test]
    fn no_auth_is_anonymous() {
        let req = IdentityRequest::new().with_header(USER_ID_HEADER, "a-reader");
        assert_eq!(NoAuthProvider.resolve(&req).unwrap(), None);
    }

    #[test]
    fn static_provider_looks_up_roles() {
        let p = StaticIdentityProvider::new(users());
        let req = IdentityRequest::new().with_header("X-User-Id", "a-reader");
        let principal = p.resolve(&req).unwrap().unwrap();
        assert_eq!(principal, Principal::new("a-reader", ["a-reader"]));

        assert_eq!(p.resolve(&IdentityRequest::new()).unwrap(), None);

        let err = p.resolve(&IdentityRequest::new().with_header(USER_ID_HEADER, "mallory")).unwrap_err();
        assert_eq!(err.http_status(), 401);
    }

    #[test]
    fn header_provider_splits_roles() {
        let req = IdentityRequest::new()
            .with_header(USER_ID_HEADER, "b-manager")
            .with_header(USER_ROLES_HEADER, "b-reader, b-editor,,");
        let principal = HeaderIdentityProvider.resolve(&req).unwrap().unwrap();
        assert_eq!(principal.roles, vec!["b-reader".to_string(), "b-editor".to_string()]);

        let blank = IdentityRequest::new().with_header(USER_ID_HEADER, "  ");
        assert_eq!(HeaderIdentityProvider.resolve(&blank).unwrap(), None);
    }

    #[test]
    fn auth_manager_kind_parsing() {
        assert_eq!("".parse::<AuthManagerKind>().unwrap(), AuthManagerKind::None);
        assert_eq!("Static".parse::<AuthManagerKind>().unwrap(), AuthManagerKind::Static);
        assert_eq!("header".parse::<AuthManagerKind>().unwrap(), AuthManagerKind::Header);
        assert!("keycloak".parse::<AuthManagerKind>().is_err());
    }

    #[test]
    fn factory_builds_matching_provider() {
        let provider = AuthManagerKind::Static.build(&users());
        let req = IdentityRequest::new().with_header(USER_ID_HEADER, "a-reader");
        assert!(provider.resolve(&req).unwrap().is_some());
        let provider = AuthManagerKind::None.build(&users());
        assert!(provider.resolve(&req).unwrap().is_none());
    }
}
