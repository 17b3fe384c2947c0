//! Startup configuration: identity provider selection, the static user table
//! and the ordered permission list.
//!
//! The document is JSON. Every value outside the closed taxonomy is rejected
//! by [`SecurityConfig::build_permissions`] before the first request is served.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::identity::{AuthManagerKind, IdentityProvider};
use crate::security::{Action, DecisionStrategy, Permission, PolicySpec, ResourceFilter, ResourceType, Tags};

pub const CONFIG_PATH_ENV: &str = "ROLEGATE_CONFIG";
pub const AUTH_MANAGER_ENV: &str = "ROLEGATE_AUTH_MANAGER";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(default = "default_auth_manager")]
    pub auth_manager: String,
    #[serde(default)]
    pub users: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub permissions: Vec<PermissionConfig>,
}

/// One permission entry as written in the document. Values stay raw until
/// validation so that unknown names surface as configuration errors; they are
/// then read with the same serde vocabulary as `PolicySpec` and
/// `DecisionStrategy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionConfig {
    pub name: String,
    #[serde(default = "default_resources")]
    pub resources: Vec<ResourceFilterConfig>,
    #[serde(default = "default_actions")]
    pub actions: Vec<String>,
    #[serde(default)]
    pub policies: Vec<Value>,
    #[serde(default = "default_strategy")]
    pub decision_strategy: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceFilterConfig {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub name_patterns: Vec<String>,
    #[serde(default)]
    pub required_tags: Tags,
}

fn default_auth_manager() -> String { "none".to_string() }
fn default_resources() -> Vec<ResourceFilterConfig> {
    vec![ResourceFilterConfig { resource_type: "all".to_string(), name_patterns: Vec::new(), required_tags: Tags::new() }]
}
fn default_actions() -> Vec<String> { vec!["all".to_string()] }
fn default_strategy() -> String { "unanimous".to_string() }

impl Default for SecurityConfig {
    fn default() -> Self {
        Self { auth_manager: default_auth_manager(), users: BTreeMap::new(), permissions: Vec::new() }
    }
}

impl SecurityConfig {
    pub fn from_json_str(text: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("cannot read {}: {}", path.display(), e)))?;
        let cfg = Self::from_json_str(&text)?;
        info!(target: "rolegate::config", path = %path.display(), permissions = cfg.permissions.len(), "configuration loaded");
        Ok(cfg)
    }

    /// `ROLEGATE_CONFIG` names the document (the sample configuration is used
    /// when unset); `ROLEGATE_AUTH_MANAGER` overrides `auth_manager`.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// [`SecurityConfig::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = match lookup(CONFIG_PATH_ENV).filter(|p| !p.trim().is_empty()) {
            Some(path) => Self::from_path(path)?,
            None => {
                info!(target: "rolegate::config", "{} not set; using sample configuration", CONFIG_PATH_ENV);
                Self::sample()
            }
        };
        if let Some(kind) = lookup(AUTH_MANAGER_ENV) {
            cfg.auth_manager = kind;
        }
        Ok(cfg)
    }

    pub fn auth_manager_kind(&self) -> AppResult<AuthManagerKind> {
        self.auth_manager.parse()
    }

    pub fn identity_provider(&self) -> AppResult<Box<dyn IdentityProvider>> {
        Ok(self.auth_manager_kind()?.build(&self.users))
    }

    /// Validate and convert into the ordered permission list.
    pub fn build_permissions(&self) -> AppResult<Vec<Permission>> {
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(self.permissions.len());
        for entry in &self.permissions {
            if entry.name.trim().is_empty() {
                return Err(AppError::unknown_config("permission with empty name"));
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(AppError::unknown_config(format!("duplicate permission '{}'", entry.name)));
            }
            out.push(entry.build()?);
        }
        info!(target: "rolegate::config", count = out.len(), "permissions validated");
        Ok(out)
    }

    /// The reference deployment: readers and editors per resource type.
    pub fn sample() -> Self {
        let users = BTreeMap::from([
            ("a-reader".to_string(), roles(&["a-reader"])),
            ("b-manager".to_string(), roles(&["b-reader", "b-editor"])),
            ("admin".to_string(), roles(&["a-reader", "a-editor", "b-reader", "b-editor"])),
        ]);
        let entry = |name: &str, ty: &str, actions: &[&str], required: &[&str]| PermissionConfig {
            name: name.to_string(),
            resources: vec![ResourceFilterConfig { resource_type: ty.to_string(), name_patterns: Vec::new(), required_tags: Tags::new() }],
            actions: roles(actions),
            policies: vec![json!({ "kind": "role_based", "roles": required })],
            decision_strategy: default_strategy(),
        };
        Self {
            auth_manager: "static".to_string(),
            users,
            permissions: vec![
                entry("read-from-any-A", "A", &["read"], &["a-reader"]),
                entry("edit-any-A", "A", &["edit"], &["a-editor"]),
                entry("manage-any-B", "B", &["read", "edit"], &["b-reader", "b-editor"]),
            ],
        }
    }
}

fn roles(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl PermissionConfig {
    fn build(&self) -> AppResult<Permission> {
        let ctx = |e: AppError| AppError::unknown_config(format!("permission '{}': {}", self.name, e.message()));
        let mut builder = Permission::builder(&self.name);
        for filter in &self.resources {
            let resource_type: ResourceType = filter.resource_type.parse().map_err(ctx)?;
            let filter = ResourceFilter {
                resource_type,
                name_patterns: filter.name_patterns.clone(),
                required_tags: filter.required_tags.clone(),
            };
            if filter.has_unenforced_filters() {
                warn!(target: "rolegate::config", permission = %self.name,
                    "name patterns and required tags are not enforced; only the resource type is matched");
            }
            builder = builder.resource(filter);
        }
        if self.actions.is_empty() {
            return Err(AppError::unknown_config(format!("permission '{}': no actions", self.name)));
        }
        for action in &self.actions {
            builder = builder.action(action.parse::<Action>().map_err(ctx)?);
        }
        for policy in &self.policies {
            let spec: PolicySpec = from_config_value(policy.clone(), "policy").map_err(ctx)?;
            builder = builder.shared_policy(spec.build().map_err(ctx)?);
        }
        if self.policies.len() > 1 {
            warn!(target: "rolegate::config", permission = %self.name, policies = self.policies.len(),
                "only the first policy of a permission is evaluated");
        }
        let strategy: DecisionStrategy =
            from_config_value(Value::String(self.decision_strategy.clone()), "decision strategy").map_err(ctx)?;
        Ok(builder.decision_strategy(strategy).build())
    }
}

fn from_config_value<T: DeserializeOwned>(value: Value, what: &str) -> AppResult<T> {
    serde_json::from_value(value).map_err(|e| AppError::unknown_config(format!("invalid {}: {}", what, e)))
}
