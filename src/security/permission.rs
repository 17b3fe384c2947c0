//! Permission records: which resources, which actions, which policies.
//! Built once at startup and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::policy::{Policy, RoleBasedPolicy};
use super::resource::{Resource, Tags};
use super::taxonomy::{Action, ResourceType};

/// Selects the resources a permission applies to.
///
/// Only `resource_type` is evaluated today. `name_patterns` and `required_tags`
/// are carried through configuration but not matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceFilter {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    #[serde(default)]
    pub name_patterns: Vec<String>,
    #[serde(default)]
    pub required_tags: Tags,
}

impl ResourceFilter {
    pub fn of_type(resource_type: ResourceType) -> Self {
        Self { resource_type, name_patterns: Vec::new(), required_tags: Tags::new() }
    }

    pub fn any() -> Self { Self::of_type(ResourceType::All) }

    pub fn has_unenforced_filters(&self) -> bool {
        !self.name_patterns.is_empty() || !self.required_tags.is_empty()
    }

    fn matches(&self, resource: &dyn Resource) -> bool {
        // TODO: evaluate name_patterns and required_tags once their matching rules are settled
        self.resource_type.covers(resource.resource_type())
    }
}

/// How multiple policies of one permission combine. Recorded, not yet consulted:
/// enforcement evaluates the first policy only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionStrategy {
    #[default]
    Unanimous,
    Affirmative,
    Consensus,
}

#[derive(Debug, Clone)]
pub struct Permission {
    name: String,
    resources: Vec<ResourceFilter>,
    actions: Vec<Action>,
    policies: Vec<Arc<dyn Policy>>,
    decision_strategy: DecisionStrategy,
}

impl Permission {
    pub fn builder(name: impl Into<String>) -> PermissionBuilder {
        PermissionBuilder {
            name: name.into(),
            resources: Vec::new(),
            actions: Vec::new(),
            policies: Vec::new(),
            decision_strategy: DecisionStrategy::default(),
        }
    }

    /// Read access on any resource selected by the optional name/tag filters.
    pub fn with_permission_to_read<I, S>(name: impl Into<String>, roles: I, name_patterns: Vec<String>, required_tags: Tags) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::scoped_to(name, Action::Read, roles, name_patterns, required_tags)
    }

    /// Edit access on any resource selected by the optional name/tag filters.
    pub fn with_permission_to_write<I, S>(name: impl Into<String>, roles: I, name_patterns: Vec<String>, required_tags: Tags) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::scoped_to(name, Action::Edit, roles, name_patterns, required_tags)
    }

    fn scoped_to<I, S>(name: impl Into<String>, action: Action, roles: I, name_patterns: Vec<String>, required_tags: Tags) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Permission::builder(name)
            .resource(ResourceFilter { resource_type: ResourceType::All, name_patterns, required_tags })
            .action(action)
            .policy(RoleBasedPolicy::new(roles))
            .decision_strategy(DecisionStrategy::Affirmative)
            .build()
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn resources(&self) -> &[ResourceFilter] { &self.resources }
    pub fn actions(&self) -> &[Action] { &self.actions }
    pub fn policies(&self) -> &[Arc<dyn Policy>] { &self.policies }
    pub fn decision_strategy(&self) -> DecisionStrategy { self.decision_strategy }

    /// True if any filter selects the resource's type (or is the wildcard).
    pub fn matches_resource(&self, resource: &dyn Resource) -> bool {
        self.resources.iter().any(|f| f.matches(resource))
    }

    /// True if the permission covers *every* requested action, or holds the wildcard.
    pub fn matches_actions(&self, requested: &[Action]) -> bool {
        if self.actions.contains(&Action::All) {
            return true;
        }
        requested.iter().all(|a| self.actions.contains(a))
    }
}

/// Missing fields fall back to: any resource, any action, no policies, unanimous.
#[derive(Debug)]
pub struct PermissionBuilder {
    name: String,
    resources: Vec<ResourceFilter>,
    actions: Vec<Action>,
    policies: Vec<Arc<dyn Policy>>,
    decision_strategy: DecisionStrategy,
}

impl PermissionBuilder {
    pub fn resource(mut self, filter: ResourceFilter) -> Self {
        self.resources.push(filter);
        self
    }

    pub fn resource_type(self, resource_type: ResourceType) -> Self {
        self.resource(ResourceFilter::of_type(resource_type))
    }

    pub fn action(mut self, action: Action) -> Self {
        if !self.actions.contains(&action) {
            self.actions.push(action);
        }
        self
    }

    pub fn actions<I: IntoIterator<Item = Action>>(self, actions: I) -> Self {
        actions.into_iter().fold(self, |b, a| b.action(a))
    }

    pub fn policy<P: Policy + 'static>(self, policy: P) -> Self {
        self.shared_policy(Arc::new(policy))
    }

    pub fn shared_policy(mut self, policy: Arc<dyn Policy>) -> Self {
        self.policies.push(policy);
        self
    }

    pub fn decision_strategy(mut self, strategy: DecisionStrategy) -> Self {
        self.decision_strategy = strategy;
        self
    }

    pub fn build(self) -> Permission {
        let resources = if self.resources.is_empty() { vec![ResourceFilter::any()] } else { self.resources };
        let actions = if self.actions.is_empty() { vec![Action::All] } else { self.actions };
        Permission {
            name: self.name,
            resources,
            actions,
            policies: self.policies,
            decision_strategy: self.decision_strategy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::resource::TaggedResource;

    fn a() -> TaggedResource { TaggedResource::new("a", ResourceType::A) }
    fn b() -> TaggedResource { TaggedResource::new("b", ResourceType::B) }

    #[test]
    fn builder_defaults() {
        let p = Permission::builder("open").build();
        assert_eq!(p.resources(), &[ResourceFilter::any()]);
        assert_eq!(p.actions(), &[Action::All]);
        assert!(p.policies().is_empty());
        assert_eq!(p.decision_strategy(), DecisionStrategy::Unanimous);
    }

    #[test]
    fn resource_matching_by_type() {
        let p = Permission::builder("a-only").resource_type(ResourceType::A).build();
        assert!(p.matches_resource(&a()));
        assert!(!p.matches_resource(&b()));

        let any = Permission::builder("any").resource_type(ResourceType::All).build();
        assert!(any.matches_resource(&a()));
        assert!(any.matches_resource(&b()));

        let both = Permission::builder("a-or-b")
            .resource_type(ResourceType::B)
            .resource_type(ResourceType::A)
            .build();
        assert!(both.matches_resource(&a()));
    }

    #[test]
    fn name_and_tag_filters_are_not_evaluated() {
        let filter = ResourceFilter {
            resource_type: ResourceType::A,
            name_patterns: vec!["reports-*".into()],
            required_tags: Tags::from([("team".to_string(), "x".to_string())]),
        };
        assert!(filter.has_unenforced_filters());
        let p = Permission::builder("filtered").resource(filter).build();
        // neither the name nor the tags of `a` satisfy the filter, yet the type match decides
        assert!(p.matches_resource(&a()));
    }

    #[test]
    fn action_coverage_not_intersection() {
        let p = Permission::builder("read").action(Action::Read).build();
        assert!(p.matches_actions(&[Action::Read]));
        assert!(!p.matches_actions(&[Action::Read, Action::Edit]));
        assert!(!p.matches_actions(&[Action::Edit]));
        assert!(!p.matches_actions(&[Action::All]));
    }

    #[test]
    fn wildcard_action_covers_any_request() {
        let p = Permission::builder("all").action(Action::All).build();
        assert!(p.matches_actions(&[Action::Read, Action::Edit]));
        assert!(p.matches_actions(&[Action::All]));
    }

    #[test]
    fn duplicate_actions_collapse() {
        let p = Permission::builder("rw").actions([Action::Read, Action::Edit, Action::Read]).build();
        assert_eq!(p.actions(), &[Action::Read, Action::Edit]);
    }

    #[test]
    fn read_helper_targets_all_types() {
        let p = Permission::with_permission_to_read("reader", ["r"], vec![], Tags::new());
        assert_eq!(p.actions(), &[Action::Read]);
        assert_eq!(p.resources()[0].resource_type, ResourceType::All);
        assert_eq!(p.decision_strategy(), DecisionStrategy::Affirmative);
        assert_eq!(p.policies().len(), 1);

        let w = Permission::with_permission_to_write("writer", ["w"], vec!["x*".into()], Tags::new());
        assert_eq!(w.actions(), &[Action::Edit]);
        assert_eq!(w.resources()[0].name_patterns, vec!["x*".to_string()]);
    }
}
