//! Two protected domain objects and an orchestrator exercising them, used by
//! the `rolegate --probe` command and the end-to-end tests.

use tracing::info;

use crate::error::AppResult;
use crate::security::{Action, Guard, Resource, ResourceType, SecurityContext, Tags};

const READ: Guard = Guard::require(&[Action::Read]);
const EDIT: Guard = Guard::require(&[Action::Edit]);

macro_rules! protected_resource {
    ($(#[$meta:meta])* $name:ident, $ty:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            name: String,
            tags: Tags,
        }

        impl $name {
            pub fn new(name: impl Into<String>) -> Self {
                Self { name: name.into(), tags: Tags::new() }
            }

            pub fn with_tags(name: impl Into<String>, tags: Tags) -> Self {
                Self { name: name.into(), tags }
            }

            pub fn read_protected(&self, ctx: &SecurityContext) -> AppResult<String> {
                READ.run(ctx, self, |r| r.touch("read_protected"))
            }

            pub fn edit_protected(&self, ctx: &SecurityContext) -> AppResult<String> {
                EDIT.run(ctx, self, |r| r.touch("edit_protected"))
            }

            /// Never consults the engine.
            pub fn unprotected(&self) -> String {
                self.touch("unprotected")
            }

            fn touch(&self, op: &str) -> String {
                info!(target: "rolegate::demo", resource = %self.name, "calling {}", op);
                format!("{} on {}", op, self.name)
            }
        }

        impl Resource for $name {
            fn name(&self) -> &str { &self.name }
            fn resource_type(&self) -> ResourceType { $ty }
            fn tags(&self) -> &Tags { &self.tags }
        }
    };
}

protected_resource!(
    /// Resource of type `A`.
    ResourceA,
    ResourceType::A
);
protected_resource!(
    /// Resource of type `B`.
    ResourceB,
    ResourceType::B
);

/// Runs every protected operation on a pair of resources for one caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct Orchestrator;

impl Orchestrator {
    /// One line per attempt: `DONE <op>` on success, the denial explanation otherwise.
    pub fn probe(&self, ctx: &SecurityContext, a: &ResourceA, b: &ResourceB) -> Vec<String> {
        let attempts: [(&str, AppResult<String>); 4] = [
            ("a.read_protected()", a.read_protected(ctx)),
            ("b.read_protected()", b.read_protected(ctx)),
            ("a.edit_protected()", a.edit_protected(ctx)),
            ("b.edit_protected()", b.edit_protected(ctx)),
        ];
        attempts
            .into_iter()
            .map(|(label, outcome)| match outcome {
                Ok(_) => format!("DONE {}", label),
                Err(e) => e.message().to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecurityConfig;
    use crate::security::SecurityManager;

    fn manager() -> SecurityManager {
        SecurityManager::new(SecurityConfig::sample().build_permissions().unwrap())
    }

    #[test]
    fn probe_for_a_reader() {
        let ctx = manager().bind_identity("a-reader", ["a-reader"]);
        let lines = Orchestrator.probe(&ctx, &ResourceA::new("a"), &ResourceB::new("b"));
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "DONE a.read_protected()");
        assert!(lines[1].starts_with("No permissions to execute [read] on B:b."));
        assert_eq!(lines[2], "No permissions to execute [edit] on A:a. Requires roles [a-editor]");
        assert!(lines[3].contains("Requires roles [b-reader, b-editor]"));
    }

    #[test]
    fn probe_for_admin_is_all_done() {
        let ctx = manager().bind_identity("admin", ["a-reader", "a-editor", "b-reader", "b-editor"]);
        let lines = Orchestrator.probe(&ctx, &ResourceA::new("a"), &ResourceB::new("b"));
        assert!(lines.iter().all(|l| l.starts_with("DONE ")), "{lines:?}");
    }

    #[test]
    fn unprotected_needs_no_identity() {
        assert_eq!(ResourceA::new("a").unprotected(), "unprotected on a");
        assert_eq!(ResourceB::new("b").resource_type(), ResourceType::B);
    }
}
