use serde::{Deserialize, Serialize};

/// Resolved caller identity as handed over by an identity provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Principal {
    pub fn new<I, S>(user_id: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { user_id: user_id.into(), roles: roles.into_iter().map(Into::into).collect() }
    }

    /// Identity used when no provider resolved the caller. Holds no roles.
    pub fn anonymous() -> Self {
        Self { user_id: String::new(), roles: Vec::new() }
    }

    pub fn is_anonymous(&self) -> bool { self.user_id.is_empty() }
}
