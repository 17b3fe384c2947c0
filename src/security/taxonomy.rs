//! Closed resource/action taxonomy. `All` is the wildcard in each dimension.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    #[serde(rename = "all")]
    All,
    A,
    B,
}

impl ResourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::All => "all",
            ResourceType::A => "A",
            ResourceType::B => "B",
        }
    }

    /// Wildcard-aware match: `All` on the filter side matches every type.
    pub fn covers(self, other: ResourceType) -> bool {
        self == ResourceType::All || self == other
    }
}

impl Display for ResourceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "all" | "ALL" => Ok(ResourceType::All),
            "A" | "a" => Ok(ResourceType::A),
            "B" | "b" => Ok(ResourceType::B),
            other => Err(AppError::unknown_config(format!("unknown resource type '{}'", other))),
        }
    }
}

/// CRUD-style action categories; `Edit` covers create/update/delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    All,
    Read,
    Edit,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::All => "all",
            Action::Read => "read",
            Action::Edit => "edit",
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "all" => Ok(Action::All),
            "read" => Ok(Action::Read),
            "edit" => Ok(Action::Edit),
            _ => Err(AppError::unknown_config(format!("unknown action '{}'", value))),
        }
    }
}

/// Render an action list as `[read, edit]` for explanations and logs.
pub fn format_actions(actions: &[Action]) -> String {
    let parts: Vec<&str> = actions.iter().map(|a| a.as_str()).collect();
    format!("[{}]", parts.join(", "))
}
