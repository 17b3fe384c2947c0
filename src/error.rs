//! Unified error model for the authorization engine.
//! Every public operation returns `AppResult<T>`; callers map `AppError` onto
//! their own transport (HTTP status helper provided below).

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    /// The enforcer denied the request. `message` may be empty when no
    /// permission matched the resource at all.
    #[error("forbidden: {message}")]
    Forbidden { message: String },
    /// A guard was misapplied (programming error, never an authorization outcome).
    #[error("contract violation: {message}")]
    ContractViolation { message: String },
    /// A resource type, action or policy kind outside the closed taxonomy.
    #[error("unknown configuration: {message}")]
    UnknownConfiguration { message: String },
    /// The configuration document could not be read or parsed.
    #[error("config error: {message}")]
    Config { message: String },
    /// The identity provider rejected the presented credential.
    #[error("unauthenticated: {message}")]
    Unauthenticated { message: String },
}

impl AppError {
    pub fn code_str(&self) -> &'static str {
        match self {
            AppError::Forbidden { .. } => "forbidden",
            AppError::ContractViolation { .. } => "contract_violation",
            AppError::UnknownConfiguration { .. } => "unknown_configuration",
            AppError::Config { .. } => "config_error",
            AppError::Unauthenticated { .. } => "unauthenticated",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Forbidden { message }
            | AppError::ContractViolation { message }
            | AppError::UnknownConfiguration { message }
            | AppError::Config { message }
            | AppError::Unauthenticated { message } => message.as_str(),
        }
    }

    pub fn forbidden<S: Into<String>>(msg: S) -> Self { AppError::Forbidden { message: msg.into() } }
    pub fn contract<S: Into<String>>(msg: S) -> Self { AppError::ContractViolation { message: msg.into() } }
    pub fn unknown_config<S: Into<String>>(msg: S) -> Self { AppError::UnknownConfiguration { message: msg.into() } }
    pub fn config<S: Into<String>>(msg: S) -> Self { AppError::Config { message: msg.into() } }
    pub fn unauthenticated<S: Into<String>>(msg: S) -> Self { AppError::Unauthenticated { message: msg.into() } }

    pub fn is_forbidden(&self) -> bool { matches!(self, AppError::Forbidden { .. }) }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::Forbidden { .. } => 403,
            AppError::Unauthenticated { .. } => 401,
            AppError::Config { .. } => 400,
            AppError::ContractViolation { .. } | AppError::UnknownConfiguration { .. } => 500,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Config { message: err.to_string() }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Config { message: err.to_string() }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config { message: err.to_string() }
    }
}
