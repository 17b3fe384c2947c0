//! rolegate: in-process, role-based authorization for domain operations.
//!
//! Load a [`config::SecurityConfig`], build the permission list once, bind a
//! [`security::SecurityContext`] per request and run protected operations
//! through a [`security::Guard`].

pub mod config;
pub mod demo;
pub mod error;
pub mod identity;
pub mod observability;
pub mod security;

pub use error::{AppError, AppResult};
