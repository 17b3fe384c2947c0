//! Identity resolution: turns an inbound request into a principal that the
//! security layer binds for the lifetime of that request.

mod principal;
mod provider;

pub use principal::Principal;
pub use provider::{
    AuthManagerKind, HeaderIdentityProvider, IdentityProvider, IdentityRequest, NoAuthProvider,
    StaticIdentityProvider, USER_ID_HEADER, USER_ROLES_HEADER,
};
