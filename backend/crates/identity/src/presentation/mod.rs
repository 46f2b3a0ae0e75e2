//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and access gates.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::{IdentityState, ValidJson};
pub use middleware::{AccessGate, CurrentAccount, RoleGate, require_bearer, require_role};
pub use router::{identity_router, identity_router_generic};
