//! # Auth Module
//!
//! Resolves who is calling so owner-scoped tables can bind reads and writes
//! to the caller's rows. Header and JWT resolvers ship built in.

pub mod errors;
pub mod identity;
pub mod jwt;

pub use errors::{AuthError, AuthResult};
pub use identity::{Anonymous, BearerIdentity, HeaderIdentity, IdentityConfig, IdentityResolver};
pub use jwt::{JwtClaims, JwtConfig, JwtManager};
