//! Built-in identity provider and its primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- JWT access-token generation, validation, and refresh-token helpers.
//! - [`provider`] -- [`provider::LocalIdentityProvider`], the account store
//!   backed implementation of `IdentityProvider`.

pub mod jwt;
pub mod password;
pub mod provider;
