//! Domain core for the labelhub annotation workspace.
//!
//! Everything here is free of HTTP and database dependencies:
//!
//! - [`entities`] -- Project / Dataset / Image / Annotation records and DTOs.
//! - [`access`] -- the pure access-scope resolver.
//! - [`store`] -- storage boundary traits plus an in-memory implementation.
//! - [`gateway`] -- ownership-scoped CRUD over the project tree.
//! - [`identity`] -- identities, auth sessions and the identity provider boundary.

pub mod access;
pub mod entities;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod store;
pub mod types;
pub mod validation;
