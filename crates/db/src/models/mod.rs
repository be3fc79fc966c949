//! Row types mirroring the database tables.
//!
//! Each row converts into its `labelhub-core` entity; the rest of the
//! workspace never sees these types.

pub mod account;
pub mod annotation;
pub mod dataset;
pub mod image;
pub mod project;
pub mod session;
