//! Consumer-side library for the labelhub API.
//!
//! - [`session`] -- the persisted, subscribable session store.
//! - [`auth`] -- sign-up / sign-in / sign-out over an identity provider.
//! - [`guard`] -- route-level access decisions for a presentation layer.
//! - [`provider`] -- [`HttpIdentityProvider`], the API-backed identity provider.
//! - [`data`] -- [`DataClient`], typed CRUD calls against the project tree.

pub mod auth;
pub mod config;
pub mod data;
pub mod guard;
mod http;
pub mod provider;
pub mod session;

pub use auth::AuthService;
pub use config::ClientConfig;
pub use data::DataClient;
pub use guard::{GuardDecision, RouteGuard};
pub use provider::HttpIdentityProvider;
pub use session::{SessionState, SessionStore};
