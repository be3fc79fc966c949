pub mod annotation;
pub mod auth;
pub mod dataset;
pub mod image;
pub mod project;
