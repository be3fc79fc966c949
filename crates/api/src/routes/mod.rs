pub mod annotation;
pub mod auth;
pub mod dataset;
pub mod health;
pub mod image;
pub mod project;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                                     sign up (public)
/// /auth/signin                                     sign in (public)
/// /auth/refresh                                    refresh (public)
/// /auth/signout                                    sign out (requires auth)
/// /auth/session                                    current session (requires auth)
///
/// /projects                                        list, create
/// /projects/{id}                                   get, update, delete
/// /projects/{id}/overview                          project + datasets + counts
/// /projects/{id}/datasets                          list, create
///
/// /datasets/{id}                                   get, update, delete
/// /datasets/{id}/images                            list, create
///
/// /images/{id}                                     get, update, delete
/// /images/{id}/annotations                         list, create
///
/// /annotations/{id}                                get, update, delete
/// ```
///
/// Everything outside `/auth` requires a Bearer access token and is scoped
/// to the projects the caller owns.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/projects", project::router())
        .nest("/datasets", dataset::router())
        .nest("/images", image::router())
        .nest("/annotations", annotation::router())
}
