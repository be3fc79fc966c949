//! Route definitions for the `/projects` resource.
//!
//! Also nests dataset collection routes under `/projects/{id}/datasets`.

use axum::routing::get;
use axum::Router;

use crate::handlers::{dataset, project};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                          -> list
/// POST   /                          -> create
/// GET    /{id}                      -> get_by_id
/// PUT    /{id}                      -> update
/// DELETE /{id}                      -> delete
/// GET    /{id}/overview             -> overview
///
/// GET    /{id}/datasets             -> list_by_project
/// POST   /{id}/datasets             -> create
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::delete),
        )
        .route("/{id}/overview", get(project::overview))
        .route(
            "/{id}/datasets",
            get(dataset::list_by_project).post(dataset::create),
        )
}
