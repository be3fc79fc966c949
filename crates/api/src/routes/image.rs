//! Route definitions for the `/images` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::{annotation, image};
use crate::state::AppState;

/// Routes mounted at `/images`.
///
/// ```text
/// GET    /{id}                      -> get_by_id
/// PUT    /{id}                      -> update
/// DELETE /{id}                      -> delete
///
/// GET    /{id}/annotations          -> list_by_image
/// POST   /{id}/annotations          -> create
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(image::get_by_id).put(image::update).delete(image::delete),
        )
        .route(
            "/{id}/annotations",
            get(annotation::list_by_image).post(annotation::create),
        )
}
