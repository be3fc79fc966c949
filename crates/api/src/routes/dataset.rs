//! Route definitions for the `/datasets` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::{dataset, image};
use crate::state::AppState;

/// Routes mounted at `/datasets`.
///
/// ```text
/// GET    /{id}                      -> get_by_id
/// PUT    /{id}                      -> update
/// DELETE /{id}                      -> delete
///
/// GET    /{id}/images               -> list_by_dataset
/// POST   /{id}/images               -> create
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(dataset::get_by_id)
                .put(dataset::update)
                .delete(dataset::delete),
        )
        .route(
            "/{id}/images",
            get(image::list_by_dataset).post(image::create),
        )
}
