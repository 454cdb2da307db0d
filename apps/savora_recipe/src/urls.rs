use axum::{routing::get, Router};

use savora_core::AppState;

use crate::views::{recipe, tag};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/recipes/", get(recipe::list).post(recipe::create))
        .route(
            "/recipes/:id/",
            get(recipe::retrieve)
                .put(recipe::full_update)
                .patch(recipe::partial_update)
                .delete(recipe::destroy),
        )
        .route("/tag/", get(tag::list).post(tag::create))
        .route(
            "/tag/:id/",
            get(tag::retrieve)
                .patch(tag::partial_update)
                .delete(tag::destroy),
        )
}
