use axum::{
    routing::{get, post},
    Router,
};

use crate::views::user_auth::{create_token, create_user, me, update_me};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user/create/", post(create_user))
        .route("/user/token/", post(create_token))
        .route("/user/me/", get(me).patch(update_me))
}
