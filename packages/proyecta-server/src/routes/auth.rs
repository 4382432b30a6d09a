use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::services::auth::user::{auth_action, logout, me};
use crate::state::AppState;

pub(crate) fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(auth_action))
        .route("/logout", post(logout))
        .route("/me", get(me))
}
