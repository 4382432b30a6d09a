use axum::Router;
use axum::http::{HeaderValue, header::CACHE_CONTROL};
use axum::routing::get;
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::services::dashboard::{admin, collaborator, manager};
use crate::services::users;
use crate::state::AppState;

pub(crate) fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            get(admin::admin_dashboard)
                .post(users::create_user_handler)
                .put(users::update_user_handler)
                .delete(users::delete_user_handler)
                .patch(users::change_password_handler),
        )
        .route("/collaborator", get(collaborator::collaborator_dashboard))
        .route("/manager", get(manager::manager_dashboard))
        .route("/consultant", get(manager::consultant_dashboard))
        // 聚合结果每次实时计算，禁止缓存
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store, max-age=0"),
        ))
}
