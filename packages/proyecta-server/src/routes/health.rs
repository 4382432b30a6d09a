use axum::Json;
use proyecta_core::HealthStatus;

pub(crate) async fn handler() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
    })
}
