use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE_NAME: &str = "sessionToken";

/// Session lifetime, shared by the token `exp` claim and the cookie `Max-Age`.
pub const SESSION_TTL_SECONDS: i64 = 60 * 60 * 8;

/// Minimum length accepted for a self-service password change.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Role names seeded by the server. Comparisons against them are case-insensitive.
pub mod roles {
    pub const ADMINISTRATOR: &str = "Administrador";
    pub const MASTER: &str = "Maestro";
    pub const PROJECT_MANAGER: &str = "Gestor de proyectos";
    pub const CONSULTANT: &str = "Consultor";
    pub const COLLABORATOR: &str = "Colaborador";

    pub const ALL: [&str; 5] = [ADMINISTRATOR, MASTER, PROJECT_MANAGER, CONSULTANT, COLLABORATOR];
}

/// User status values as they travel on the wire.
pub mod status {
    pub const ACTIVE: &str = "Activo";
    pub const INACTIVE: &str = "Inactivo";
}

/// `POST /api/auth/login` body. `action` selects between login and register.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthRequest {
    pub action: Option<String>,
    pub correo: Option<String>,
    pub contrasena: Option<String>,
    pub nombre_completo: Option<String>,
    pub cedula: Option<String>,
}

impl AuthRequest {
    pub fn login(email: &str, password: &str) -> Self {
        Self {
            action: Some("login".to_string()),
            correo: Some(email.to_string()),
            contrasena: Some(password.to_string()),
            ..Default::default()
        }
    }

    pub fn register(full_name: &str, national_id: &str, email: &str, password: &str) -> Self {
        Self {
            action: Some("register".to_string()),
            correo: Some(email.to_string()),
            contrasena: Some(password.to_string()),
            nombre_completo: Some(full_name.to_string()),
            cedula: Some(national_id.to_string()),
        }
    }
}

/// Body of a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub rol: String,
    pub nombre_completo: String,
}

/// Body returned when an account is registered or created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedUserResponse {
    pub message: String,
    #[serde(rename = "userId")]
    pub user_id: Uuid,
}

/// `GET /api/auth/me` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub rol: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

/// `POST /api/dashboard` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateUserRequest {
    pub nombre_completo: Option<String>,
    pub cedula: Option<String>,
    pub correo: Option<String>,
    pub contrasena: Option<String>,
    pub rol: Option<String>,
    pub estado: Option<String>,
}

/// `PUT /api/dashboard` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateUserRequest {
    pub id_usuario: Option<String>,
    pub nombre_completo: Option<String>,
    pub cedula: Option<String>,
    pub correo: Option<String>,
    pub rol: Option<String>,
    pub estado: Option<String>,
}

/// `PATCH /api/dashboard` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangePasswordRequest {
    #[serde(rename = "newPassword")]
    pub new_password: Option<String>,
}

/// Dashboard payloads are wrapped in `{ "data": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Everything the administrator dashboard renders, computed in one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    pub overview: Overview,
    pub project_status: Vec<NamedCount>,
    pub financial_trend: Vec<MonthlyFinancial>,
    pub users_by_role: Vec<NamedCount>,
    pub tasks_by_priority_and_status: Vec<PriorityStatusRow>,
    pub all_users: Vec<UserSummary>,
    pub all_projects: Vec<ProjectSummary>,
    pub project_creation_trend: Vec<MonthlyCount>,
    pub user_registration_trend: Vec<MonthlyCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_projects: u64,
    pub active_projects: u64,
    pub completed_projects_last_year: u64,
    pub total_users: u64,
    pub active_users: u64,
    pub active_sessions_last24h: u64,
    pub total_income_month: f64,
    pub total_expense_month: f64,
    pub balance_net_month: f64,
    pub total_assets: u64,
    pub pending_maintenances: u64,
}

/// A `{name, value}` pair used by every distribution chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedCount {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyFinancial {
    pub month: String,
    pub ingresos: f64,
    pub gastos: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCount {
    pub month: String,
    pub total: i64,
}

/// One row per priority; each task status present becomes its own key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityStatusRow {
    pub name: String,
    #[serde(flatten)]
    pub counts: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub cedula: String,
    pub status: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub status: String,
    pub manager: String,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorOverview {
    pub total_assigned: u64,
    pub pending_tasks: u64,
    pub completed_today: u64,
    pub overdue_tasks: u64,
    pub tasks: Vec<AssignedTask>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedTask {
    pub id: i32,
    pub name: String,
    pub project: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectProgress {
    pub id: i32,
    pub name: String,
    pub status: Option<String>,
    pub progress: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerOverview {
    pub total_managed_projects: u64,
    pub active_managed_projects: u64,
    pub overdue_managed_projects: u64,
    pub pending_tasks_in_managed_projects: u64,
    pub consumed_budget: f64,
    pub projects_with_task_progress: Vec<ProjectProgress>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultantOverview {
    pub total_projects: u64,
    pub active_projects: u64,
    pub projects_with_task_progress: Vec<ProjectProgress>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_request_skips_absent_fields() {
        let request: AuthRequest =
            serde_json::from_str(r#"{"action":"login","correo":"a@x.com"}"#).unwrap();
        assert_eq!(request.action.as_deref(), Some("login"));
        assert_eq!(request.correo.as_deref(), Some("a@x.com"));
        assert!(request.contrasena.is_none());
        assert!(request.cedula.is_none());
    }

    #[test]
    fn priority_row_flattens_status_counts() {
        let mut counts = BTreeMap::new();
        counts.insert("Pendiente".to_string(), 3);
        counts.insert("Completada".to_string(), 1);
        let row = PriorityStatusRow {
            name: "Alta".to_string(),
            counts,
        };

        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"name": "Alta", "Pendiente": 3, "Completada": 1})
        );
    }

    #[test]
    fn overview_uses_camel_case_keys() {
        let value = serde_json::to_value(Overview::default()).unwrap();
        assert!(value.get("activeSessionsLast24h").is_some());
        assert!(value.get("balanceNetMonth").is_some());
    }

    #[test]
    fn change_password_reads_camel_case_field() {
        let request: ChangePasswordRequest =
            serde_json::from_str(r#"{"newPassword":"abcdef"}"#).unwrap();
        assert_eq!(request.new_password.as_deref(), Some("abcdef"));
    }
}
