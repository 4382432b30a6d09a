use crate::db::entities::users::UserStatus;
use crate::db::user_ops::{self, NewUser};
use crate::error::{AppError, AppJson};
use crate::services::auth::gate::Session;
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Response};
use axum::Json;
use proyecta_core::{AuthRequest, CreatedUserResponse, LoginResponse, MeResponse, MessageResponse};
use std::sync::Arc;
use tracing::{info, warn};

/// Trimmed value, or `None` when absent or blank.
pub(crate) fn required(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Outcome of a successful credential check.
pub(crate) struct LoginOutcome {
    pub(crate) token: String,
    pub(crate) body: LoginResponse,
}

pub(crate) async fn login(
    state: &AppState,
    email: Option<&str>,
    password: Option<&str>,
) -> Result<LoginOutcome, AppError> {
    let (Some(email), Some(password)) = (required(email), password.filter(|p| !p.is_empty()))
    else {
        return Err(AppError::validation("Correo y contraseña son requeridos"));
    };
    let email = normalize_email(email);

    let Some(user) = user_ops::find_user_by_email(&state.db, &email).await? else {
        state.passwords.verify_decoy(password).await?;
        warn!("login rejected: unknown email");
        return Err(AppError::InvalidCredentials);
    };

    let result = check_account(state, &user, password).await;
    if let Err(err) = user_ops::record_login_attempt(&state.db, user.id, result.is_ok()).await {
        warn!(user_id = %user.id, error = %err, "failed to record login attempt");
    }
    let roles = result?;

    let token = state.sessions.issue(user.id, &roles)?;
    info!(user_id = %user.id, rol = %roles[0], "user logged in");

    Ok(LoginOutcome {
        token,
        body: LoginResponse {
            message: "Login exitoso".to_string(),
            rol: roles[0].clone(),
            nombre_completo: user.full_name,
        },
    })
}

/// Verifies the password, then the account state. Returns the held roles.
async fn check_account(
    state: &AppState,
    user: &crate::db::entities::users::Model,
    password: &str,
) -> Result<Vec<String>, AppError> {
    if !state.passwords.verify(password, &user.password_hash).await? {
        warn!(user_id = %user.id, "login rejected: wrong password");
        return Err(AppError::InvalidCredentials);
    }
    if user.status == UserStatus::Inactive {
        warn!(user_id = %user.id, "login rejected: inactive account");
        return Err(AppError::AccountInactive);
    }

    let roles = user_ops::load_user_roles(&state.db, user.id).await?;
    if roles.is_empty() {
        warn!(user_id = %user.id, "login rejected: no role assigned");
        return Err(AppError::PendingRoleAssignment);
    }
    Ok(roles)
}

/// Self-service registration. The new account holds no role until an
/// administrator assigns one.
pub(crate) async fn register(
    state: &AppState,
    request: &AuthRequest,
) -> Result<CreatedUserResponse, AppError> {
    let (Some(full_name), Some(national_id), Some(email), Some(password)) = (
        required(request.nombre_completo.as_deref()),
        required(request.cedula.as_deref()),
        required(request.correo.as_deref()),
        request.contrasena.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::validation(
            "Todos los campos (nombre completo, cédula, correo y contraseña) son requeridos para el registro",
        ));
    };
    let email = normalize_email(email);

    if user_ops::find_user_by_email(&state.db, &email).await?.is_some() {
        return Err(AppError::DuplicateEmail);
    }
    if user_ops::find_user_by_national_id(&state.db, national_id)
        .await?
        .is_some()
    {
        return Err(AppError::DuplicateNationalId);
    }

    let password_hash = state.passwords.hash(password).await?;
    let user = user_ops::insert_user(
        &state.db,
        NewUser {
            full_name: full_name.to_string(),
            national_id: national_id.to_string(),
            email,
            password_hash,
            status: UserStatus::Active,
        },
    )
    .await?;

    info!(user_id = %user.id, "user registered, awaiting role assignment");

    Ok(CreatedUserResponse {
        message: format!("Usuario {} registrado exitosamente.", user.full_name),
        user_id: user.id,
    })
}

/// `POST /api/auth/login`: dispatches on `action`.
pub(crate) async fn auth_action(
    State(state): State<Arc<AppState>>,
    AppJson(request): AppJson<AuthRequest>,
) -> Result<Response, AppError> {
    let action = request
        .action
        .as_deref()
        .map(|a| a.trim().to_lowercase())
        .unwrap_or_default();

    match action.as_str() {
        "login" => {
            let outcome = login(
                &state,
                request.correo.as_deref(),
                request.contrasena.as_deref(),
            )
            .await?;
            let cookie = state
                .sessions
                .cookie(&outcome.token)
                .map_err(|e| AppError::Internal(format!("invalid session cookie: {e}")))?;
            Ok((StatusCode::OK, [(SET_COOKIE, cookie)], Json(outcome.body)).into_response())
        }
        "register" => {
            let created = register(&state, &request).await?;
            Ok((StatusCode::CREATED, Json(created)).into_response())
        }
        _ => Err(AppError::validation("Acción no válida")),
    }
}

/// `POST /api/auth/logout`. Tokens are stateless, so only the cookie is cleared.
pub(crate) async fn logout(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let cookie = state
        .sessions
        .clear_cookie()
        .map_err(|e| AppError::Internal(format!("invalid session cookie: {e}")))?;
    let body = MessageResponse {
        message: "Sesión cerrada exitosamente".to_string(),
    };
    Ok((StatusCode::OK, [(SET_COOKIE, cookie)], Json(body)).into_response())
}

/// `GET /api/auth/me`
pub(crate) async fn me(Session(claims): Session) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: claims.sub,
        rol: claims.rol,
        roles: claims.roles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::entities::user_sessions;
    use crate::test_support;
    use proyecta_core::roles;
    use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let state = test_support::state().await;
        test_support::create_user_with_role(
            &state,
            "ana@example.com",
            "clave123",
            roles::ADMINISTRATOR,
        )
        .await;

        let wrong = login(&state, Some("ana@example.com"), Some("otra"))
            .await
            .err()
            .unwrap();
        let unknown = login(&state, Some("nadie@example.com"), Some("clave123"))
            .await
            .err()
            .unwrap();

        assert!(matches!(wrong, AppError::InvalidCredentials));
        assert!(matches!(unknown, AppError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn unknown_email_still_pays_for_a_password_check() {
        let state = test_support::state().await;
        test_support::create_user_with_role(
            &state,
            "ana@example.com",
            "clave123",
            roles::COLLABORATOR,
        )
        .await;
        let before = state.passwords.verifications();

        let _ = login(&state, Some("ana@example.com"), Some("otra")).await;
        let after_wrong = state.passwords.verifications();
        let _ = login(&state, Some("nadie@example.com"), Some("otra")).await;
        let after_unknown = state.passwords.verifications();

        assert_eq!(after_wrong - before, 1);
        assert_eq!(after_unknown - after_wrong, 1);
    }

    #[tokio::test]
    async fn login_returns_primary_role_and_records_attempts() {
        let state = test_support::state().await;
        let user = test_support::create_user_with_role(
            &state,
            "admin@example.com",
            "clave123",
            roles::ADMINISTRATOR,
        )
        .await;

        let _ = login(&state, Some("admin@example.com"), Some("mala")).await;
        let outcome = login(&state, Some(" Admin@Example.com "), Some("clave123"))
            .await
            .unwrap();

        assert_eq!(outcome.body.rol, roles::ADMINISTRATOR);
        assert_eq!(outcome.body.message, "Login exitoso");
        let claims = state.sessions.verify(&outcome.token).unwrap();
        assert_eq!(claims.sub, user.id);

        let attempts = user_sessions::Entity::find()
            .filter(user_sessions::Column::UserId.eq(user.id))
            .count(&state.db)
            .await
            .unwrap();
        let successes = user_sessions::Entity::find()
            .filter(user_sessions::Column::UserId.eq(user.id))
            .filter(user_sessions::Column::LoginSuccess.eq(true))
            .count(&state.db)
            .await
            .unwrap();
        assert_eq!(attempts, 2);
        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn registered_user_is_pending_role_assignment() {
        let state = test_support::state().await;
        let request = AuthRequest::register("Luis Pérez", "V-123", "luis@example.com", "clave123");
        let created = register(&state, &request).await.unwrap();
        assert!(created.message.contains("Luis Pérez"));

        assert!(user_ops::load_user_roles(&state.db, created.user_id).await.unwrap().is_empty());
        let err = login(&state, Some("luis@example.com"), Some("clave123")).await.err().unwrap();
        assert!(matches!(err, AppError::PendingRoleAssignment));
    }

    #[tokio::test]
    async fn inactive_account_is_refused_after_password_check() {
        let state = test_support::state().await;
        let user = test_support::create_user_with_role(
            &state,
            "inactivo@example.com",
            "clave123",
            roles::COLLABORATOR,
        )
        .await;
        test_support::set_status(&state.db, user.id, UserStatus::Inactive).await;

        let wrong = login(&state, Some("inactivo@example.com"), Some("mala"))
            .await
            .err()
            .unwrap();
        assert!(matches!(wrong, AppError::InvalidCredentials));
        let right = login(&state, Some("inactivo@example.com"), Some("clave123"))
            .await
            .err()
            .unwrap();
        assert!(matches!(right, AppError::AccountInactive));
    }

    #[tokio::test]
    async fn duplicate_national_id_is_a_conflict() {
        let state = test_support::state().await;
        register(&state, &AuthRequest::register("A", "C-1", "a@example.com", "x")).await.unwrap();
        let err = register(&state, &AuthRequest::register("B", "C-1", "b@example.com", "x"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::DuplicateNationalId));
    }

    #[tokio::test]
    async fn blank_fields_are_missing() {
        let state = test_support::state().await;
        let err = login(&state, Some("   "), Some("x")).await.err().unwrap();
        assert!(matches!(err, AppError::Validation(_)));

        let err = register(&state, &AuthRequest::register("A", " ", "a@example.com", "x"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
