use crate::error::AppError;
use crate::services::auth::session::{SessionClaims, extract_session_token};
use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use proyecta_core::roles;
use std::sync::Arc;

pub(crate) const ADMIN_ROLES: &[&str] = &[roles::ADMINISTRATOR, roles::MASTER];
pub(crate) const MANAGER_VIEW_ROLES: &[&str] =
    &[roles::PROJECT_MANAGER, roles::ADMINISTRATOR, roles::MASTER];
pub(crate) const CONSULTANT_VIEW_ROLES: &[&str] =
    &[roles::CONSULTANT, roles::ADMINISTRATOR, roles::MASTER];
pub(crate) const COLLABORATOR_VIEW_ROLES: &[&str] =
    &[roles::COLLABORATOR, roles::ADMINISTRATOR, roles::MASTER];

/// Verified session of the caller.
///
/// Extraction fails with `401` when no token is presented or the token does
/// not verify. Role checks are left to [`require_any`].
#[derive(Debug, Clone)]
pub(crate) struct Session(pub(crate) SessionClaims);

impl FromRequestParts<Arc<AppState>> for Session {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_session_token(&parts.headers).ok_or(AppError::Unauthenticated)?;
        let claims = state.sessions.verify(&token)?;
        Ok(Session(claims))
    }
}

/// Permits when any role held by the session appears in `allowed`.
pub(crate) fn require_any(claims: &SessionClaims, allowed: &[&str]) -> Result<(), AppError> {
    let permitted = std::iter::once(&claims.rol)
        .chain(claims.roles.iter())
        .any(|held| allowed.iter().any(|name| name.eq_ignore_ascii_case(held.trim())));
    if permitted {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}
