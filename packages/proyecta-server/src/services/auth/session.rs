use crate::error::AppError;
use axum::http::header::{AUTHORIZATION, COOKIE, InvalidHeaderValue};
use axum::http::{HeaderMap, HeaderValue};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use proyecta_core::{SESSION_COOKIE_NAME, SESSION_TTL_SECONDS};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use uuid::Uuid;

/// Claims carried by a session token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub(crate) struct SessionClaims {
    pub(crate) sub: Uuid,        // 用户 ID
    pub(crate) rol: String,      // 主角色
    pub(crate) roles: Vec<String>,
    pub(crate) iat: i64,
    pub(crate) exp: i64,
    pub(crate) jti: String,
}

/// Signs and verifies HS256 session tokens and renders the session cookie.
#[derive(Clone)]
pub(crate) struct SessionCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    secure_cookie: bool,
}

impl SessionCodec {
    pub(crate) fn new(secret: &str, secure_cookie: bool) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            secure_cookie,
        }
    }

    pub(crate) fn issue(&self, user_id: Uuid, roles: &[String]) -> Result<String, AppError> {
        self.issue_at(user_id, roles, Utc::now())
    }

    /// `roles[0]` becomes the primary role.
    pub(crate) fn issue_at(
        &self,
        user_id: Uuid,
        roles: &[String],
        issued_at: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let primary = roles
            .first()
            .cloned()
            .ok_or(AppError::PendingRoleAssignment)?;
        let expires_at = issued_at + Duration::seconds(SESSION_TTL_SECONDS);

        let claims = SessionClaims {
            sub: user_id,
            rol: primary,
            roles: roles.to_vec(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            error!("Failed to encode session token: {}", e);
            AppError::Internal("failed to create session token".to_string())
        })
    }

    pub(crate) fn verify(&self, token: &str) -> Result<SessionClaims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        decode::<SessionClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                warn!("Session token rejected: {}", e);
                AppError::Unauthenticated
            })
    }

    /// Build the `HttpOnly` cookie that carries a freshly issued token.
    pub(crate) fn cookie(&self, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie = format!(
            "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={SESSION_TTL_SECONDS}"
        );
        if self.secure_cookie {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }

    pub(crate) fn clear_cookie(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie =
            format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0");
        if self.secure_cookie {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }
}

/// Reads the session token from the cookie, falling back to a Bearer header.
pub(crate) fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_cookie_token(headers) {
        return Some(token);
    }
    extract_bearer_token(headers)
}

fn extract_cookie_token(headers: &HeaderMap) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let (Some(key), Some(val)) = (parts.next(), parts.next()) else {
                continue;
            };
            let val = val.trim();
            if key.trim() == SESSION_COOKIE_NAME && !val.is_empty() {
                return Some(val.to_string());
            }
        }
    }
    None
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
