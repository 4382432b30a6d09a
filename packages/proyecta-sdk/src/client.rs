use crate::error::*;
use proyecta_core::*;
use reqwest::header::{COOKIE, HeaderMap, SET_COOKIE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

#[derive(Clone)]
pub struct ProyectaClient {
    client: Client,
    pub base_url: Url,
    pub timeout: Duration,
    session: Option<String>,
}

impl ProyectaClient {
    pub fn new(base_url: &str) -> SdkResult<Self> {
        Ok(Self {
            client: Client::new(),
            base_url: Url::parse(base_url.trim_end_matches('/'))?,
            timeout: Duration::from_secs(30),
            session: None,
        })
    }

    /// Reuse a token obtained earlier, e.g. from `auth login`.
    pub fn with_session(mut self, token: &str) -> Self {
        self.session = Some(token.to_string());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn session(&self) -> Option<&str> {
        self.session.as_deref()
    }

    pub fn clear_session(&mut self) {
        self.session = None;
    }

    fn request(&self, method: Method, path: &str) -> SdkResult<RequestBuilder> {
        let url = self.base_url.join(path)?;
        let mut request = self.client.request(method, url).timeout(self.timeout);
        // 会话令牌通过 Cookie 回放
        if let Some(token) = &self.session {
            request = request.header(COOKIE, format!("{SESSION_COOKIE_NAME}={token}"));
        }
        Ok(request)
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> SdkResult<(T, HeaderMap)> {
        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(api_error(status, &body));
        }
        Ok((serde_json::from_slice(&body)?, headers))
    }

    async fn call<T: DeserializeOwned>(&self, method: Method, path: &str) -> SdkResult<T> {
        Ok(Self::send(self.request(method, path)?).await?.0)
    }

    async fn call_json<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> SdkResult<T> {
        Ok(Self::send(self.request(method, path)?.json(body)).await?.0)
    }

    pub async fn health(&self) -> SdkResult<HealthStatus> {
        self.call(Method::GET, "/health").await
    }

    /// Logs in and keeps the session token for later calls.
    pub async fn login(&mut self, email: &str, password: &str) -> SdkResult<LoginResponse> {
        let request = self
            .request(Method::POST, "/api/auth/login")?
            .json(&AuthRequest::login(email, password));
        let (body, headers) = Self::send::<LoginResponse>(request).await?;
        self.session = Some(session_from_headers(&headers).ok_or(SdkError::NoSession)?);
        Ok(body)
    }

    pub async fn register(
        &self,
        full_name: &str,
        national_id: &str,
        email: &str,
        password: &str,
    ) -> SdkResult<CreatedUserResponse> {
        let body = AuthRequest::register(full_name, national_id, email, password);
        self.call_json(Method::POST, "/api/auth/login", &body).await
    }

    pub async fn me(&self) -> SdkResult<MeResponse> {
        self.call(Method::GET, "/api/auth/me").await
    }

    pub async fn logout(&mut self) -> SdkResult<MessageResponse> {
        let response = self.call(Method::POST, "/api/auth/logout").await?;
        self.session = None;
        Ok(response)
    }

    pub async fn dashboard(&self) -> SdkResult<AdminDashboard> {
        let envelope: DataEnvelope<AdminDashboard> =
            self.call(Method::GET, "/api/dashboard").await?;
        Ok(envelope.data)
    }

    pub async fn collaborator_dashboard(&self) -> SdkResult<CollaboratorOverview> {
        let envelope: DataEnvelope<CollaboratorOverview> =
            self.call(Method::GET, "/api/dashboard/collaborator").await?;
        Ok(envelope.data)
    }

    pub async fn manager_dashboard(&self) -> SdkResult<ManagerOverview> {
        let envelope: DataEnvelope<ManagerOverview> =
            self.call(Method::GET, "/api/dashboard/manager").await?;
        Ok(envelope.data)
    }

    pub async fn consultant_dashboard(&self) -> SdkResult<ConsultantOverview> {
        let envelope: DataEnvelope<ConsultantOverview> =
            self.call(Method::GET, "/api/dashboard/consultant").await?;
        Ok(envelope.data)
    }

    pub async fn create_user(&self, request: &CreateUserRequest) -> SdkResult<CreatedUserResponse> {
        self.call_json(Method::POST, "/api/dashboard", request).await
    }

    pub async fn update_user(&self, request: &UpdateUserRequest) -> SdkResult<MessageResponse> {
        self.call_json(Method::PUT, "/api/dashboard", request).await
    }

    pub async fn delete_user(&self, user_id: &str) -> SdkResult<MessageResponse> {
        let request = self
            .request(Method::DELETE, "/api/dashboard")?
            .query(&[("userId", user_id)]);
        Ok(Self::send(request).await?.0)
    }

    pub async fn change_password(&self, new_password: &str) -> SdkResult<MessageResponse> {
        let body = ChangePasswordRequest {
            new_password: Some(new_password.to_string()),
        };
        self.call_json(Method::PATCH, "/api/dashboard", &body).await
    }
}

/// Token carried by a `Set-Cookie: sessionToken=...` header, if any.
pub(crate) fn session_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|cookie| cookie.split(';').next())
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE_NAME && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

pub(crate) fn api_error(status: StatusCode, body: &[u8]) -> SdkError {
    let message = match serde_json::from_slice::<ErrorBody>(body) {
        Ok(err) => err.error,
        Err(_) => String::from_utf8_lossy(body).trim().to_string(),
    };
    SdkError::Api {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_client_creation() {
        let client = ProyectaClient::new("http://localhost:3000/").unwrap();
        assert_eq!(client.base_url.as_str(), "http://localhost:3000/");
        assert_eq!(client.timeout, Duration::from_secs(30));
        assert!(client.session().is_none());
        assert!(ProyectaClient::new("not a url").is_err());
    }

    #[test]
    fn test_with_session_and_clear() {
        let mut client = ProyectaClient::new("http://localhost:3000")
            .unwrap()
            .with_session("abc");
        assert_eq!(client.session(), Some("abc"));
        client.clear_session();
        assert_eq!(client.session(), None);
    }

    #[test]
    fn test_session_cookie_is_replayed() {
        let client = ProyectaClient::new("http://localhost:3000")
            .unwrap()
            .with_session("abc");
        let request = client
            .request(Method::GET, "/api/auth/me")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(request.url().as_str(), "http://localhost:3000/api/auth/me");
        assert_eq!(request.headers()[COOKIE], "sessionToken=abc");
    }

    #[test]
    fn test_session_from_set_cookie() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("other=1; Path=/"));
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("sessionToken=tok.en; Path=/; HttpOnly; Max-Age=28800"),
        );
        assert_eq!(session_from_headers(&headers).as_deref(), Some("tok.en"));

        let mut cleared = HeaderMap::new();
        cleared.append(SET_COOKIE, HeaderValue::from_static("sessionToken=; Max-Age=0"));
        assert_eq!(session_from_headers(&cleared), None);
    }

    #[test]
    fn test_api_error_prefers_error_field() {
        let err = api_error(StatusCode::FORBIDDEN, br#"{"error":"Acceso denegado"}"#);
        assert!(matches!(
            err,
            SdkError::Api { status: 403, ref message } if message == "Acceso denegado"
        ));

        let err = api_error(StatusCode::BAD_GATEWAY, b"upstream down\n");
        assert!(matches!(
            err,
            SdkError::Api { status: 502, ref message } if message == "upstream down"
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_http_error() {
        let client = ProyectaClient::new("http://127.0.0.1:1")
            .unwrap()
            .with_timeout(Duration::from_millis(500));
        assert!(matches!(client.health().await, Err(SdkError::HttpError(_))));
    }
}
