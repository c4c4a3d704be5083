//! Login, logout and session validation against `/api/auth/`.

use crate::client::{ApiClient, Query};
use crate::endpoints;
use crate::error::ApiError;
use crate::session::{token_prefix, UserProfile};
use crate::wire::{timestamp, ActionResponse};
use chrono::NaiveDateTime;
use log::{debug, info, warn};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Minimum password length enforced by the backend.
pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    user: Option<UserProfile>,
}

#[derive(Debug, Deserialize)]
struct CheckAuthResponse {
    #[serde(default)]
    authenticated: bool,
    #[serde(default)]
    user: Option<UserProfile>,
}

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    #[serde(default)]
    user: Option<UserProfile>,
}

/// One login attempt for the current user.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct LoginRecord {
    #[serde(rename = "tarih", with = "timestamp")]
    pub at: NaiveDateTime,
    #[serde(rename = "ip_adresi", default)]
    pub ip_address: Option<String>,
    #[serde(rename = "basarili", default)]
    pub successful: bool,
    #[serde(rename = "hata_mesaji", default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginHistoryResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, alias = "results")]
    history: Vec<LoginRecord>,
}

impl ApiClient {
    /// Exchange credentials for a token and store the new session.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserProfile, ApiError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ApiError::Validation(String::from(
                "username and password are required",
            )));
        }
        let builder = self
            .anonymous(Method::POST, endpoints::LOGIN)
            .json(&json!({ "username": username.trim(), "password": password }));
        let response = self.execute(builder).await?;
        let login: LoginResponse = Self::decode(response).await?;

        match (login.success, login.token, login.user) {
            (true, Some(token), Some(user)) => {
                info!("Logged in as {} (token {})", user.username, token_prefix(&token));
                self.session().set_session(&token, user.clone())?;
                Ok(user)
            }
            _ => Err(ApiError::Validation(
                login.message.unwrap_or_else(|| String::from("login failed")),
            )),
        }
    }

    /// Tell the backend to drop the token, then clear the local session.
    ///
    /// The server call is best effort: the local session is cleared even when
    /// it fails.
    pub async fn logout(&self) -> Result<(), ApiError> {
        if self.session().token().is_some() {
            let builder = self.request(Method::POST, endpoints::LOGOUT);
            match self.execute(builder).await {
                Ok(_) => info!("Logged out"),
                Err(ApiError::Unauthorized) => {}
                Err(e) => warn!("Logout request failed: {}", e),
            }
        }
        self.session().clear_session()?;
        Ok(())
    }

    /// Ask the backend whether the stored token is still valid.
    ///
    /// On success the stored profile is refreshed. An invalid token clears the
    /// session and returns [`ApiError::Unauthorized`].
    pub async fn check_auth(&self) -> Result<UserProfile, ApiError> {
        if self.session().token().is_none() {
            return Err(ApiError::Unauthorized);
        }
        let check: CheckAuthResponse = self.get(endpoints::CHECK_AUTH, &Query::new()).await?;
        match (check.authenticated, check.user) {
            (true, Some(user)) => {
                self.session().set_user(user.clone())?;
                Ok(user)
            }
            _ => {
                self.session().clear_session()?;
                Err(ApiError::Unauthorized)
            }
        }
    }

    /// Restore the persisted session on startup.
    ///
    /// Returns `None` when there is no usable session. With `validate` the
    /// token is checked against the backend first. A token stored without a
    /// profile is always validated.
    pub async fn restore_session(&self, validate: bool) -> Result<Option<UserProfile>, ApiError> {
        let state = self.session().state();
        if state.token.is_none() {
            return Ok(None);
        }
        if let (false, Some(user)) = (validate, state.user) {
            return Ok(Some(user));
        }
        match self.check_auth().await {
            Ok(user) => Ok(Some(user)),
            Err(ApiError::Unauthorized) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        let profile: ProfileResponse = self.get(endpoints::PROFILE, &Query::new()).await?;
        let user = profile
            .user
            .ok_or_else(|| ApiError::Validation(String::from("profile response has no user")))?;
        self.session().set_user(user.clone())?;
        Ok(user)
    }

    pub async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<ActionResponse, ApiError> {
        if new_password != confirm_password {
            return Err(ApiError::Validation(String::from(
                "new passwords do not match",
            )));
        }
        if new_password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ApiError::Validation(format!(
                "new password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        let body = json!({
            "old_password": old_password,
            "new_password": new_password,
            "confirm_password": confirm_password,
        });
        self.post(endpoints::CHANGE_PASSWORD, &body).await
    }

    /// The most recent login attempts for the signed-in user, newest first.
    /// The backend keeps the last five.
    pub async fn login_history(&self) -> Result<Vec<LoginRecord>, ApiError> {
        if self.session().token().is_none() {
            return Err(ApiError::Unauthorized);
        }
        let response: LoginHistoryResponse =
            self.get(endpoints::LOGIN_HISTORY, &Query::new()).await?;
        if !response.success {
            return Err(ApiError::Validation(
                response
                    .message
                    .unwrap_or_else(|| String::from("login history unavailable")),
            ));
        }
        debug!("Login history has {} entries", response.history.len());
        Ok(response.history)
    }
}

#[cfg(test)]
mod tests {
    use crate::client::{ApiClient, DEFAULT_TIMEOUT};
    use crate::error::ApiError;
    use crate::session::{LocalSession, SessionStore, UserProfile};
    use chrono::NaiveDate;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LOGIN_OK: &str = r#"{"success": true, "message": "Giriş başarılı", "token": "9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b",
        "user": {"id": 1, "username": "ayse", "first_name": "Ayşe", "last_name": "Kaya", "email": "", "is_superuser": false, "sulamalar": []}}"#;

    fn setup(server: &MockServer) -> (ApiClient, Arc<LocalSession>) {
        let session = Arc::new(LocalSession::in_memory());
        let api = ApiClient::new(&server.uri(), session.clone(), DEFAULT_TIMEOUT).unwrap();
        (api, session)
    }

    fn json_body(status: u16, body: &str) -> ResponseTemplate {
        ResponseTemplate::new(status).set_body_raw(body, "application/json")
    }

    async fn received(server: &MockServer) -> usize {
        server.received_requests().await.map_or(0, |r| r.len())
    }

    #[tokio::test]
    async fn test_login_stores_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login/"))
            .and(body_json(serde_json::json!({"username": "ayse", "password": "parola123"})))
            .respond_with(json_body(200, LOGIN_OK))
            .expect(1)
            .mount(&server)
            .await;
        let (api, session) = setup(&server);

        let user = api.login(" ayse ", "parola123").await.unwrap();
        assert_eq!(user.display_name(), "Ayşe Kaya");
        assert_eq!(
            session.token().as_deref(),
            Some("9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b")
        );
        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_failed_login_reports_backend_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login/"))
            .respond_with(json_body(
                401,
                r#"{"success": false, "message": "Kullanıcı adı veya şifre hatalı"}"#,
            ))
            .mount(&server)
            .await;
        let (api, session) = setup(&server);

        let err = api.login("ayse", "yanlis").await.unwrap_err();
        assert!(err.to_string().contains("Kullanıcı adı veya şifre hatalı"));
        assert!(session.token().is_none());
    }

    #[tokio::test]
    async fn test_login_requires_credentials() {
        let server = MockServer::start().await;
        let (api, _) = setup(&server);
        assert!(matches!(
            api.login("  ", "x").await,
            Err(ApiError::Validation(_))
        ));
        assert_eq!(received(&server).await, 0);
    }

    #[tokio::test]
    async fn test_check_auth_invalid_token_clears_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/check-auth/"))
            .and(header("authorization", "Token stale-token-value"))
            .respond_with(json_body(401, r#"{"authenticated": false}"#))
            .expect(1)
            .mount(&server)
            .await;
        let (api, session) = setup(&server);
        session
            .set_session("stale-token-value", UserProfile::default())
            .unwrap();

        let restored = api.restore_session(true).await.unwrap();
        assert!(restored.is_none());
        assert!(session.token().is_none());
    }

    #[tokio::test]
    async fn test_restore_without_validation_uses_stored_user() {
        let server = MockServer::start().await;
        let (api, session) = setup(&server);
        let user = UserProfile {
            username: String::from("mehmet"),
            ..UserProfile::default()
        };
        session.set_session("token-abcdefghij", user).unwrap();

        let restored = api.restore_session(false).await.unwrap().unwrap();
        assert_eq!(restored.username, "mehmet");
        assert_eq!(received(&server).await, 0);
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_server_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout/"))
            .respond_with(json_body(500, r#"{"error": "boom"}"#))
            .expect(1)
            .mount(&server)
            .await;
        let (api, session) = setup(&server);
        session
            .set_session("token-abcdefghij", UserProfile::default())
            .unwrap();

        api.logout().await.unwrap();
        assert!(session.token().is_none());
    }

    #[tokio::test]
    async fn test_change_password_checks_confirmation_locally() {
        let server = MockServer::start().await;
        let (api, _) = setup(&server);
        let err = api
            .change_password("eski-parola", "yeni-parola-1", "yeni-parola-2")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        let err = api.change_password("eski-parola", "kisa", "kisa").await.unwrap_err();
        assert!(err.to_string().contains("at least 8"));
        assert_eq!(received(&server).await, 0);
    }

    #[tokio::test]
    async fn test_login_history_reads_entries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/login-history/"))
            .and(header("authorization", "Token token-abcdefghij"))
            .respond_with(json_body(
                200,
                r#"{"success": true, "history": [
                    {"tarih": "2024-06-01T10:15:00.123456+03:00", "ip_adresi": "10.0.0.4",
                     "basarili": true, "hata_mesaji": null, "user_agent": "Mozilla/5.0"},
                    {"tarih": "2024-05-31T08:00:00+03:00", "ip_adresi": "10.0.0.4",
                     "basarili": false, "hata_mesaji": "Hatalı şifre", "user_agent": ""}
                ]}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;
        let (api, session) = setup(&server);
        session
            .set_session("token-abcdefghij", UserProfile::default())
            .unwrap();

        let history = api.login_history().await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(
            history[0].at.date(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
        assert!(history[0].successful);
        assert!(!history[1].successful);
        assert_eq!(history[1].error_message.as_deref(), Some("Hatalı şifre"));
    }

    #[tokio::test]
    async fn test_login_history_needs_a_session() {
        let server = MockServer::start().await;
        let (api, _) = setup(&server);
        assert!(api.login_history().await.unwrap_err().is_unauthorized());
        assert_eq!(received(&server).await, 0);
    }

    #[tokio::test]
    async fn test_login_history_failure_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/login-history/"))
            .respond_with(json_body(
                500,
                r#"{"success": false, "message": "Giriş geçmişi alınamadı"}"#,
            ))
            .mount(&server)
            .await;
        let (api, session) = setup(&server);
        session
            .set_session("token-abcdefghij", UserProfile::default())
            .unwrap();

        let err = api.login_history().await.unwrap_err();
        assert!(err.to_string().contains("Giriş geçmişi alınamadı"));
        assert!(session.token().is_some());
    }
}
