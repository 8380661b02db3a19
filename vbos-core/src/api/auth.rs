//! Login, logout and session restore.

use super::http::{HttpClient, Method, Notice, Transport, UNAUTHORIZED_STATUS};
use crate::error::{ApiError, Result};
use crate::session::AuthUser;
use log::{info, warn};
use serde::Deserialize;
use serde_json::json;

pub const LOGIN_PATH: &str = "/api-token-auth/";
pub const CURRENT_USER_PATH: &str = "/api/v1/users/me/";

const DEFAULT_LOGIN_ERROR: &str = "Invalid username or password";

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Deserialize, Default)]
struct LoginErrorBody {
    #[serde(default)]
    non_field_errors: Vec<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// Message to show for a rejected login: the server's first field-level
/// error, then its `detail`, then a generic message.
pub fn login_error_message(body: &str) -> String {
    let parsed: LoginErrorBody = serde_json::from_str(body).unwrap_or_default();
    parsed
        .non_field_errors
        .into_iter()
        .next()
        .or(parsed.detail)
        .unwrap_or_else(|| DEFAULT_LOGIN_ERROR.to_string())
}

/// What happened when a persisted session was checked at start-up.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SessionRestore {
    /// No token was stored.
    Anonymous,
    /// Token and profile were both cached; nothing to validate.
    Cached(AuthUser),
    /// The token was validated and the profile fetched.
    Validated(AuthUser),
    /// The server rejected the token; the session was cleared.
    Cleared,
    /// Validation failed for another reason; the token was kept.
    Stale,
}

impl<T: Transport> HttpClient<T> {
    /// Exchange credentials for a token, fetch the profile, and persist both.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthUser> {
        let body = json!({ "username": username, "password": password });
        let response = self.send(Method::Post, LOGIN_PATH, None, Some(body)).await?;
        if !response.is_success() {
            return Err(ApiError::Login(login_error_message(&response.body)));
        }
        let TokenResponse { token } = response.json()?;
        let user = self.current_user(&token).await?;
        self.session.set_auth(token, user.clone())?;
        info!("signed in as {}", user.username);
        Ok(user)
    }

    /// Fetch the profile for `token`. A 401 is [`ApiError::Unauthorized`].
    pub async fn current_user(&self, token: &str) -> Result<AuthUser> {
        let response = self
            .send(Method::Get, CURRENT_USER_PATH, Some(token.to_string()), None)
            .await?;
        if response.status == UNAUTHORIZED_STATUS {
            return Err(ApiError::Unauthorized);
        }
        if !response.is_success() {
            return Err(ApiError::Http {
                url: CURRENT_USER_PATH.to_string(),
                status: response.status,
            });
        }
        response.json()
    }

    /// Validate a stored token that has no cached profile.
    ///
    /// Only an unauthorized answer clears the session; any other failure
    /// leaves the token for the next authenticated request to retry.
    pub async fn restore_session(&self) -> Result<SessionRestore> {
        let session = self.session.snapshot();
        let Some(token) = session.token else {
            return Ok(SessionRestore::Anonymous);
        };
        if let Some(user) = session.user {
            return Ok(SessionRestore::Cached(user));
        }
        match self.current_user(&token).await {
            Ok(user) => {
                self.session.set_user(user.clone())?;
                Ok(SessionRestore::Validated(user))
            }
            Err(ApiError::Unauthorized) => {
                self.session.clear()?;
                self.notifier.notify(Notice::SESSION_EXPIRED);
                Ok(SessionRestore::Cleared)
            }
            Err(e) => {
                warn!("could not validate stored session: {}", e);
                Ok(SessionRestore::Stale)
            }
        }
    }

    pub fn logout(&self) -> Result<()> {
        self.session.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeTransport;
    use crate::session::{Session, SessionHandle, SessionStore};

    const USER: &str = r#"{"id": 4, "username": "analyst", "first_name": "Ana",
        "last_name": "Tari", "email": "ana@example.org", "is_staff": false,
        "is_superuser": false, "groups": ["analysts"], "permissions": []}"#;

    #[test]
    fn test_login_error_message() {
        assert_eq!(
            login_error_message(r#"{"non_field_errors": ["Unable to log in."]}"#),
            "Unable to log in."
        );
        assert_eq!(login_error_message(r#"{"detail": "Locked"}"#), "Locked");
        assert_eq!(login_error_message("<html>"), DEFAULT_LOGIN_ERROR);
        assert_eq!(login_error_message("{}"), DEFAULT_LOGIN_ERROR);
    }

    #[tokio::test]
    async fn test_login_persists_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::in_dir(dir.path());
        let transport = FakeTransport::new()
            .route(LOGIN_PATH, 200, r#"{"token": "abc"}"#)
            .route(CURRENT_USER_PATH, 200, USER);
        let client = HttpClient::new(transport.clone(), SessionHandle::load(store.clone()));

        let user = client.login("analyst", "secret").await.unwrap();
        assert_eq!(user.username, "analyst");
        assert_eq!(transport.tokens(), vec![None, Some("abc".to_string())]);
        assert_eq!(
            transport.bodies()[0],
            Some(json!({"username": "analyst", "password": "secret"}))
        );
        assert_eq!(store.load().token.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_login_failure_surfaces_server_message() {
        let transport = FakeTransport::new().route(
            LOGIN_PATH,
            400,
            r#"{"non_field_errors": ["Unable to log in with provided credentials."]}"#,
        );
        let client = HttpClient::new(transport, SessionHandle::default());
        let err = client.login("a", "b").await.unwrap_err();
        assert_eq!(err.to_string(), "Unable to log in with provided credentials.");
        assert!(!client.session().snapshot().is_authenticated());
    }

    #[tokio::test]
    async fn test_restore_unauthorized_clears_persisted_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::in_dir(dir.path());
        store
            .save(&Session {
                token: Some("expired".to_string()),
                user: None,
            })
            .unwrap();
        let transport = FakeTransport::new().route(CURRENT_USER_PATH, 401, "{}");
        let client = HttpClient::new(transport, SessionHandle::load(store.clone()));

        let outcome = client.restore_session().await.unwrap();
        assert_eq!(outcome, SessionRestore::Cleared);
        assert_eq!(client.session().snapshot(), Session::default());
        assert_eq!(store.load(), Session::default());
    }

    #[tokio::test]
    async fn test_restore_other_failure_keeps_token() {
        let transport = FakeTransport::new().route(CURRENT_USER_PATH, 500, "");
        let session = SessionHandle::in_memory(Session {
            token: Some("tok".to_string()),
            user: None,
        });
        let client = HttpClient::new(transport, session);
        assert_eq!(client.restore_session().await.unwrap(), SessionRestore::Stale);
        assert_eq!(client.session().token().as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn test_restore_validates_and_caches_user() {
        let transport = FakeTransport::new().route(CURRENT_USER_PATH, 200, USER);
        let session = SessionHandle::in_memory(Session {
            token: Some("tok".to_string()),
            user: None,
        });
        let client = HttpClient::new(transport.clone(), session);
        let outcome = client.restore_session().await.unwrap();
        assert!(matches!(outcome, SessionRestore::Validated(ref u) if u.username == "analyst"));
        assert!(matches!(
            client.restore_session().await.unwrap(),
            SessionRestore::Cached(_)
        ));
        assert_eq!(transport.paths().len(), 1);
    }

    #[tokio::test]
    async fn test_restore_without_token_is_anonymous() {
        let client = HttpClient::new(FakeTransport::new(), SessionHandle::default());
        assert_eq!(client.restore_session().await.unwrap(), SessionRestore::Anonymous);
    }
}
