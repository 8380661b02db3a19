//! Authenticated HTTP plumbing shared by every endpoint.

use crate::error::{ApiError, Result};
use crate::page::DATA_PAGE_SIZE;
use crate::session::SessionHandle;
use log::{debug, error, warn};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Status some proxies and the service worker use to report no connectivity.
pub const OFFLINE_STATUS: u16 = 599;

pub const UNAUTHORIZED_STATUS: u16 = 401;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Method {
    Get,
    Post,
}

/// A request relative to the API host.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub token: Option<String>,
    pub body: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<D: DeserializeOwned>(&self) -> Result<D> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Sends a request and returns the raw status and body.
///
/// Connectivity failures must come back as [`ApiError::Offline`].
pub trait Transport: Send + Sync {
    fn send(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse>> + Send;
}

/// `reqwest`-backed transport rooted at the API host.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };
        builder = builder.header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(token) = &request.token {
            builder = builder.header(reqwest::header::AUTHORIZATION, format!("Token {token}"));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        let response = match builder.send().await {
            Ok(r) => r,
            Err(e) if e.is_connect() || e.is_timeout() => {
                debug!("transport failure for {}: {}", url, e);
                return Err(ApiError::Offline);
            }
            Err(e) => return Err(e.into()),
        };
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum NoticeLevel {
    Warning,
    Error,
}

/// A user-facing, dismissible notification.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: &'static str,
    pub message: &'static str,
}

impl Notice {
    pub const OFFLINE: Notice = Notice {
        level: NoticeLevel::Error,
        title: "You're offline",
        message: "Please check your connection and try again.",
    };

    pub const SESSION_EXPIRED: Notice = Notice {
        level: NoticeLevel::Warning,
        title: "Session expired",
        message: "Please sign in again.",
    };
}

/// Receives notices raised by the client.
pub trait Notify: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Routes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notify for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Warning => warn!("{}: {}", notice.title, notice.message),
            NoticeLevel::Error => error!("{}: {}", notice.title, notice.message),
        }
    }
}

/// API client: attaches the session token, reacts to expired sessions and
/// lost connectivity, and decodes JSON bodies.
#[derive(Clone)]
pub struct HttpClient<T = ReqwestTransport> {
    pub(crate) transport: T,
    pub(crate) session: SessionHandle,
    pub(crate) notifier: Arc<dyn Notify>,
    pub(crate) page_size: usize,
}

impl<T: Transport> HttpClient<T> {
    pub fn new(transport: T, session: SessionHandle) -> Self {
        Self {
            transport,
            session,
            notifier: Arc::new(LogNotifier),
            page_size: DATA_PAGE_SIZE,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notify>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Send with an explicit token; only connectivity is handled here.
    pub(crate) async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<String>,
        body: Option<serde_json::Value>,
    ) -> Result<HttpResponse> {
        let request = HttpRequest {
            method,
            path: path.to_string(),
            token,
            body,
        };
        let response = match self.transport.send(request).await {
            Err(ApiError::Offline) => {
                self.notifier.notify(Notice::OFFLINE);
                return Err(ApiError::Offline);
            }
            other => other?,
        };
        if response.status == OFFLINE_STATUS {
            self.notifier.notify(Notice::OFFLINE);
            return Err(ApiError::Offline);
        }
        Ok(response)
    }

    /// Send with the session token. A 401 clears the session.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<HttpResponse> {
        let response = self.send(method, path, self.session.token(), body).await?;
        if response.status == UNAUTHORIZED_STATUS {
            if let Err(e) = self.session.clear() {
                warn!("failed to clear expired session: {}", e);
            }
            self.notifier.notify(Notice::SESSION_EXPIRED);
        }
        Ok(response)
    }

    pub async fn get(&self, path: &str) -> Result<HttpResponse> {
        self.request(Method::Get, path, None).await
    }

    pub async fn post(&self, path: &str, body: serde_json::Value) -> Result<HttpResponse> {
        self.request(Method::Post, path, Some(body)).await
    }

    /// GET and decode; any non-success status is an error naming the path.
    pub async fn get_json<D: DeserializeOwned>(&self, path: &str) -> Result<D> {
        let response = self.get(path).await?;
        if response.status == UNAUTHORIZED_STATUS {
            return Err(ApiError::Unauthorized);
        }
        if !response.is_success() {
            return Err(ApiError::Http {
                url: path.to_string(),
                status: response.status,
            });
        }
        response.json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{FakeTransport, RecordingNotifier};
    use crate::session::{AuthUser, Session};

    fn signed_in() -> SessionHandle {
        SessionHandle::in_memory(Session {
            token: Some("tok".to_string()),
            user: Some(AuthUser::default()),
        })
    }

    #[tokio::test]
    async fn test_token_attached() {
        let transport = FakeTransport::new().route("/api/v1/cluster/", 200, "{}");
        let client = HttpClient::new(transport.clone(), signed_in());
        client.get("/api/v1/cluster/").await.unwrap();
        assert_eq!(transport.tokens(), vec![Some("tok".to_string())]);
    }

    #[tokio::test]
    async fn test_unauthorized_clears_session() {
        let transport = FakeTransport::new().route("/api/v1/cluster/", 401, "{}");
        let notifier = Arc::new(RecordingNotifier::default());
        let client = HttpClient::new(transport, signed_in()).with_notifier(notifier.clone());
        let err = client
            .get_json::<serde_json::Value>("/api/v1/cluster/")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
        assert_eq!(client.session().snapshot(), Session::default());
        assert_eq!(notifier.notices(), vec![Notice::SESSION_EXPIRED]);
    }

    #[tokio::test]
    async fn test_offline_status_raises_notice() {
        let transport = FakeTransport::new().route("/api/v1/cluster/", OFFLINE_STATUS, "");
        let notifier = Arc::new(RecordingNotifier::default());
        let client = HttpClient::new(transport, signed_in()).with_notifier(notifier.clone());
        let err = client.get("/api/v1/cluster/").await.unwrap_err();
        assert!(matches!(err, ApiError::Offline));
        assert_eq!(notifier.notices(), vec![Notice::OFFLINE]);
        assert!(client.session().snapshot().is_authenticated());
    }

    #[tokio::test]
    async fn test_connection_failure_raises_offline_notice() {
        let notifier = Arc::new(RecordingNotifier::default());
        let client =
            HttpClient::new(FakeTransport::new(), signed_in()).with_notifier(notifier.clone());
        assert!(matches!(
            client.get("/nowhere/").await.unwrap_err(),
            ApiError::Offline
        ));
        assert_eq!(notifier.notices(), vec![Notice::OFFLINE]);
        assert!(client.session().snapshot().is_authenticated());
    }

    #[tokio::test]
    async fn test_non_success_names_path() {
        let transport = FakeTransport::new().route("/api/v1/x/", 500, "boom");
        let client = HttpClient::new(transport, signed_in());
        let err = client
            .get_json::<serde_json::Value>("/api/v1/x/")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Unable to fetch data from /api/v1/x/ (status 500)");
    }
}
