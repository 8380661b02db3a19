//! In-memory transport and notifier for exercising the client in tests.

use super::http::{HttpRequest, HttpResponse, Notice, Notify, Transport};
use crate::error::{ApiError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

#[derive(Clone, Default)]
pub(crate) struct FakeTransport {
    routes: Arc<Mutex<HashMap<String, (u16, String)>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
    cancel_on: Arc<Mutex<Option<(String, CancellationToken)>>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Answer `path` (including its query string) with `status` and `body`.
    pub(crate) fn route(self, path: &str, status: u16, body: &str) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, body.to_string()));
        self
    }

    /// Cancel `token` while answering `path`, as a user interrupting
    /// between pages would.
    pub(crate) fn cancel_on(self, path: &str, token: &CancellationToken) -> Self {
        *self.cancel_on.lock().unwrap() = Some((path.to_string(), token.clone()));
        self
    }

    pub(crate) fn paths(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.path.clone())
            .collect()
    }

    pub(crate) fn tokens(&self) -> Vec<Option<String>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.token.clone())
            .collect()
    }

    pub(crate) fn bodies(&self) -> Vec<Option<serde_json::Value>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.body.clone())
            .collect()
    }
}

impl Transport for FakeTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let route = self.routes.lock().unwrap().get(&request.path).cloned();
        if let Some((path, token)) = self.cancel_on.lock().unwrap().as_ref() {
            if *path == request.path {
                token.cancel();
            }
        }
        self.requests.lock().unwrap().push(request);
        match route {
            Some((status, body)) => Ok(HttpResponse { status, body }),
            None => Err(ApiError::Offline),
        }
    }
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub(crate) fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notify for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}
