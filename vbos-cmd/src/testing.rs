//! Canned API answers for exercising commands without a server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use vbos_core::api::http::{HttpRequest, HttpResponse};
use vbos_core::api::{HttpClient, Transport};
use vbos_core::{ApiError, Session, SessionHandle};

#[derive(Clone, Default)]
pub(crate) struct FakeApi {
    routes: Arc<Mutex<HashMap<String, (u16, String)>>>,
    paths: Arc<Mutex<Vec<String>>>,
}

impl FakeApi {
    pub(crate) fn route(self, path: &str, status: u16, body: &str) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, body.to_string()));
        self
    }

    pub(crate) fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }

    pub(crate) fn client(&self, session: Session) -> HttpClient<FakeApi> {
        HttpClient::new(self.clone(), SessionHandle::in_memory(session))
    }
}

impl Transport for FakeApi {
    async fn send(&self, request: HttpRequest) -> vbos_core::Result<HttpResponse> {
        self.paths.lock().unwrap().push(request.path.clone());
        match self.routes.lock().unwrap().get(&request.path).cloned() {
            Some((status, body)) => Ok(HttpResponse { status, body }),
            None => Err(ApiError::Offline),
        }
    }
}
