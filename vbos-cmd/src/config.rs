//! Options shared by every command.

use anyhow::Context;
use clap::Args;
use directories::ProjectDirs;
use std::path::PathBuf;
use std::time::Duration;
use vbos_core::api::{HttpClient, ReqwestTransport};
use vbos_core::page::DATA_PAGE_SIZE;
use vbos_core::{SessionHandle, SessionStore};

pub const DEFAULT_API_HOST: &str = "http://localhost:8000";

#[derive(Args, Debug, Clone)]
pub struct Config {
    /// Base URL of the VBOS API
    #[arg(long, env = "VBOS_API_HOST", default_value = DEFAULT_API_HOST, global = true)]
    pub api_host: String,

    /// Where the login session is kept (defaults to the user data directory)
    #[arg(long, env = "VBOS_SESSION_FILE", global = true)]
    pub session_file: Option<PathBuf>,

    /// Records requested per page from data endpoints
    #[arg(long, default_value_t = DATA_PAGE_SIZE, global = true)]
    pub page_size: usize,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 60, global = true)]
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_string(),
            session_file: None,
            page_size: DATA_PAGE_SIZE,
            timeout_secs: 60,
        }
    }
}

impl Config {
    pub fn session_store(&self) -> anyhow::Result<SessionStore> {
        if let Some(path) = &self.session_file {
            return Ok(SessionStore::at(path));
        }
        let dirs = ProjectDirs::from("vu", "VBOS", "vbos")
            .context("could not determine a data directory for the session file")?;
        Ok(SessionStore::in_dir(dirs.data_dir()))
    }

    /// Client over HTTP with the persisted session loaded.
    pub fn client(&self) -> anyhow::Result<HttpClient> {
        let transport =
            ReqwestTransport::new(&self.api_host, Duration::from_secs(self.timeout_secs))?;
        let session = SessionHandle::load(self.session_store()?);
        Ok(HttpClient::new(transport, session).with_page_size(self.page_size.max(1)))
    }
}
