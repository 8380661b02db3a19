//! Async client for the VBOS REST API.
//!
//! Only built with the `api` feature; the data model in the crate root is
//! usable without it.

pub mod auth;
pub mod fetch;
pub mod http;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::SessionRestore;
pub use fetch::{DataKind, DatasetData};
pub use http::{HttpClient, LogNotifier, Notice, NoticeLevel, Notify, ReqwestTransport, Transport};
pub use tokio_util::sync::CancellationToken;
