//! Data model and API client for the VBOS disaster-risk dashboard.
//!
//! The crate root holds the wire types shared by every other crate:
//! dataset catalogs, tabular rows, paginated envelopes, request filters and
//! the persisted session. The `api` feature adds the async HTTP client.

pub mod dataset;
pub mod error;
pub mod filters;
pub mod page;
pub mod session;
pub mod tabular;

#[cfg(feature = "api")]
pub mod api;

pub use dataset::{Cluster, ClusterDatasets, DataType, Dataset, LayerId};
pub use error::{ApiError, Result};
pub use filters::DataFilters;
pub use page::{FeaturePage, Page, Paginated};
pub use session::{AuthUser, Session, SessionHandle, SessionStore};
pub use tabular::TabularRow;
