//! View state for the VBOS dashboard.
//!
//! This crate provides:
//! - `store`: observable containers with subscribe/notify
//! - `area`, `date`, `layer`, `map`, `ui`: the view stores and their URL parameters
//! - `slot`: generation-tagged holders for fetched data
//! - `state`: `AppState`, bundling every store into one explicitly passed value
//! - `sync`: URL synchronization over a browser-style history

pub mod area;
pub mod date;
pub mod layer;
pub mod map;
pub mod query;
pub mod slot;
pub mod state;
pub mod store;
pub mod sync;
pub mod ui;

pub use area::AreaState;
pub use date::DateState;
pub use layer::LayerState;
pub use map::MapViewState;
pub use query::{QueryParams, UrlState};
pub use slot::{DataSlot, Ticket};
pub use state::AppState;
pub use store::{Store, SubscriptionId};
pub use sync::{History, MemoryHistory, UrlSynchronizer};
pub use ui::UiState;
