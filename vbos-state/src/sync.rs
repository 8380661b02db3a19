//! Keeping the stores and the address bar in step.
//!
//! Reading is URL → stores, on mount and whenever the user navigates
//! through history. Writing is stores → URL, and only happens when a view
//! commits explicitly; store mutations alone never touch the URL.

use crate::query::{QueryParams, UrlState};
use crate::state::AppState;
use crate::store::Store;
use log::debug;

/// Browser-style session history of query strings.
pub trait History {
    /// The current entry's query string.
    fn search(&self) -> String;

    /// Add a new entry and move to it, dropping any forward entries.
    fn push(&mut self, search: String);

    /// Overwrite the current entry.
    fn replace(&mut self, search: String);

    /// Step back; returns false at the oldest entry.
    fn back(&mut self) -> bool;

    /// Step forward; returns false at the newest entry.
    fn forward(&mut self) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryHistory {
    entries: Vec<String>,
    index: usize,
}

impl MemoryHistory {
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            entries: vec![search.into()],
            index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("")
    }
}

impl History for MemoryHistory {
    fn search(&self) -> String {
        self.entries[self.index].clone()
    }

    fn push(&mut self, search: String) {
        self.entries.truncate(self.index + 1);
        self.entries.push(search);
        self.index += 1;
    }

    fn replace(&mut self, search: String) {
        self.entries[self.index] = search;
    }

    fn back(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    fn forward(&mut self) -> bool {
        if self.index + 1 >= self.entries.len() {
            return false;
        }
        self.index += 1;
        true
    }
}

pub struct UrlSynchronizer<H> {
    state: AppState,
    history: H,
}

impl<H: History> UrlSynchronizer<H> {
    pub fn new(state: AppState, history: H) -> Self {
        Self { state, history }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    fn current_params(&self) -> QueryParams {
        QueryParams::parse(&self.history.search())
    }

    fn sync_from_url(&self) {
        let params = self.current_params();
        debug!("syncing stores from {:?}", params.to_search());
        self.state.read_query(&params);
    }

    /// Initial load.
    pub fn mount(&self) {
        self.sync_from_url();
    }

    /// History navigation landed on a different entry.
    pub fn on_pop_state(&self) {
        self.sync_from_url();
    }

    pub fn back(&mut self) -> bool {
        let moved = self.history.back();
        if moved {
            self.on_pop_state();
        }
        moved
    }

    pub fn forward(&mut self) -> bool {
        let moved = self.history.forward();
        if moved {
            self.on_pop_state();
        }
        moved
    }

    /// Record the camera without adding a history entry.
    pub fn commit_map_view(&mut self) {
        let mut params = self.current_params();
        self.state.map.with(|m| m.write_query(&mut params));
        self.history.replace(params.to_search());
    }

    /// Record one store's state as a new history entry.
    pub fn commit<S>(&mut self, store: &Store<S>)
    where
        S: UrlState + Clone + PartialEq,
    {
        let mut params = self.current_params();
        store.with(|s| s.write_query(&mut params));
        let search = params.to_search();
        if search != self.history.search() {
            self.history.push(search);
        }
    }

    /// Record every store as a new history entry.
    pub fn commit_all(&mut self) {
        let mut params = self.current_params();
        self.state.write_query(&mut params);
        let search = params.to_search();
        if search != self.history.search() {
            self.history.push(search);
        }
    }

    /// Shareable link for the current view under `base`.
    pub fn share_link(&self, base: &str) -> String {
        let mut params = self.current_params();
        self.state.write_query(&mut params);
        format!("{}{}", base, params.to_search())
    }
}
