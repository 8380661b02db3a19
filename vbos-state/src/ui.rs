//! Drawer visibility.

use crate::query::{parse_flag, QueryParams, UrlState};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    pub time_series_open: bool,
}

impl UiState {
    pub fn toggle_time_series(&mut self) {
        self.time_series_open = !self.time_series_open;
    }

    pub fn set_time_series_open(&mut self, open: bool) {
        self.time_series_open = open;
    }
}

impl UrlState for UiState {
    const PARAMS: &'static [&'static str] = &["timeseries"];

    fn read_query(&mut self, params: &QueryParams) {
        self.time_series_open = parse_flag(params.get("timeseries"));
    }

    fn write_query(&self, params: &mut QueryParams) {
        params.set_or_remove("timeseries", self.time_series_open.then(|| "1".to_string()));
    }
}
