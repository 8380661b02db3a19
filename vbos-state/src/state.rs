//! Application state shared by the dashboard views.
//!
//! `AppState` bundles every store into a single struct that is created once
//! and passed explicitly to whatever needs it. Cloning it is cheap and the
//! clones share the same stores.

use crate::area::AreaState;
use crate::date::DateState;
use crate::layer::LayerState;
use crate::map::MapViewState;
use crate::query::{QueryParams, UrlState};
use crate::slot::DataSlot;
use crate::store::Store;
use crate::ui::UiState;
use geojson::FeatureCollection;
use vbos_core::{ClusterDatasets, TabularRow};
use vbos_data::{AreaStats, AreaStatsCache, StatsKey};

#[derive(Clone, Default)]
pub struct AppState {
    /// Selected province and area council
    pub area: Store<AreaState>,
    /// Selected year and month
    pub date: Store<DateState>,
    /// Active layers and their opacity
    pub layers: Store<LayerState>,
    /// Map camera
    pub map: Store<MapViewState>,
    /// Drawers and panels
    pub ui: Store<UiState>,
    /// Catalog of the selected cluster
    pub datasets: Store<DataSlot<Vec<ClusterDatasets>>>,
    /// Rows of the active tabular layer
    pub tabular: Store<DataSlot<Vec<TabularRow>>>,
    /// Boundaries at the current granularity
    pub boundaries: Store<DataSlot<FeatureCollection>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring every view store in line with `params`.
    pub fn read_query(&self, params: &QueryParams) {
        self.area.update(|s| s.read_query(params));
        self.date.update(|s| s.read_query(params));
        self.layers.update(|s| s.read_query(params));
        self.map.update(|s| s.read_query(params));
        self.ui.update(|s| s.read_query(params));
    }

    /// Write every view store into `params`.
    pub fn write_query(&self, params: &mut QueryParams) {
        self.area.with(|s| s.write_query(params));
        self.date.with(|s| s.write_query(params));
        self.layers.with(|s| s.write_query(params));
        self.map.with(|s| s.write_query(params));
        self.ui.with(|s| s.write_query(params));
    }

    /// The key the choropleth for the current selection is cached under.
    pub fn stats_key(&self) -> StatsKey {
        StatsKey {
            year: self.date.with(DateState::year_key),
            granularity: self.area.with(AreaState::granularity),
            data_version: self.tabular.with(DataSlot::version),
            features_version: self.boundaries.with(DataSlot::version),
        }
    }

    /// Choropleth values for the current selection, once both rows and
    /// boundaries have arrived.
    pub fn area_stats(&self, cache: &mut AreaStatsCache) -> Option<AreaStats> {
        let key = self.stats_key();
        self.tabular.with(|rows| {
            self.boundaries.with(|features| {
                let (rows, features) = (rows.value()?, features.value()?);
                Some(cache.get_or_compute(key, features, rows).clone())
            })
        })
    }
}
