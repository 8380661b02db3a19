//! Active map layers and their opacity.

use crate::query::{QueryParams, UrlState};
use log::debug;
use std::collections::BTreeMap;
use vbos_core::{Dataset, LayerId};

/// Opacity percentage for layers that were never adjusted.
pub const DEFAULT_OPACITY: u8 = 100;

/// Ordered, duplicate-free set of active layers. At most one tabular layer is
/// active at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerState {
    layers: Vec<LayerId>,
    opacity: BTreeMap<LayerId, u8>,
}

impl LayerState {
    pub fn layers(&self) -> &[LayerId] {
        &self.layers
    }

    pub fn is_active(&self, layer: LayerId) -> bool {
        self.layers.contains(&layer)
    }

    /// The tabular layer driving the choropleth, if any.
    pub fn active_tabular(&self) -> Option<LayerId> {
        self.layers.iter().copied().find(LayerId::is_tabular)
    }

    /// Activating a tabular layer replaces the current one.
    pub fn activate(&mut self, layer: LayerId) {
        if self.is_active(layer) {
            return;
        }
        if layer.is_tabular() {
            if let Some(previous) = self.active_tabular() {
                debug!("{layer} replaces tabular layer {previous}");
                self.deactivate(previous);
            }
        }
        self.layers.push(layer);
    }

    pub fn deactivate(&mut self, layer: LayerId) {
        self.layers.retain(|l| *l != layer);
        self.opacity.remove(&layer);
    }

    /// Returns whether the layer is active afterwards.
    pub fn toggle(&mut self, layer: LayerId) -> bool {
        if self.is_active(layer) {
            self.deactivate(layer);
            false
        } else {
            self.activate(layer);
            true
        }
    }

    pub fn clear(&mut self) {
        self.layers.clear();
        self.opacity.clear();
    }

    pub fn opacity(&self, layer: LayerId) -> u8 {
        self.opacity.get(&layer).copied().unwrap_or(DEFAULT_OPACITY)
    }

    /// Percentages above 100 are clamped.
    pub fn set_opacity(&mut self, layer: LayerId, percent: u8) {
        self.opacity.insert(layer, percent.min(100));
    }

    /// How many of `datasets` are currently on the map.
    pub fn active_count(&self, datasets: &[Dataset]) -> usize {
        datasets
            .iter()
            .filter(|d| self.is_active(d.layer_id()))
            .count()
    }

    /// Parse a comma-joined layer list. Unknown ids and repeats are skipped;
    /// the first tabular layer wins.
    pub fn parse_layers(raw: &str) -> Vec<LayerId> {
        let mut layers: Vec<LayerId> = Vec::new();
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let Ok(layer) = part.parse::<LayerId>() else {
                debug!("skipping layer {part:?}");
                continue;
            };
            let tabular_taken = layer.is_tabular() && layers.iter().any(LayerId::is_tabular);
            if !tabular_taken && !layers.contains(&layer) {
                layers.push(layer);
            }
        }
        layers
    }

    pub fn layers_param(&self) -> Option<String> {
        if self.layers.is_empty() {
            return None;
        }
        let ids: Vec<String> = self.layers.iter().map(LayerId::to_string).collect();
        Some(ids.join(","))
    }
}

impl UrlState for LayerState {
    const PARAMS: &'static [&'static str] = &["layers"];

    fn read_query(&mut self, params: &QueryParams) {
        self.layers = params
            .get("layers")
            .map(Self::parse_layers)
            .unwrap_or_default();
        let layers = &self.layers;
        self.opacity.retain(|layer, _| layers.contains(layer));
    }

    fn write_query(&self, params: &mut QueryParams) {
        params.set_or_remove("layers", self.layers_param());
    }
}
