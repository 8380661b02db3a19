//! Per-region values and their range for choropleth shading.

use crate::area::{region_value, Granularity};
use geojson::FeatureCollection;
use log::debug;
use serde_json::Value;
use vbos_core::TabularRow;

/// Property every annotated feature carries.
pub const VALUE_PROPERTY: &str = "value";

/// Property boundary features are matched on.
pub const NAME_PROPERTY: &str = "name";

/// Annotated boundaries plus the range of their values.
///
/// `min_value == max_value == 0.0` means no feature received a value; the
/// choropleth should be hidden rather than drawn as a single-value range.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaStats {
    pub features: FeatureCollection,
    pub min_value: f64,
    pub max_value: f64,
}

impl AreaStats {
    fn empty(features: FeatureCollection) -> Self {
        Self {
            features,
            min_value: 0.0,
            max_value: 0.0,
        }
    }

    pub fn has_choropleth(&self) -> bool {
        !self.features.features.is_empty() && !(self.min_value == 0.0 && self.max_value == 0.0)
    }

    /// `(name, value)` for each feature, in feature order.
    pub fn values(&self) -> Vec<(String, Option<f64>)> {
        self.features
            .features
            .iter()
            .map(|f| {
                let name = f
                    .property(NAME_PROPERTY)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let value = f.property(VALUE_PROPERTY).and_then(Value::as_f64);
                (name, value)
            })
            .collect()
    }
}

/// Rows whose date starts with `year`. An empty `year` keeps every dated row.
pub fn rows_for_year<'a>(rows: &'a [TabularRow], year: &str) -> Vec<&'a TabularRow> {
    rows.iter()
        .filter(|row| row.date_str().is_some_and(|d| d.starts_with(year)))
        .collect()
}

/// Annotate each boundary feature with the summed value of the rows for its
/// area in `year`, and find the range of those values.
///
/// The input collection is left untouched.
pub fn compute_area_stats(
    features: &FeatureCollection,
    rows: &[TabularRow],
    year: &str,
    granularity: Granularity,
) -> AreaStats {
    let mut annotated = features.clone();
    if annotated.features.is_empty() {
        return AreaStats::empty(annotated);
    }

    let filtered = rows_for_year(rows, year);
    let mut values = Vec::with_capacity(annotated.features.len());
    for feature in annotated.features.iter_mut() {
        let value = feature
            .property(NAME_PROPERTY)
            .and_then(Value::as_str)
            .and_then(|name| region_value(&filtered, name, granularity))
            .filter(|v| v.is_finite());
        match value {
            Some(v) => {
                feature.set_property(VALUE_PROPERTY, v);
                values.push(v);
            }
            None => feature.set_property(VALUE_PROPERTY, Value::Null),
        }
    }

    debug!(
        "area stats for year {:?} at {:?}: {} of {} features have values",
        year,
        granularity,
        values.len(),
        annotated.features.len()
    );

    if values.is_empty() {
        return AreaStats::empty(annotated);
    }
    values.sort_by(f64::total_cmp);
    AreaStats {
        features: annotated,
        min_value: values[0],
        max_value: values[values.len() - 1],
    }
}

/// Inputs that determine an [`AreaStats`] result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsKey {
    pub year: String,
    pub granularity: Granularity,
    /// Bumped whenever the tabular rows are replaced.
    pub data_version: u64,
    /// Bumped whenever the boundary features are replaced.
    pub features_version: u64,
}

/// Holds the most recent result and serves it again while the key matches.
#[derive(Debug, Default)]
pub struct AreaStatsCache {
    entry: Option<(StatsKey, AreaStats)>,
}

impl AreaStatsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute(
        &mut self,
        key: StatsKey,
        features: &FeatureCollection,
        rows: &[TabularRow],
    ) -> &AreaStats {
        if matches!(&self.entry, Some((cached, _)) if *cached != key) {
            self.entry = None;
        }
        let (_, stats) = self.entry.get_or_insert_with(|| {
            let stats = compute_area_stats(features, rows, &key.year, key.granularity);
            (key, stats)
        });
        stats
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}
