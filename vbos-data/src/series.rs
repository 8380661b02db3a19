//! Consolidating tabular rows into chart series, by period or by place.
//!
//! Both consolidations use the same reducer: every row adds its value to the
//! total for its attribute.

use crate::area::{normalize_name, Granularity};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use vbos_core::TabularRow;
use vbos_utils::dates::{month_key, year_key};

/// Attribute totals for one period (`YYYY` or `YYYY-MM`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub period: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

/// Attribute totals for one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceStats {
    pub place: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

/// Time axis granularity for the time-series chart.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodMode {
    Annual,
    Monthly,
}

impl PeriodMode {
    /// Monthly only when asked for and the rows actually vary by month.
    pub fn resolve(rows: &[TabularRow], monthly_requested: bool) -> Self {
        if monthly_requested && has_monthly_variation(rows) {
            PeriodMode::Monthly
        } else {
            PeriodMode::Annual
        }
    }

    fn key<'a>(&self, date: &'a str) -> Option<&'a str> {
        match self {
            PeriodMode::Annual => year_key(date),
            PeriodMode::Monthly => month_key(date),
        }
    }
}

fn add(values: &mut BTreeMap<String, f64>, row: &TabularRow) {
    let (attribute, value) = row.entry();
    *values.entry(attribute.to_string()).or_insert(0.0) += value;
}

/// Distinct attribute names, in the order they first appear.
pub fn attributes(rows: &[TabularRow]) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .map(TabularRow::attribute_name)
        .filter(|a| seen.insert(*a))
        .map(str::to_string)
        .collect()
}

/// True when some year holds rows for at least two distinct months.
pub fn has_monthly_variation(rows: &[TabularRow]) -> bool {
    let mut months_by_year: HashMap<&str, HashSet<&str>> = HashMap::new();
    for date in rows.iter().filter_map(TabularRow::date_str) {
        let Some(month) = month_key(date) else {
            continue;
        };
        let months = months_by_year.entry(&month[..4]).or_default();
        months.insert(month);
        if months.len() >= 2 {
            return true;
        }
    }
    false
}

/// Attribute totals per period, oldest period first.
///
/// Rows without a usable date for the chosen granularity are skipped.
pub fn consolidate_time_series(rows: &[TabularRow], use_monthly: bool) -> Vec<SeriesPoint> {
    let mode = if use_monthly {
        PeriodMode::Monthly
    } else {
        PeriodMode::Annual
    };
    let mut periods: BTreeMap<&str, BTreeMap<String, f64>> = BTreeMap::new();
    for row in rows {
        let Some(period) = row.date_str().and_then(|d| mode.key(d)) else {
            continue;
        };
        add(periods.entry(period).or_default(), row);
    }
    periods
        .into_iter()
        .map(|(period, values)| SeriesPoint {
            period: period.to_string(),
            values,
        })
        .collect()
}

/// Attribute totals per place at `granularity`, places in first-seen order.
///
/// Places are grouped by normalized name and labelled with the first
/// spelling seen. Rows without a place at that level are skipped.
pub fn consolidate_stats(rows: &[TabularRow], granularity: Granularity) -> Vec<PlaceStats> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut places: Vec<PlaceStats> = Vec::new();
    for row in rows {
        let Some(place) = granularity.area_of(row).filter(|p| !p.trim().is_empty()) else {
            continue;
        };
        let slot = *index.entry(normalize_name(place)).or_insert_with(|| {
            places.push(PlaceStats {
                place: place.to_string(),
                values: BTreeMap::new(),
            });
            places.len() - 1
        });
        add(&mut places[slot].values, row);
    }
    places
}
