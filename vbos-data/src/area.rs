//! Matching tabular rows to administrative areas.

use serde::{Deserialize, Serialize};
use vbos_core::TabularRow;

/// Administrative level rows are aggregated at.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Province,
    AreaCouncil,
}

impl Granularity {
    /// Provinces are compared until one is selected; then its area councils.
    pub fn for_selection(province: Option<&str>) -> Self {
        match province {
            Some(p) if !p.trim().is_empty() => Granularity::AreaCouncil,
            _ => Granularity::Province,
        }
    }

    /// The row's area name at this level.
    pub fn area_of<'a>(&self, row: &'a TabularRow) -> Option<&'a str> {
        match self {
            Granularity::Province => row.province.as_deref(),
            Granularity::AreaCouncil => row.area_council.as_deref(),
        }
    }
}

/// Canonical form for comparing area names from boundary layers and rows.
///
/// Boundary layers upper-case province names while rows use title case, so
/// every comparison at every level goes through this.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}

pub fn same_area(a: &str, b: &str) -> bool {
    normalize_name(a) == normalize_name(b)
}

/// Sum of the values of rows whose area at `granularity` is `name`.
/// `None` when no row matches.
pub fn region_value(rows: &[&TabularRow], name: &str, granularity: Granularity) -> Option<f64> {
    let target = normalize_name(name);
    rows.iter()
        .filter(|row| {
            granularity
                .area_of(row)
                .is_some_and(|area| normalize_name(area) == target)
        })
        .map(|row| row.value)
        .fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}
