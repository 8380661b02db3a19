//! Derived statistics for VBOS tabular data.
//!
//! This crate turns raw tabular rows into the shapes the dashboard draws:
//! per-region values and ranges for the choropleth, and consolidated series
//! for the time-series and per-place charts. Everything here is a pure
//! function of its inputs and recomputes from scratch.

pub mod area;
pub mod series;
pub mod stats;

pub use area::{normalize_name, Granularity};
pub use series::{
    attributes, consolidate_stats, consolidate_time_series, has_monthly_variation, PeriodMode,
    PlaceStats, SeriesPoint,
};
pub use stats::{compute_area_stats, AreaStats, AreaStatsCache, StatsKey};

/// Choropleth fill shading.
pub mod choropleth {
    /// Fill opacity at the bottom of the value range.
    pub const MIN_FILL_OPACITY: f64 = 0.1;

    /// Fill opacity at the top of the value range.
    pub const MAX_FILL_OPACITY: f64 = 1.0;

    /// Fill opacity for `value` on a linear ramp from `min` to `max`, scaled
    /// by the layer's opacity percentage (0-100).
    ///
    /// Features without a value get no fill. A range collapsed to one
    /// non-zero value shades at full strength.
    pub fn fill_opacity(value: Option<f64>, min: f64, max: f64, layer_opacity: u8) -> Option<f64> {
        let value = value.filter(|v| v.is_finite())?;
        let ramp = if max > min {
            let t = ((value - min) / (max - min)).clamp(0.0, 1.0);
            MIN_FILL_OPACITY + t * (MAX_FILL_OPACITY - MIN_FILL_OPACITY)
        } else {
            MAX_FILL_OPACITY
        };
        Some(ramp * (f64::from(layer_opacity.min(100)) / 100.0))
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn approx(actual: Option<f64>, expected: f64) -> bool {
            actual.is_some_and(|a| (a - expected).abs() < 1e-9)
        }

        #[test]
        fn test_ramp_endpoints() {
            assert!(approx(fill_opacity(Some(5.0), 5.0, 22.0, 100), MIN_FILL_OPACITY));
            assert!(approx(fill_opacity(Some(22.0), 5.0, 22.0, 100), MAX_FILL_OPACITY));
            assert!(approx(fill_opacity(Some(13.5), 5.0, 22.0, 100), 0.55));
            assert!(approx(fill_opacity(Some(-1.0), 5.0, 22.0, 100), MIN_FILL_OPACITY));
        }

        #[test]
        fn test_layer_opacity_scales() {
            assert!(approx(fill_opacity(Some(22.0), 5.0, 22.0, 50), 0.5));
            assert!(approx(fill_opacity(Some(22.0), 5.0, 22.0, 0), 0.0));
        }

        #[test]
        fn test_missing_and_degenerate() {
            assert_eq!(fill_opacity(None, 0.0, 1.0, 100), None);
            assert_eq!(fill_opacity(Some(f64::NAN), 0.0, 1.0, 100), None);
            assert_eq!(fill_opacity(Some(7.0), 7.0, 7.0, 100), Some(MAX_FILL_OPACITY));
        }
    }
}
