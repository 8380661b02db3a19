//! Map camera.

use crate::query::{format_float, parse_float, QueryParams, UrlState};
use log::debug;

/// Centre of Vanuatu.
pub const DEFAULT_LONGITUDE: f64 = 167.5997;
pub const DEFAULT_LATITUDE: f64 = -16.7087;
pub const DEFAULT_ZOOM: f64 = 6.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Padding {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapViewState {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
    pub padding: Padding,
}

impl Default for MapViewState {
    fn default() -> Self {
        Self {
            longitude: DEFAULT_LONGITUDE,
            latitude: DEFAULT_LATITUDE,
            zoom: DEFAULT_ZOOM,
            pitch: 0.0,
            bearing: 0.0,
            padding: Padding::default(),
        }
    }
}

pub fn valid_longitude(lng: f64) -> bool {
    lng.is_finite() && (-180.0..=180.0).contains(&lng)
}

pub fn valid_latitude(lat: f64) -> bool {
    lat.is_finite() && (-90.0..=90.0).contains(&lat)
}

pub fn valid_zoom(zoom: f64) -> bool {
    zoom.is_finite() && zoom >= 0.0
}

impl MapViewState {
    /// Move the camera. Out-of-domain coordinates are ignored, as is an
    /// invalid zoom.
    pub fn set_camera(&mut self, longitude: f64, latitude: f64, zoom: f64) -> bool {
        if !(valid_longitude(longitude) && valid_latitude(latitude)) {
            debug!("ignoring camera at {longitude},{latitude}");
            return false;
        }
        self.longitude = longitude;
        self.latitude = latitude;
        if valid_zoom(zoom) {
            self.zoom = zoom;
        }
        true
    }
}

impl UrlState for MapViewState {
    const PARAMS: &'static [&'static str] = &["lng", "lat", "zoom"];

    /// A URL without a usable position leaves the camera where it is.
    fn read_query(&mut self, params: &QueryParams) {
        let lng = params.get("lng").and_then(parse_float);
        let lat = params.get("lat").and_then(parse_float);
        if let (Some(lng), Some(lat)) = (lng, lat) {
            let zoom = params
                .get("zoom")
                .and_then(parse_float)
                .unwrap_or(self.zoom);
            self.set_camera(lng, lat, zoom);
        }
    }

    fn write_query(&self, params: &mut QueryParams) {
        params.set("lng", format_float(self.longitude));
        params.set("lat", format_float(self.latitude));
        params.set("zoom", format_float(self.zoom));
    }
}
