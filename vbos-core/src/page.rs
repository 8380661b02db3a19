//! Paginated response envelopes and cursor handling.

use crate::error::{ApiError, Result};
use geojson::{Feature, FeatureCollection};
use serde::{Deserialize, Serialize};
use url::Url;

/// Page size requested for data endpoints.
pub const DATA_PAGE_SIZE: usize = 2000;

/// A page whose records can be appended to an accumulator.
pub trait Paginated: Sized {
    /// Absolute URL of the next page, `None` on the last page.
    fn next_url(&self) -> Option<&str>;
    /// Total record count the server reports for the whole query.
    fn declared_count(&self) -> u64;
    /// Number of records held so far.
    fn len(&self) -> usize;
    /// Append another page's records, leaving this page's envelope in place.
    fn absorb(&mut self, other: Self);
    /// Mark the accumulator as exhausted.
    fn finish(&mut self);

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `{count, next, previous, results[]}` list envelope.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> Paginated for Page<T> {
    fn next_url(&self) -> Option<&str> {
        self.next.as_deref()
    }

    fn declared_count(&self) -> u64 {
        self.count
    }

    fn len(&self) -> usize {
        self.results.len()
    }

    fn absorb(&mut self, other: Self) {
        self.results.extend(other.results);
    }

    fn finish(&mut self) {
        self.next = None;
    }
}

/// GeoJSON feature collection with the list envelope fields mixed in.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct FeaturePage {
    #[serde(rename = "type", default = "feature_collection_type")]
    pub kind: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub features: Vec<Feature>,
}

fn feature_collection_type() -> String {
    "FeatureCollection".to_string()
}

impl FeaturePage {
    pub fn into_collection(self) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: self.features,
            foreign_members: None,
        }
    }
}

impl Paginated for FeaturePage {
    fn next_url(&self) -> Option<&str> {
        self.next.as_deref()
    }

    fn declared_count(&self) -> u64 {
        self.count
    }

    fn len(&self) -> usize {
        self.features.len()
    }

    fn absorb(&mut self, other: Self) {
        self.features.extend(other.features);
    }

    fn finish(&mut self) {
        self.next = None;
    }
}

/// Reduce the server's absolute `next` URL to the path and query the client
/// resolves against its own API host.
pub fn next_path(next: &str) -> Result<String> {
    let url = Url::parse(next).map_err(|e| ApiError::InvalidUrl(format!("{next}: {e}")))?;
    Ok(match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    })
}
