//! Catalog lookups and cursor-following data fetches.

use super::http::{HttpClient, Transport};
use crate::dataset::{CatalogResponse, Cluster, ClusterDatasets};
use crate::error::{ApiError, Result};
use crate::filters::DataFilters;
use crate::page::{next_path, FeaturePage, Page, Paginated};
use crate::tabular::TabularRow;
use geojson::FeatureCollection;
use log::{debug, info};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use url::Url;

pub const CLUSTERS_PATH: &str = "/api/v1/cluster/";
pub const PROVINCES_PATH: &str = "/api/v1/provinces/";

/// Data endpoints that page through records.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DataKind {
    Tabular,
    Vector,
}

impl DataKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DataKind::Tabular => "tabular",
            DataKind::Vector => "vector",
        }
    }
}

/// Everything a data endpoint returned across all pages.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetData {
    Tabular(Page<TabularRow>),
    Vector(FeaturePage),
}

impl DatasetData {
    pub fn len(&self) -> usize {
        match self {
            DatasetData::Tabular(page) => page.len(),
            DatasetData::Vector(page) => page.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn declared_count(&self) -> u64 {
        match self {
            DatasetData::Tabular(page) => page.declared_count(),
            DatasetData::Vector(page) => page.declared_count(),
        }
    }
}

/// First-page path for a dataset's data endpoint.
pub fn data_path(kind: DataKind, id: u64, page_size: usize, filters: &DataFilters) -> String {
    let mut path = format!("/api/v1/{}/{}/data/?page_size={}", kind.as_str(), id, page_size);
    if !filters.is_empty() {
        path.push('&');
        path.push_str(&filters.to_query_string());
    }
    path
}

pub fn catalog_path(cluster: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(cluster.as_bytes()).collect();
    format!("/api/v1/datasets/?cluster={encoded}")
}

pub fn area_councils_path(province: &str) -> Result<String> {
    let mut url = Url::parse("http://localhost")
        .and_then(|base| base.join(PROVINCES_PATH))
        .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| ApiError::InvalidUrl(PROVINCES_PATH.to_string()))?
        .pop_if_empty()
        .push(province)
        .push("area-councils")
        .push("");
    Ok(url.path().to_string())
}

impl<T: Transport> HttpClient<T> {
    /// Datasets available in `cluster`, tagged by family and bucketed by
    /// their `type` label. One request, no retry.
    pub async fn fetch_cluster_datasets(&self, cluster: &str) -> Result<Vec<ClusterDatasets>> {
        let response = self.get(&catalog_path(cluster)).await?;
        if !response.is_success() {
            return Err(ApiError::Catalog(cluster.to_string()));
        }
        let catalog: CatalogResponse = response.json()?;
        Ok(catalog.into_groups())
    }

    pub async fn fetch_clusters(&self, cancel: &CancellationToken) -> Result<Vec<Cluster>> {
        let page: Page<Cluster> = self.follow_pages(CLUSTERS_PATH.to_string(), cancel).await?;
        Ok(page.results)
    }

    /// Province boundaries.
    pub async fn fetch_provinces(&self, cancel: &CancellationToken) -> Result<FeatureCollection> {
        let page: FeaturePage = self.follow_pages(PROVINCES_PATH.to_string(), cancel).await?;
        Ok(page.into_collection())
    }

    /// Area-council boundaries within `province`.
    pub async fn fetch_area_councils(
        &self,
        province: &str,
        cancel: &CancellationToken,
    ) -> Result<FeatureCollection> {
        let page: FeaturePage = self
            .follow_pages(area_councils_path(province)?, cancel)
            .await?;
        Ok(page.into_collection())
    }

    pub async fn fetch_tabular_rows(
        &self,
        id: u64,
        filters: &DataFilters,
        cancel: &CancellationToken,
    ) -> Result<Page<TabularRow>> {
        let path = data_path(DataKind::Tabular, id, self.page_size, filters);
        self.follow_pages(path, cancel).await
    }

    pub async fn fetch_vector_features(
        &self,
        id: u64,
        filters: &DataFilters,
        cancel: &CancellationToken,
    ) -> Result<FeaturePage> {
        let path = data_path(DataKind::Vector, id, self.page_size, filters);
        self.follow_pages(path, cancel).await
    }

    /// All records of a dataset, following `next` cursors until exhausted.
    pub async fn fetch_dataset_data(
        &self,
        kind: DataKind,
        id: u64,
        filters: &DataFilters,
        cancel: &CancellationToken,
    ) -> Result<DatasetData> {
        Ok(match kind {
            DataKind::Tabular => {
                DatasetData::Tabular(self.fetch_tabular_rows(id, filters, cancel).await?)
            }
            DataKind::Vector => {
                DatasetData::Vector(self.fetch_vector_features(id, filters, cancel).await?)
            }
        })
    }

    /// Fetch `first` and every page after it, one request at a time, into
    /// the first page's envelope. Any failure discards what was gathered.
    pub async fn follow_pages<P>(&self, first: String, cancel: &CancellationToken) -> Result<P>
    where
        P: Paginated + DeserializeOwned,
    {
        let mut acc: P = self.fetch_page(&first, cancel).await?;
        let mut next = acc.next_url().map(next_path).transpose()?;
        let mut pages = 1;
        while let Some(path) = next {
            let page: P = self.fetch_page(&path, cancel).await?;
            next = page.next_url().map(next_path).transpose()?;
            acc.absorb(page);
            pages += 1;
        }
        acc.finish();
        info!(
            "fetched {} of {} records from {} in {} page(s)",
            acc.len(),
            acc.declared_count(),
            first,
            pages
        );
        Ok(acc)
    }

    async fn fetch_page<P: DeserializeOwned>(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<P> {
        if cancel.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        debug!("requesting page {}", path);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ApiError::Cancelled),
            page = self.get_json::<P>(path) => page,
        }
    }
}
