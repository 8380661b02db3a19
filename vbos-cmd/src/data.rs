//! Fetching dataset records and deriving statistics from them.

use crate::export::{write_json, write_places_csv, write_series_csv};
use crate::view::area_filters;
use anyhow::Context;
use geojson::FeatureCollection;
use log::{debug, info};
use std::io::Write;
use vbos_core::api::{CancellationToken, DataKind, DatasetData, HttpClient, Transport};
use vbos_core::{DataFilters, TabularRow};
use vbos_data::choropleth::fill_opacity;
use vbos_data::{
    attributes, consolidate_stats, consolidate_time_series, AreaStatsCache, PeriodMode,
};
use vbos_state::AppState;
use vbos_utils::format::compact_number;

/// Dump every record of a dataset as JSON: an array of rows for tabular
/// data, a feature collection for vector data.
pub async fn run_fetch<T: Transport>(
    client: &HttpClient<T>,
    kind: DataKind,
    id: u64,
    filters: &DataFilters,
    cancel: &CancellationToken,
    out: impl Write,
) -> anyhow::Result<()> {
    let data = client.fetch_dataset_data(kind, id, filters, cancel).await?;
    info!(
        "{} {} records for dataset {} (server reported {})",
        data.len(),
        kind.as_str(),
        id,
        data.declared_count()
    );
    match data {
        DatasetData::Tabular(page) => write_json(&page.results, out),
        DatasetData::Vector(page) => write_json(&page.into_collection(), out),
    }
}

/// Load the rows of dataset `id` for the view's area into the state's
/// tabular slot.
async fn load_rows<T: Transport>(
    client: &HttpClient<T>,
    state: &AppState,
    id: u64,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let ticket = state.tabular.begin();
    match client.fetch_tabular_rows(id, &area_filters(state), cancel).await {
        Ok(page) => {
            state.tabular.accept(ticket, page.results);
            Ok(())
        }
        Err(e) => {
            state.tabular.fail(ticket);
            Err(e).with_context(|| format!("failed to load rows for dataset {id}"))
        }
    }
}

/// Run `f` over the rows held in the tabular slot.
fn with_rows<R>(state: &AppState, f: impl FnOnce(&[TabularRow]) -> R) -> R {
    state
        .tabular
        .with(|slot| f(slot.value().map(Vec::as_slice).unwrap_or_default()))
}

/// Province boundaries, or the selected province's area councils.
async fn load_boundaries<T: Transport>(
    client: &HttpClient<T>,
    state: &AppState,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let ticket = state.boundaries.begin();
    let province = state.area.with(|a| a.province().map(str::to_string));
    let result: vbos_core::Result<FeatureCollection> = match &province {
        Some(province) => client.fetch_area_councils(province, cancel).await,
        None => client.fetch_provinces(cancel).await,
    };
    match result {
        Ok(features) => {
            state.boundaries.accept(ticket, features);
            Ok(())
        }
        Err(e) => {
            state.boundaries.fail(ticket);
            Err(e).context("failed to load boundaries")
        }
    }
}

/// Per-region totals for the view's year, with the range and the fill
/// opacity each region would be drawn at.
pub async fn run_stats<T: Transport>(
    client: &HttpClient<T>,
    state: &AppState,
    id: u64,
    cancel: &CancellationToken,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let (rows, boundaries) = tokio::join!(
        load_rows(client, state, id, cancel),
        load_boundaries(client, state, cancel)
    );
    rows?;
    boundaries?;

    let mut cache = AreaStatsCache::new();
    let stats = state
        .area_stats(&mut cache)
        .context("rows and boundaries did not both load")?;
    let key = state.stats_key();
    let opacity = state
        .layers
        .with(|l| l.active_tabular().map(|layer| l.opacity(layer)))
        .unwrap_or(vbos_state::layer::DEFAULT_OPACITY);

    if !stats.has_choropleth() {
        writeln!(out, "No values for {} at {:?} level", key.year, key.granularity)?;
        return Ok(());
    }
    writeln!(
        out,
        "{} by {:?}: min {} max {}",
        key.year,
        key.granularity,
        compact_number(stats.min_value),
        compact_number(stats.max_value)
    )?;
    for (name, value) in stats.values() {
        let shade = fill_opacity(value, stats.min_value, stats.max_value, opacity);
        match (value, shade) {
            (Some(v), Some(s)) => writeln!(out, "{name}\t{v}\t{s:.2}")?,
            _ => writeln!(out, "{name}\t-\t-")?,
        }
    }
    Ok(())
}

/// Attribute totals per month when the data varies by month and monthly
/// periods are allowed, otherwise per year.
pub async fn run_series<T: Transport>(
    client: &HttpClient<T>,
    state: &AppState,
    id: u64,
    monthly: bool,
    cancel: &CancellationToken,
    out: impl Write,
) -> anyhow::Result<()> {
    load_rows(client, state, id, cancel).await?;
    let (points, legend) = with_rows(state, |rows| {
        let mode = PeriodMode::resolve(rows, monthly);
        debug!("dataset {id}: {mode:?} periods");
        (
            consolidate_time_series(rows, mode == PeriodMode::Monthly),
            attributes(rows),
        )
    });
    write_series_csv(&points, &legend, out)
}

/// Attribute totals per province, or per area council within the selected
/// province.
pub async fn run_places<T: Transport>(
    client: &HttpClient<T>,
    state: &AppState,
    id: u64,
    cancel: &CancellationToken,
    out: impl Write,
) -> anyhow::Result<()> {
    load_rows(client, state, id, cancel).await?;
    let granularity = state.area.with(|a| a.granularity());
    let (places, legend) =
        with_rows(state, |rows| (consolidate_stats(rows, granularity), attributes(rows)));
    write_places_csv(&places, &legend, out)
}
