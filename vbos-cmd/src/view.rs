//! Rebuilding a dashboard view from a shared link and command-line overrides.

use anyhow::{anyhow, bail};
use clap::{Args, ValueEnum};
use vbos_core::api::DataKind;
use vbos_core::{DataFilters, LayerId};
use vbos_state::{AppState, History, MemoryHistory, UrlSynchronizer};
use vbos_utils::dates::{parse_month, parse_year};

/// Data family for `fetch`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindArg {
    Tabular,
    Vector,
}

impl From<KindArg> for DataKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Tabular => DataKind::Tabular,
            KindArg::Vector => DataKind::Vector,
        }
    }
}

/// Server-side filters for data requests.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    #[arg(long)]
    pub province: Option<String>,

    #[arg(long)]
    pub area_council: Option<String>,

    /// Attribute substring
    #[arg(long)]
    pub attribute: Option<String>,

    /// Inclusive lower bound (YYYY-MM-DD)
    #[arg(long)]
    pub date_after: Option<String>,

    /// Inclusive upper bound (YYYY-MM-DD)
    #[arg(long)]
    pub date_before: Option<String>,

    /// Exact metadata match, repeatable
    #[arg(long = "metadata", value_name = "KEY=VALUE", value_parser = parse_metadata)]
    pub metadata: Vec<(String, String)>,
}

fn parse_metadata(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got {raw:?}")),
    }
}

impl FilterArgs {
    pub fn to_filters(&self) -> DataFilters {
        DataFilters {
            province: self.province.clone(),
            area_council: self.area_council.clone(),
            attribute: self.attribute.clone(),
            date_after: self.date_after.clone(),
            date_before: self.date_before.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

/// A dashboard view: a shared link's query string plus overrides.
#[derive(Args, Debug, Clone, Default)]
pub struct ViewArgs {
    /// Query string of a shared dashboard link
    #[arg(long)]
    pub link: Option<String>,

    #[arg(long)]
    pub province: Option<String>,

    /// Area council within --province
    #[arg(long = "ac")]
    pub area_council: Option<String>,

    #[arg(long)]
    pub year: Option<String>,

    #[arg(long)]
    pub month: Option<String>,

    /// Comma-joined layer ids, e.g. t12,v3
    #[arg(long)]
    pub layers: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub lng: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,

    #[arg(long)]
    pub zoom: Option<f64>,

    /// Opacity of the tabular layer, 0-100
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub opacity: Option<u8>,
}

impl ViewArgs {
    /// Load the link into a fresh state, then apply the overrides.
    pub fn synchronizer(&self) -> anyhow::Result<UrlSynchronizer<MemoryHistory>> {
        let link = self.link.as_deref().unwrap_or_default();
        let search = link.split_once('?').map_or(link, |(_, query)| query);
        let sync = UrlSynchronizer::new(AppState::new(), MemoryHistory::new(search));
        sync.mount();
        self.apply(sync.state())?;
        Ok(sync)
    }

    pub fn state(&self) -> anyhow::Result<AppState> {
        Ok(self.synchronizer()?.state().clone())
    }

    fn apply(&self, state: &AppState) -> anyhow::Result<()> {
        if let Some(province) = &self.province {
            state.area.update(|a| a.select_province(Some(province.as_str())));
        }
        if let Some(ac) = &self.area_council {
            if !state.area.update(|a| a.select_area_council(Some(ac.as_str()))) {
                bail!("--ac needs a province");
            }
        }
        if let Some(raw) = &self.year {
            let year = parse_year(raw).ok_or_else(|| anyhow!("invalid year {raw:?}"))?;
            state.date.update(|d| d.set_year(year));
        }
        if let Some(raw) = &self.month {
            let month = parse_month(raw).ok_or_else(|| anyhow!("invalid month {raw:?}"))?;
            state.date.update(|d| d.set_month(Some(month)));
        }
        if let Some(raw) = &self.layers {
            for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                let layer: LayerId = part.parse()?;
                state.layers.update(|l| l.activate(layer));
            }
        }
        match (self.lng, self.lat) {
            (Some(lng), Some(lat)) => {
                let zoom = self.zoom.unwrap_or_else(|| state.map.with(|m| m.zoom));
                if !state.map.update(|m| m.set_camera(lng, lat, zoom)) {
                    bail!("camera {lng},{lat} is outside the map");
                }
            }
            (None, None) => {}
            _ => bail!("--lng and --lat go together"),
        }
        if let Some(percent) = self.opacity {
            let layer = state
                .layers
                .with(|l| l.active_tabular())
                .ok_or_else(|| anyhow!("--opacity needs a tabular layer"))?;
            state.layers.update(|l| l.set_opacity(layer, percent));
        }
        Ok(())
    }
}

/// Dataset to load: `--id` if given, else the view's tabular layer.
pub fn tabular_dataset(id: Option<u64>, state: &AppState) -> anyhow::Result<u64> {
    id.or_else(|| state.layers.with(|l| l.active_tabular()).map(|layer| layer.id))
        .ok_or_else(|| anyhow!("no dataset: pass --id or a link with a tabular layer"))
}

/// Filters matching the view's area selection.
pub fn area_filters(state: &AppState) -> DataFilters {
    state.area.with(|a| DataFilters {
        province: a.province().map(str::to_string),
        area_council: a.area_council().map(str::to_string),
        ..DataFilters::default()
    })
}

/// The view as a shareable query string.
pub fn run_link(args: &ViewArgs, out: &mut impl std::io::Write) -> anyhow::Result<()> {
    let mut sync = args.synchronizer()?;
    sync.commit_all();
    writeln!(out, "{}", sync.history().search())?;
    Ok(())
}
