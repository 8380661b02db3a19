use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// The storage family a dataset belongs to.
///
/// Each family has a one-letter prefix used in layer ids (`t12`, `r3`, ...).
#[derive(Debug, Default, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    Tabular,
    Raster,
    Vector,
    Pmtiles,
}

impl DataType {
    pub const ALL: [DataType; 4] = [
        DataType::Tabular,
        DataType::Raster,
        DataType::Vector,
        DataType::Pmtiles,
    ];

    /// Layer-id prefix for this family.
    pub fn prefix(self) -> char {
        match self {
            DataType::Tabular => 't',
            DataType::Raster => 'r',
            DataType::Vector => 'v',
            DataType::Pmtiles => 'p',
        }
    }

    pub fn from_prefix(c: char) -> Option<Self> {
        match c {
            't' => Some(DataType::Tabular),
            'r' => Some(DataType::Raster),
            'v' => Some(DataType::Vector),
            'p' => Some(DataType::Pmtiles),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Tabular => "tabular",
            DataType::Raster => "raster",
            DataType::Vector => "vector",
            DataType::Pmtiles => "pmtiles",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies an active map layer: a dataset family plus the dataset id.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct LayerId {
    pub data_type: DataType,
    pub id: u64,
}

impl LayerId {
    pub fn new(data_type: DataType, id: u64) -> Self {
        Self { data_type, id }
    }

    pub fn is_tabular(&self) -> bool {
        self.data_type == DataType::Tabular
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.data_type.prefix(), self.id)
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ParseLayerIdError(pub String);

impl fmt::Display for ParseLayerIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid layer id: {:?}", self.0)
    }
}

impl std::error::Error for ParseLayerIdError {}

impl FromStr for LayerId {
    type Err = ParseLayerIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseLayerIdError(s.to_string());
        let mut chars = s.trim().chars();
        let data_type = chars.next().and_then(DataType::from_prefix).ok_or_else(err)?;
        let rest = chars.as_str();
        if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let id = rest.parse::<u64>().map_err(|_| err())?;
        Ok(LayerId { data_type, id })
    }
}

/// A dataset record from the catalog endpoint.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cluster: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    /// Grouping label the sidebar buckets datasets by.
    #[serde(rename = "type", default)]
    pub group: String,
    /// Tagged client-side from the catalog array the record arrived in.
    #[serde(rename = "dataType", default)]
    pub data_type: DataType,
    /// Family-specific fields (tile urls, raster params, timestamps).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Dataset {
    pub fn layer_id(&self) -> LayerId {
        LayerId::new(self.data_type, self.id)
    }

    /// Unit label for chart axes; the placeholder unit `number` shows nothing.
    pub fn display_unit(&self) -> Option<&str> {
        self.unit
            .as_deref()
            .filter(|u| !u.is_empty() && *u != "number")
    }
}

/// A dataset cluster (thematic grouping such as "Hazards").
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Cluster {
    pub id: u64,
    pub name: String,
}

/// Datasets of one `type` label within a cluster.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ClusterDatasets {
    #[serde(rename = "type")]
    pub group: String,
    pub datasets: Vec<Dataset>,
}

/// Body of `GET /api/v1/datasets/?cluster=`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CatalogResponse {
    #[serde(default)]
    pub tabular: Vec<Dataset>,
    #[serde(default)]
    pub raster: Vec<Dataset>,
    #[serde(default)]
    pub vector: Vec<Dataset>,
    #[serde(default)]
    pub pmtiles: Vec<Dataset>,
}

impl CatalogResponse {
    /// Flatten the four arrays into one list, tagging each record with the
    /// family it came from.
    pub fn into_tagged(self) -> Vec<Dataset> {
        let CatalogResponse {
            tabular,
            raster,
            vector,
            pmtiles,
        } = self;
        [tabular, raster, vector, pmtiles]
            .into_iter()
            .zip(DataType::ALL)
            .flat_map(|(datasets, data_type)| {
                datasets.into_iter().map(move |mut d| {
                    d.data_type = data_type;
                    d
                })
            })
            .collect()
    }

    pub fn into_groups(self) -> Vec<ClusterDatasets> {
        group_by_type(self.into_tagged())
    }
}

/// Bucket datasets by their `type` label, keeping the order in which each
/// label first appears.
pub fn group_by_type(datasets: Vec<Dataset>) -> Vec<ClusterDatasets> {
    let mut groups: Vec<ClusterDatasets> = Vec::new();
    for dataset in datasets {
        match groups.iter_mut().find(|g| g.group == dataset.group) {
            Some(group) => group.datasets.push(dataset),
            None => groups.push(ClusterDatasets {
                group: dataset.group.clone(),
                datasets: vec![dataset],
            }),
        }
    }
    groups
}
