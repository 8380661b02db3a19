//! Listing clusters and their datasets.

use std::io::Write;
use vbos_core::api::{CancellationToken, HttpClient, Transport};
use vbos_core::ClusterDatasets;

pub async fn run_clusters<T: Transport>(
    client: &HttpClient<T>,
    cancel: &CancellationToken,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    for cluster in client.fetch_clusters(cancel).await? {
        writeln!(out, "{}\t{}", cluster.id, cluster.name)?;
    }
    Ok(())
}

fn print_groups(groups: &[ClusterDatasets], out: &mut impl Write) -> std::io::Result<()> {
    for group in groups {
        let label = if group.group.is_empty() {
            "(ungrouped)"
        } else {
            group.group.as_str()
        };
        writeln!(out, "{label}")?;
        for dataset in &group.datasets {
            match dataset.display_unit() {
                Some(unit) => writeln!(out, "  {}\t{} [{}]", dataset.layer_id(), dataset.name, unit)?,
                None => writeln!(out, "  {}\t{}", dataset.layer_id(), dataset.name)?,
            }
        }
    }
    Ok(())
}

pub async fn run_datasets<T: Transport>(
    client: &HttpClient<T>,
    cluster: &str,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let groups = client.fetch_cluster_datasets(cluster).await?;
    print_groups(&groups, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeApi;
    use vbos_core::Session;

    #[tokio::test]
    async fn test_datasets_grouped_with_layer_ids() {
        let api = FakeApi::default().route(
            "/api/v1/datasets/?cluster=Hazards",
            200,
            r#"{
                "tabular": [{"id": 12, "name": "Population", "type": "Census", "unit": "people"}],
                "vector": [{"id": 3, "name": "Roads", "type": "Infrastructure"}],
                "raster": [{"id": 5, "name": "Flood depth", "type": "Census", "unit": "number"}]
            }"#,
        );
        let client = api.client(Session::default());
        let mut out = Vec::new();
        run_datasets(&client, "Hazards", &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Census\n  t12\tPopulation [people]\n"));
        assert!(text.contains("  r5\tFlood depth\n"));
        assert!(text.contains("Infrastructure\n  v3\tRoads\n"));
    }

    #[tokio::test]
    async fn test_catalog_failure_names_cluster() {
        let api = FakeApi::default().route("/api/v1/datasets/?cluster=Hazards", 500, "");
        let client = api.client(Session::default());
        let err = run_datasets(&client, "Hazards", &mut Vec::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Unable to fetch datasets for cluster Hazards");
    }

    #[tokio::test]
    async fn test_clusters() {
        let api = FakeApi::default().route(
            "/api/v1/cluster/",
            200,
            r#"{"count": 2, "next": null, "previous": null,
                "results": [{"id": 1, "name": "Hazards"}, {"id": 2, "name": "Health"}]}"#,
        );
        let client = api.client(Session::default());
        let mut out = Vec::new();
        run_clusters(&client, &CancellationToken::new(), &mut out)
            .await
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1\tHazards\n2\tHealth\n");
    }
}
