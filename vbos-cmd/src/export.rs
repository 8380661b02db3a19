//! CSV and JSON output for command results.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use vbos_data::{PlaceStats, SeriesPoint};

/// Buffered writer for `path`, or stdout.
pub fn open_output(path: Option<&Path>) -> io::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    })
}

fn write_table<W: Write>(
    label: &str,
    attributes: &[String],
    rows: impl Iterator<Item = (String, BTreeMap<String, f64>)>,
    writer: W,
) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = vec![label.to_string()];
    header.extend(attributes.iter().cloned());
    wtr.write_record(&header)?;
    for (key, values) in rows {
        let mut record = vec![key];
        record.extend(
            attributes
                .iter()
                .map(|a| values.get(a).map(f64::to_string).unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// One row per period, one column per attribute. Missing totals are blank.
pub fn write_series_csv<W: Write>(
    points: &[SeriesPoint],
    attributes: &[String],
    writer: W,
) -> anyhow::Result<()> {
    let rows = points.iter().map(|p| (p.period.clone(), p.values.clone()));
    write_table("period", attributes, rows, writer)
}

pub fn write_places_csv<W: Write>(
    places: &[PlaceStats],
    attributes: &[String],
    writer: W,
) -> anyhow::Result<()> {
    let rows = places.iter().map(|p| (p.place.clone(), p.values.clone()));
    write_table("place", attributes, rows, writer)
}

pub fn write_json<T: Serialize, W: Write>(value: &T, mut writer: W) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vbos_core::TabularRow;
    use vbos_data::{attributes, consolidate_stats, consolidate_time_series, Granularity};

    fn rows() -> Vec<TabularRow> {
        vec![
            TabularRow::new("2020-01", "Torba", "pop", 10.0),
            TabularRow::new("2020-02", "Torba", "pop", 12.0),
            TabularRow::new("2020-02", "Sanma", "houses", 3.5),
        ]
    }

    #[test]
    fn test_series_csv() {
        let rows = rows();
        let mut out = Vec::new();
        write_series_csv(&consolidate_time_series(&rows, true), &attributes(&rows), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "period,pop,houses\n2020-01,10,\n2020-02,12,3.5\n"
        );
    }

    #[test]
    fn test_places_csv() {
        let rows = rows();
        let mut out = Vec::new();
        let places = consolidate_stats(&rows, Granularity::Province);
        write_places_csv(&places, &attributes(&rows), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "place,pop,houses\nTorba,22,\nSanma,,3.5\n"
        );
    }

    #[test]
    fn test_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        {
            let writer = open_output(Some(&path)).unwrap();
            write_json(&serde_json::json!({"count": 2}), writer).unwrap();
        }
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "{\n  \"count\": 2\n}\n");
    }
}
