use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::data::aggregate::DashboardSummary;
use crate::data::filter::FilterState;

/// What File → Export summary… writes: the filters that produced a summary
/// alongside the summary itself.
#[derive(Debug, Serialize)]
pub struct SummaryExport<'a> {
    pub source: Option<String>,
    pub filters: &'a FilterState,
    pub summary: &'a DashboardSummary,
}

/// Pretty-printed JSON to any writer.
pub fn write_summary<W: Write>(out: W, export: &SummaryExport<'_>) -> Result<()> {
    serde_json::to_writer_pretty(out, export).context("serialising summary")
}

pub fn save_summary(path: &Path, export: &SummaryExport<'_>) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = std::io::BufWriter::new(file);
    write_summary(&mut writer, export)?;
    writer.flush().context("flushing summary")?;
    log::info!("Exported summary of {} rows to {}", export.summary.rows, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;
    use serde_json::Value;

    use super::*;
    use crate::data::filter::TargetMetric;
    use crate::data::model::{RentalDataset, RentalRecord, Season, Weather};

    #[test]
    fn test_export_contains_kpis_and_filters() {
        let ts = NaiveDateTime::parse_from_str("2011-06-01 17:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let ds = RentalDataset::from_records(vec![
            RentalRecord::new(ts, Season::Summer, Weather::Clear, true).with_counts(10, 90, 100),
        ]);
        let filters = FilterState {
            seasons: [Season::Summer].into_iter().collect(),
            ..FilterState::default()
        };
        let summary = DashboardSummary::compute(&ds, &[0], TargetMetric::Total);

        let mut buf = Vec::new();
        write_summary(
            &mut buf,
            &SummaryExport {
                source: Some("train.csv".to_string()),
                filters: &filters,
                summary: &summary,
            },
        )
        .unwrap();

        let json: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(json["source"], "train.csv");
        assert_eq!(json["filters"]["seasons"][0], "summer");
        assert_eq!(json["filters"]["working_day"], "all");
        assert_eq!(json["summary"]["total"], 100);
        assert_eq!(json["summary"]["peak_hour"], 17);
        assert_eq!(json["summary"]["by_period"][2]["key"], "afternoon");
        // A single row has no variance to correlate.
        assert!(json["summary"]["correlation"]["values"][0][0].is_null());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_save_reports_failed_write() {
        let ds = RentalDataset::from_records(Vec::new());
        let filters = FilterState::default();
        let summary = DashboardSummary::compute(&ds, &[], TargetMetric::Total);
        let export = SummaryExport {
            source: None,
            filters: &filters,
            summary: &summary,
        };

        let result = save_summary(Path::new("/dev/full"), &export);
        assert!(result.is_err());
    }
}
