pub mod charts;
pub mod html;
pub mod view;

pub use view::{build_view, ReportView, PRIMARY_COLUMN, RECENT_WINDOW};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use crate::store::Sample;
use html::ChartFiles;

pub const DISK_CHART: &str = "disk_growth.svg";
pub const INGESTION_CHART: &str = "daily_ingestion.svg";
pub const AGENTS_CHART: &str = "agent_growth.svg";

/// Draw the charts and write the HTML artifact plus its sibling SVG files
/// into `output_dir`. The only errors surfaced here are I/O failures on the
/// output location itself; everything content-related degrades in-page.
pub fn write_report(output_dir: &Path, view: &ReportView, history: &[Sample]) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let charts = ChartFiles {
        disk: write_chart(output_dir, DISK_CHART, disk_growth_svg(view, history))?,
        ingestion: write_chart(output_dir, INGESTION_CHART, ingestion_svg(history))?,
        agents: write_chart(output_dir, AGENTS_CHART, agent_growth_svg(history))?,
    };

    let html_path = output_dir.join("server_sizing_report.html");
    fs::write(&html_path, html::render(view, &charts))
        .with_context(|| format!("failed to write {}", html_path.display()))?;
    info!("Report written to {}", html_path.display());
    Ok(html_path)
}

fn write_chart(dir: &Path, name: &str, svg: Option<String>) -> Result<Option<String>> {
    match svg {
        Some(svg) => {
            let path = dir.join(name);
            fs::write(&path, svg).with_context(|| format!("failed to write {}", path.display()))?;
            Ok(Some(name.to_string()))
        }
        None => Ok(None),
    }
}

/// One line per tracked dimension, rows with missing markers left out.
fn disk_growth_svg(view: &ReportView, history: &[Sample]) -> Option<String> {
    let series: Vec<(String, Vec<(NaiveDate, f64)>)> = view
        .columns
        .iter()
        .map(|column| {
            let points = history
                .iter()
                .filter_map(|s| s.usage(column).map(|gb| (s.date, gb)))
                .collect();
            (column.trim_end_matches("_gb").to_string(), points)
        })
        .collect();
    charts::line_chart("Disk Growth (GB)", "GB", &series)
}

/// Row-over-row delta of the primary dimension; the first row reads as 0.
fn ingestion_svg(history: &[Sample]) -> Option<String> {
    let mut bars = Vec::new();
    let mut previous: Option<f64> = None;
    for sample in history {
        if let Some(gb) = sample.usage(PRIMARY_COLUMN) {
            let delta = previous.map(|p| gb - p).unwrap_or(0.0);
            bars.push((sample.date, (delta * 100.0).round() / 100.0));
            previous = Some(gb);
        }
    }
    charts::bar_chart("Daily /var Ingestion (GB)", "GB/day", &bars)
}

fn agent_growth_svg(history: &[Sample]) -> Option<String> {
    let points: Vec<(NaiveDate, f64)> = history
        .iter()
        .map(|s| (s.date, s.agent_count as f64))
        .collect();
    charts::line_chart("Agent Count", "agents", &[("agents".to_string(), points)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{Dimension, Measurement};

    fn row(day: u32, var_gb: f64, agents: u64) -> Sample {
        Sample::assemble(
            &[(Dimension::new("var", "/var"), Measurement::Gigabytes(var_gb))],
            agents,
            Measurement::Gigabytes(0.5),
            NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
        )
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
    }

    #[test]
    fn test_write_report_with_history_emits_charts() {
        let tmp = tempfile::tempdir().unwrap();
        let history = vec![row(1, 10.0, 3), row(10, 19.0, 5)];
        let view = build_view(&history, today(), "siem01".into(), Some(199.0), Some(384.0));

        let html_path = write_report(tmp.path(), &view, &history).unwrap();

        assert!(html_path.exists());
        assert!(tmp.path().join(DISK_CHART).exists());
        assert!(tmp.path().join(INGESTION_CHART).exists());
        assert!(tmp.path().join(AGENTS_CHART).exists());

        let html = fs::read_to_string(&html_path).unwrap();
        assert!(html.contains(DISK_CHART));
        assert!(html.contains("199"));
    }

    #[test]
    fn test_write_report_empty_history_degrades() {
        let tmp = tempfile::tempdir().unwrap();
        let view = build_view(&[], today(), "siem01".into(), None, None);

        let html_path = write_report(tmp.path(), &view, &[]).unwrap();

        assert!(html_path.exists());
        assert!(!tmp.path().join(DISK_CHART).exists());
        let html = fs::read_to_string(&html_path).unwrap();
        assert!(html.contains("No disk growth chart yet"));
    }

    #[test]
    fn test_single_row_report_has_single_row_table() {
        let tmp = tempfile::tempdir().unwrap();
        let history = vec![row(1, 10.0, 3)];
        let view = build_view(&history, today(), "siem01".into(), None, None);

        let html_path = write_report(tmp.path(), &view, &history).unwrap();
        let html = fs::read_to_string(&html_path).unwrap();

        // One data row, charts degraded (single point).
        assert_eq!(html.matches("<tr><td>2025-06-01</td>").count(), 1);
        assert!(html.contains("No agent chart yet"));
    }
}
