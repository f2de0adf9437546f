use chrono::NaiveDate;

use crate::store::Sample;

/// Rows shown in the recent-history table.
pub const RECENT_WINDOW: usize = 30;

/// The dimension whose growth drives the headline projections. `/var` holds
/// the log pipeline on these hosts, so its column is the one worth projecting.
pub const PRIMARY_COLUMN: &str = "var_gb";

/// Everything the renderer needs, assembled once per run. Pure data: the
/// renderer never touches the store or the projection engine directly.
#[derive(Debug, Clone)]
pub struct ReportView {
    pub generated_on: NaiveDate,
    pub hostname: String,
    pub agent_count: u64,
    pub agent_log_gb: f64,
    /// Usage columns in table order (the store's header order).
    pub columns: Vec<String>,
    /// Latest value per usage column; a missing marker reads as 0.
    pub latest: Vec<(String, f64)>,
    /// The most recent `RECENT_WINDOW` rows, oldest first.
    pub recent: Vec<Sample>,
    pub projection_180: Option<f64>,
    pub projection_365: Option<f64>,
}

pub fn build_view(
    history: &[Sample],
    generated_on: NaiveDate,
    hostname: String,
    projection_180: Option<f64>,
    projection_365: Option<f64>,
) -> ReportView {
    let latest_sample = history.last();

    let columns = latest_sample.map(Sample::usage_columns).unwrap_or_default();
    let latest = columns
        .iter()
        .map(|col| {
            (
                col.clone(),
                latest_sample.and_then(|s| s.usage(col)).unwrap_or(0.0),
            )
        })
        .collect();

    let start = history.len().saturating_sub(RECENT_WINDOW);
    let recent = history[start..].to_vec();

    ReportView {
        generated_on,
        hostname,
        agent_count: latest_sample.map(|s| s.agent_count).unwrap_or(0),
        agent_log_gb: latest_sample.map(|s| s.agent_log_gb).unwrap_or(0.0),
        columns,
        latest,
        recent,
        projection_180,
        projection_365,
    }
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
    fn test_single_row_history_has_single_row_window() {
        let history = vec![row(1, 10.0, 3)];
        let view = build_view(&history, today(), "siem01".into(), None, None);

        assert_eq!(view.recent.len(), 1);
        assert_eq!(view.latest, vec![("var_gb".to_string(), 10.0)]);
        assert_eq!(view.agent_count, 3);
        assert_eq!(view.agent_log_gb, 0.5);
    }

    #[test]
    fn test_window_caps_at_recent_rows() {
        let history: Vec<Sample> = (1..=28)
            .chain(1..=14)
            .enumerate()
            .map(|(i, d)| row(d, i as f64, 1))
            .collect();
        assert_eq!(history.len(), 42);

        let view = build_view(&history, today(), "siem01".into(), None, None);
        assert_eq!(view.recent.len(), RECENT_WINDOW);
        // Oldest-first window ending at the newest row.
        assert_eq!(view.recent.last().unwrap().usage("var_gb"), Some(41.0));
    }

    #[test]
    fn test_empty_history_builds_empty_view() {
        let view = build_view(&[], today(), "siem01".into(), None, None);
        assert!(view.recent.is_empty());
        assert!(view.columns.is_empty());
        assert_eq!(view.agent_count, 0);
        assert_eq!(view.projection_180, None);
    }
}
