use chrono::NaiveDate;
use log::warn;

use crate::metrics::{Dimension, Measurement};

pub const DATE_COLUMN: &str = "date";
pub const AGENT_COUNT_COLUMN: &str = "agent_count";
pub const AGENT_LOG_COLUMN: &str = "agent_log_gb";

/// One row of the time series: the calendar day it was taken, one usage value
/// per tracked dimension, the registered-agent count and the agent-log volume.
///
/// `usage_gb` is keyed by column name (`<key>_gb`) in column order. `None`
/// marks a value missing from persisted history (the dimension did not exist
/// when that row was written); freshly assembled samples never contain `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub date: NaiveDate,
    pub usage_gb: Vec<(String, Option<f64>)>,
    pub agent_count: u64,
    pub agent_log_gb: f64,
}

impl Sample {
    /// Build today's row from the measured dimensions. This is the one place
    /// where `Unavailable` collapses to 0.0; the fold is logged so a broken
    /// sampler stays visible in cron output even though the CSV hides it.
    pub fn assemble(
        measured: &[(Dimension, Measurement)],
        agent_count: u64,
        agent_log: Measurement,
        date: NaiveDate,
    ) -> Self {
        let usage_gb = measured
            .iter()
            .map(|(dim, m)| {
                if m.is_unavailable() {
                    warn!("recording 0 for {} ({}): measurement unavailable", dim.key, dim.path);
                }
                (dim.column(), Some(m.or_zero()))
            })
            .collect();

        if agent_log.is_unavailable() {
            warn!("recording 0 for agent log volume: measurement unavailable");
        }

        Self {
            date,
            usage_gb,
            agent_count,
            agent_log_gb: agent_log.or_zero(),
        }
    }

    /// Usage value for a column name, if present in this row.
    pub fn usage(&self, column: &str) -> Option<f64> {
        self.usage_gb
            .iter()
            .find(|(name, _)| name == column)
            .and_then(|(_, v)| *v)
    }

    /// Column names carried by this row, usage columns in dimension order.
    pub fn usage_columns(&self) -> Vec<String> {
        self.usage_gb.iter().map(|(name, _)| name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims() -> Vec<(Dimension, Measurement)> {
        vec![
            (Dimension::new("var", "/var"), Measurement::Gigabytes(12.5)),
            (Dimension::new("var_log", "/var/log"), Measurement::Unavailable),
            (Dimension::new("opt", "/opt"), Measurement::Gigabytes(3.0)),
        ]
    }

    #[test]
    fn test_assemble_folds_unavailable_to_zero() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let sample = Sample::assemble(&dims(), 42, Measurement::Gigabytes(1.25), date);

        assert_eq!(sample.usage("var_gb"), Some(12.5));
        assert_eq!(sample.usage("var_log_gb"), Some(0.0));
        assert_eq!(sample.usage("opt_gb"), Some(3.0));
        assert_eq!(sample.agent_count, 42);
        assert_eq!(sample.agent_log_gb, 1.25);
    }

    #[test]
    fn test_one_unavailable_dimension_does_not_suppress_others() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let sample = Sample::assemble(&dims(), 7, Measurement::Unavailable, date);

        // Full key set present despite two failed measurements.
        assert_eq!(
            sample.usage_columns(),
            vec!["var_gb", "var_log_gb", "opt_gb"]
        );
        assert_eq!(sample.agent_count, 7);
        assert_eq!(sample.agent_log_gb, 0.0);
    }
}
