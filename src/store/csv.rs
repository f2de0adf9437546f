use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{debug, warn};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::sample::{Sample, AGENT_COUNT_COLUMN, AGENT_LOG_COLUMN, DATE_COLUMN};

/// Append-only CSV time series.
///
/// One record per Sample, header row names the columns, missing values are
/// written as empty fields and never as dropped columns. The column set is
/// whatever has been seen to date: a Sample carrying a column the header does
/// not know forces a one-time rewrite that backfills empty markers into all
/// prior rows. Appends are assumed to be serialized externally (one cron run
/// at a time); there is no in-process locking.
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one Sample, initializing the file from the Sample's columns on
    /// first use and reconciling the header on schema drift. I/O failures on
    /// the store file itself are the one fatal error class in this system.
    pub fn append(&self, sample: &Sample) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let existing = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read {}", self.path.display()))
            }
        };
        let mut lines = existing.lines();
        let header_line = lines.next().unwrap_or("").trim().to_string();

        if header_line.is_empty() {
            // First run (or an empty file left behind): write header + row.
            let header = initial_header(sample);
            let mut out = header.join(",");
            out.push('\n');
            out.push_str(&format_row(&header, sample));
            out.push('\n');
            fs::write(&self.path, out)
                .with_context(|| format!("failed to write {}", self.path.display()))?;
            return Ok(());
        }

        let mut header: Vec<String> = header_line.split(',').map(|c| c.trim().to_string()).collect();
        let new_columns: Vec<String> = sample
            .usage_columns()
            .into_iter()
            .filter(|c| !header.iter().any(|h| h == c))
            .collect();

        if new_columns.is_empty() {
            // Common case: schema unchanged (history may still carry columns
            // this run does not; those fields stay empty in the new row).
            let mut file = OpenOptions::new()
                .append(true)
                .open(&self.path)
                .with_context(|| format!("failed to open {}", self.path.display()))?;
            writeln!(file, "{}", format_row(&header, sample))
                .with_context(|| format!("failed to append to {}", self.path.display()))?;
            return Ok(());
        }

        // Schema drift: widen the header and backfill every prior row with
        // empty markers for the new columns, then append the new row.
        debug!("store gains columns {:?}, rewriting {}", new_columns, self.path.display());
        let pad = new_columns.len();
        header.extend(new_columns);

        let mut out = header.join(",");
        out.push('\n');
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            out.push_str(line);
            for _ in 0..pad {
                out.push(',');
            }
            out.push('\n');
        }
        out.push_str(&format_row(&header, sample));
        out.push('\n');
        fs::write(&self.path, out)
            .with_context(|| format!("failed to rewrite {}", self.path.display()))?;
        Ok(())
    }

    /// Read the full history, ordered by date ascending with ties kept in
    /// append order. Rows that fail to parse are skipped with a warning; an
    /// absent or unreadable file reads as an empty history ("first run"
    /// semantics), never as an error.
    pub fn read_all(&self) -> Vec<Sample> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) => {
                if self.path.exists() {
                    warn!("store unreadable, treating as empty ({}): {}", self.path.display(), err);
                } else {
                    debug!("no store at {}, starting fresh", self.path.display());
                }
                return Vec::new();
            }
        };

        let mut lines = text.lines();
        let header: Vec<String> = match lines.next() {
            Some(h) if !h.trim().is_empty() => {
                h.split(',').map(|c| c.trim().to_string()).collect()
            }
            _ => {
                warn!("store has no header, treating as empty: {}", self.path.display());
                return Vec::new();
            }
        };
        if !header.iter().any(|c| c == DATE_COLUMN) {
            warn!("store header lacks a {} column, treating as empty", DATE_COLUMN);
            return Vec::new();
        }

        let mut samples = Vec::new();
        for (idx, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match parse_row(&header, line) {
                Some(sample) => samples.push(sample),
                None => warn!(
                    "skipping unparseable row {} in {}: {:?}",
                    idx + 2,
                    self.path.display(),
                    line
                ),
            }
        }

        // Stable sort: same-day rows keep their append order.
        samples.sort_by_key(|s| s.date);
        samples
    }
}

fn initial_header(sample: &Sample) -> Vec<String> {
    let mut header = vec![DATE_COLUMN.to_string()];
    header.extend(sample.usage_columns());
    header.push(AGENT_COUNT_COLUMN.to_string());
    header.push(AGENT_LOG_COLUMN.to_string());
    header
}

/// Render one Sample against the given header. Columns the Sample does not
/// carry are written as empty fields.
fn format_row(header: &[String], sample: &Sample) -> String {
    let fields: Vec<String> = header
        .iter()
        .map(|col| match col.as_str() {
            DATE_COLUMN => sample.date.format("%Y-%m-%d").to_string(),
            AGENT_COUNT_COLUMN => sample.agent_count.to_string(),
            AGENT_LOG_COLUMN => fmt_gb(sample.agent_log_gb),
            _ => match sample.usage(col) {
                Some(gb) => fmt_gb(gb),
                None => String::new(),
            },
        })
        .collect();
    fields.join(",")
}

fn fmt_gb(gb: f64) -> String {
    format!("{}", gb)
}

/// Parse one data row back into a Sample. `None` means the row is skipped.
/// Empty fields are missing-value markers, not parse failures; agent counts
/// written as floats by older runs are accepted by truncation.
fn parse_row(header: &[String], line: &str) -> Option<Sample> {
    let mut fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() > header.len() {
        return None;
    }
    // Short rows from before a header widening read as missing markers.
    fields.resize(header.len(), "");

    let mut date = None;
    let mut usage_gb = Vec::new();
    let mut agent_count = 0u64;
    let mut agent_log_gb = 0.0f64;

    for (col, field) in header.iter().zip(fields) {
        match col.as_str() {
            DATE_COLUMN => {
                date = Some(NaiveDate::parse_from_str(field, "%Y-%m-%d").ok()?);
            }
            AGENT_COUNT_COLUMN => {
                if !field.is_empty() {
                    agent_count = match field.parse::<u64>() {
                        Ok(n) => n,
                        Err(_) => field.parse::<f64>().ok().filter(|f| *f >= 0.0)? as u64,
                    };
                }
            }
            AGENT_LOG_COLUMN => {
                if !field.is_empty() {
                    agent_log_gb = field.parse::<f64>().ok()?;
                }
            }
            _ => {
                let value = if field.is_empty() {
                    None
                } else {
                    Some(field.parse::<f64>().ok()?)
                };
                usage_gb.push((col.clone(), value));
            }
        }
    }

    Some(Sample {
        date: date?,
        usage_gb,
        agent_count,
        agent_log_gb,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{Dimension, Measurement};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn sample(date: NaiveDate, dims: &[(&str, f64)], agents: u64) -> Sample {
        let measured: Vec<(Dimension, Measurement)> = dims
            .iter()
            .map(|(key, gb)| {
                (
                    Dimension::new(*key, format!("/{}", key)),
                    Measurement::Gigabytes(*gb),
                )
            })
            .collect();
        Sample::assemble(&measured, agents, Measurement::Gigabytes(0.5), date)
    }

    fn store_in(dir: &tempfile::TempDir) -> CsvStore {
        CsvStore::new(dir.path().join("master.csv"))
    }

    #[test]
    fn test_first_append_initializes_and_reads_back() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(&tmp);

        let s = sample(day(1), &[("var", 10.0), ("home", 2.25)], 5);
        store.append(&s).unwrap();

        let history = store.read_all();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].date, day(1));
        assert_eq!(history[0].usage("var_gb"), Some(10.0));
        assert_eq!(history[0].usage("home_gb"), Some(2.25));
        assert_eq!(history[0].agent_count, 5);
        assert_eq!(history[0].agent_log_gb, 0.5);
    }

    #[test]
    fn test_read_all_is_prefix_extension_across_appends() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(&tmp);

        let mut previous = Vec::new();
        for d in 1..=4 {
            store.append(&sample(day(d), &[("var", d as f64)], d as u64)).unwrap();
            let current = store.read_all();
            assert_eq!(current.len(), previous.len() + 1);
            assert_eq!(&current[..previous.len()], &previous[..]);
            previous = current;
        }
    }

    #[test]
    fn test_new_column_is_backfilled_into_history() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(&tmp);

        store.append(&sample(day(1), &[("var", 10.0)], 1)).unwrap();
        store.append(&sample(day(2), &[("var", 11.0), ("opt", 4.0)], 1)).unwrap();

        let history = store.read_all();
        assert_eq!(history.len(), 2);
        // Prior row carries the missing marker, not a value.
        assert_eq!(history[0].usage("opt_gb"), None);
        assert_eq!(history[1].usage("opt_gb"), Some(4.0));
        assert_eq!(history[0].usage("var_gb"), Some(10.0));

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.lines().next().unwrap().contains("opt_gb"));
    }

    #[test]
    fn test_removed_column_marks_only_the_new_row() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(&tmp);

        store.append(&sample(day(1), &[("var", 10.0), ("opt", 4.0)], 1)).unwrap();
        store.append(&sample(day(2), &[("var", 11.0)], 1)).unwrap();

        let history = store.read_all();
        assert_eq!(history[0].usage("opt_gb"), Some(4.0));
        assert_eq!(history[1].usage("opt_gb"), None);
        assert_eq!(history[1].usage("var_gb"), Some(11.0));
    }

    #[test]
    fn test_same_day_appends_keep_order() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(&tmp);

        store.append(&sample(day(1), &[("var", 10.0)], 1)).unwrap();
        store.append(&sample(day(1), &[("var", 12.0)], 1)).unwrap();

        let history = store.read_all();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].usage("var_gb"), Some(10.0));
        assert_eq!(history[1].usage("var_gb"), Some(12.0));
    }

    #[test]
    fn test_rows_sorted_by_date_ascending() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(&tmp);

        store.append(&sample(day(5), &[("var", 15.0)], 1)).unwrap();
        store.append(&sample(day(2), &[("var", 12.0)], 1)).unwrap();

        let history = store.read_all();
        assert_eq!(history[0].date, day(2));
        assert_eq!(history[1].date, day(5));
    }

    #[test]
    fn test_corrupt_row_is_skipped_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(&tmp);

        store.append(&sample(day(1), &[("var", 10.0)], 1)).unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(store.path()).unwrap();
            writeln!(file, "not-a-date,xyz,1,0.5").unwrap();
        }
        store.append(&sample(day(2), &[("var", 11.0)], 2)).unwrap();

        let history = store.read_all();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].usage("var_gb"), Some(11.0));
    }

    #[test]
    fn test_absent_file_reads_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_in(&tmp);
        assert!(store.read_all().is_empty());
    }

    #[test]
    fn test_float_agent_count_accepted_by_truncation() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("master.csv");
        std::fs::write(&path, "date,var_gb,agent_count,agent_log_gb\n2025-06-01,10,12.0,0.5\n")
            .unwrap();

        let history = CsvStore::new(&path).read_all();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].agent_count, 12);
    }
}
