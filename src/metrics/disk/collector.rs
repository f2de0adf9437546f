use log::{debug, warn};
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tokio::time;

use super::types::{Dimension, Measurement};

/// Path prefixes that `du` must never walk: kernel pseudo-filesystems where
/// sizes are meaningless and traversal can stall.
const PSEUDO_FS_PREFIXES: &[&str] = &["/proc", "/sys", "/dev"];

/// Filter the candidate list down to the roots that exist on this host right
/// now, preserving candidate order so report columns stay deterministic.
/// A missing path is excluded, not an error.
pub fn discover(candidates: &[(String, String)]) -> Vec<Dimension> {
    let dims: Vec<Dimension> = candidates
        .iter()
        .filter(|(_, path)| Path::new(path).exists())
        .map(|(key, path)| Dimension::new(key, path))
        .collect();
    debug!(
        "Tracking {} of {} candidate roots: {:?}",
        dims.len(),
        candidates.len(),
        dims.iter().map(|d| d.key.as_str()).collect::<Vec<_>>()
    );
    dims
}

/// Measure bytes consumed under `path`, in gigabytes rounded to 2 decimals.
///
/// Pseudo-filesystems and nonexistent paths report 0 GB without spawning
/// anything. Everything else runs `du -sk` bounded by `timeout`; a failed,
/// unparseable or timed-out run yields `Unavailable`.
pub async fn measure_path(path: &str, timeout: Duration) -> Measurement {
    if PSEUDO_FS_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return Measurement::Gigabytes(0.0);
    }
    if !Path::new(path).exists() {
        return Measurement::Gigabytes(0.0);
    }

    let run = Command::new("du").args(["-sk", path]).output();
    let output = match time::timeout(timeout, run).await {
        Ok(Ok(output)) => output,
        Ok(Err(err)) => {
            warn!("du failed to start for {}: {}", path, err);
            return Measurement::Unavailable;
        }
        Err(_) => {
            warn!("du timed out for {} after {:?}", path, timeout);
            return Measurement::Unavailable;
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!("du failed for {}: {}", path, stderr.trim());
        return Measurement::Unavailable;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    match stdout.split_whitespace().next().and_then(|kb| kb.parse::<u64>().ok()) {
        Some(kb) => Measurement::Gigabytes(round2(kb as f64 / 1024.0 / 1024.0)),
        None => {
            warn!("du produced unparseable output for {}: {:?}", path, stdout.trim());
            Measurement::Unavailable
        }
    }
}

/// Measure every dimension in order. Each path gets its own timeout budget so
/// one slow root cannot starve the rest of the sample.
pub async fn measure_all(
    dimensions: &[Dimension],
    timeout: Duration,
) -> Vec<(Dimension, Measurement)> {
    let mut results = Vec::with_capacity(dimensions.len());
    for dim in dimensions {
        let measured = measure_path(&dim.path, timeout).await;
        debug!("{} ({}): {}", dim.key, dim.path, measured);
        results.push((dim.clone(), measured));
    }
    results
}

fn round2(gb: f64) -> f64 {
    (gb * 100.0).round() / 100.0
}
