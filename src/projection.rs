use crate::store::Sample;

/// Linear capacity projection for one dimension.
///
/// Deliberately a two-point (first/last) trend rather than a regression over
/// all rows: robust to noisy middle samples, sensitive to endpoint outliers,
/// and easy to explain on a capacity-planning call. `None` means the history
/// underdetermines the trend (fewer than 2 rows, or the dimension has no
/// value at an endpoint) — that is a reportable state, not an error.
pub fn project(history: &[Sample], column: &str, horizon_days: i64) -> Option<f64> {
    if history.len() < 2 {
        return None;
    }

    let first = history.first()?;
    let last = history.last()?;
    let first_gb = first.usage(column)?;
    let last_gb = last.usage(column)?;

    // Floor of 1 guards the divide-by-zero when every row shares one date.
    let elapsed_days = (last.date - first.date).num_days().max(1);
    let slope = (last_gb - first_gb) / elapsed_days as f64;
    let projected = last_gb + slope * horizon_days as f64;
    if !projected.is_finite() {
        return None;
    }
    Some((projected * 100.0).round() / 100.0)
}
