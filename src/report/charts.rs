use chrono::NaiveDate;
use std::fmt::Write as _;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 420.0;
const BAR_HEIGHT: f64 = 300.0;
const MARGIN_LEFT: f64 = 64.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 48.0;
const MARGIN_BOTTOM: f64 = 44.0;

const SERIES_COLORS: &[&str] = &[
    "#1e40af", "#dc2626", "#059669", "#d97706", "#7c3aed", "#0891b2", "#be185d", "#4b5563",
];

/// Multi-series line chart over calendar dates. Returns `None` when no series
/// has two or more points; the report shows a textual placeholder instead.
pub fn line_chart(
    title: &str,
    unit: &str,
    series: &[(String, Vec<(NaiveDate, f64)>)],
) -> Option<String> {
    if !series.iter().any(|(_, points)| points.len() >= 2) {
        return None;
    }

    let min_date = series.iter().flat_map(|(_, p)| p.iter()).map(|(d, _)| *d).min()?;
    let max_date = series.iter().flat_map(|(_, p)| p.iter()).map(|(d, _)| *d).max()?;
    let max_value = series
        .iter()
        .flat_map(|(_, p)| p.iter())
        .map(|(_, v)| *v)
        .fold(0.0f64, f64::max);

    let span_days = (max_date - min_date).num_days().max(1) as f64;
    let y_top = if max_value > 0.0 { max_value * 1.05 } else { 1.0 };
    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;

    let x = |d: NaiveDate| MARGIN_LEFT + (d - min_date).num_days() as f64 / span_days * plot_w;
    let y = |v: f64| MARGIN_TOP + (1.0 - v / y_top) * plot_h;

    let mut svg = frame(title, unit, WIDTH, HEIGHT, y_top, min_date, max_date);
    for (i, (name, points)) in series.iter().enumerate() {
        let color = SERIES_COLORS[i % SERIES_COLORS.len()];
        if points.len() >= 2 {
            let coords: Vec<String> = points
                .iter()
                .map(|(d, v)| format!("{:.1},{:.1}", x(*d), y(*v)))
                .collect();
            let _ = write!(
                svg,
                r#"<polyline fill="none" stroke="{}" stroke-width="2" points="{}"/>"#,
                color,
                coords.join(" ")
            );
        }
        for (d, v) in points {
            let _ = write!(
                svg,
                r#"<circle cx="{:.1}" cy="{:.1}" r="3" fill="{}"/>"#,
                x(*d),
                y(*v),
                color
            );
        }
        // Legend entry, one line per series in the top-right corner.
        let ly = 18.0 + i as f64 * 16.0;
        let _ = write!(
            svg,
            r##"<rect x="{:.1}" y="{:.1}" width="10" height="10" fill="{}"/><text x="{:.1}" y="{:.1}" font-size="12" fill="#333">{}</text>"##,
            WIDTH - 150.0,
            ly,
            color,
            WIDTH - 135.0,
            ly + 9.0,
            name
        );
    }
    svg.push_str("</svg>");
    Some(svg)
}

/// Per-date bar chart (used for daily ingestion deltas). Negative deltas hang
/// below the zero line. `None` below two bars.
pub fn bar_chart(title: &str, unit: &str, bars: &[(NaiveDate, f64)]) -> Option<String> {
    if bars.len() < 2 {
        return None;
    }

    let min_date = bars.iter().map(|(d, _)| *d).min()?;
    let max_date = bars.iter().map(|(d, _)| *d).max()?;
    let max_abs = bars.iter().map(|(_, v)| v.abs()).fold(0.0f64, f64::max);

    let span_days = (max_date - min_date).num_days().max(1) as f64;
    let y_top = if max_abs > 0.0 { max_abs * 1.05 } else { 1.0 };
    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = BAR_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let zero_y = MARGIN_TOP + plot_h / 2.0;
    let bar_w = (plot_w / bars.len() as f64 * 0.6).clamp(2.0, 24.0);

    let x = |d: NaiveDate| MARGIN_LEFT + (d - min_date).num_days() as f64 / span_days * plot_w;

    let mut svg = frame(title, unit, WIDTH, BAR_HEIGHT, y_top, min_date, max_date);
    for (d, v) in bars {
        let h = (v.abs() / y_top) * (plot_h / 2.0);
        let top = if *v >= 0.0 { zero_y - h } else { zero_y };
        let _ = write!(
            svg,
            r##"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="#1e40af"/>"##,
            x(*d) - bar_w / 2.0,
            top,
            bar_w,
            h.max(0.5)
        );
    }
    let _ = write!(
        svg,
        r##"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="#999" stroke-width="1"/>"##,
        MARGIN_LEFT,
        zero_y,
        WIDTH - MARGIN_RIGHT,
        zero_y
    );
    svg.push_str("</svg>");
    Some(svg)
}

/// Shared chart scaffolding: canvas, title, axes and end labels.
fn frame(
    title: &str,
    unit: &str,
    width: f64,
    height: f64,
    y_top: f64,
    min_date: NaiveDate,
    max_date: NaiveDate,
) -> String {
    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}">"#,
        w = width,
        h = height
    );
    let _ = write!(
        svg,
        r##"<rect width="{}" height="{}" fill="#ffffff"/>"##,
        width, height
    );
    let _ = write!(
        svg,
        r##"<text x="{:.1}" y="24" font-size="16" font-weight="bold" fill="#1e3a8a">{}</text>"##,
        MARGIN_LEFT, title
    );
    // Axes
    let _ = write!(
        svg,
        r##"<line x1="{l:.1}" y1="{t:.1}" x2="{l:.1}" y2="{b:.1}" stroke="#333" stroke-width="1"/><line x1="{l:.1}" y1="{b:.1}" x2="{r:.1}" y2="{b:.1}" stroke="#333" stroke-width="1"/>"##,
        l = MARGIN_LEFT,
        t = MARGIN_TOP,
        b = height - MARGIN_BOTTOM,
        r = width - MARGIN_RIGHT
    );
    // Scale labels: y max, and the two ends of the date range.
    let _ = write!(
        svg,
        r##"<text x="{:.1}" y="{:.1}" font-size="11" fill="#666" text-anchor="end">{:.1} {}</text>"##,
        MARGIN_LEFT - 6.0,
        MARGIN_TOP + 4.0,
        y_top,
        unit
    );
    let _ = write!(
        svg,
        r##"<text x="{:.1}" y="{:.1}" font-size="11" fill="#666">{}</text><text x="{:.1}" y="{:.1}" font-size="11" fill="#666" text-anchor="end">{}</text>"##,
        MARGIN_LEFT,
        height - MARGIN_BOTTOM + 16.0,
        min_date.format("%Y-%m-%d"),
        width - MARGIN_RIGHT,
        height - MARGIN_BOTTOM + 16.0,
        max_date.format("%Y-%m-%d")
    );
    svg
}
