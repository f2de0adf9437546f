use std::fmt::Write as _;

use super::view::ReportView;
use crate::store::{AGENT_COUNT_COLUMN, AGENT_LOG_COLUMN, DATE_COLUMN};

/// Chart files written next to the report, by relative name. `None` means the
/// chart could not be drawn and the report shows a placeholder instead.
#[derive(Debug, Default)]
pub struct ChartFiles {
    pub disk: Option<String>,
    pub ingestion: Option<String>,
    pub agents: Option<String>,
}

const STYLE: &str = r#"
body { font-family: "Segoe UI", Tahoma, Geneva, Verdana, sans-serif; margin: 20px; background-color: #f7f9fb; color: #333; }
h1, h2, h3 { color: #1e3a8a; margin-bottom: 10px; }
.card { background-color: #ffffff; border: 1px solid #d1d5db; border-radius: 8px; padding: 15px; margin-bottom: 20px; box-shadow: 0 2px 6px rgba(0,0,0,0.05); }
.card ul { list-style-type: none; padding-left: 0; }
.card ul li { padding: 4px 0; border-bottom: 1px solid #e5e7eb; }
.table { width: 100%; border-collapse: collapse; margin-top: 10px; }
.table th, .table td { border: 1px solid #d1d5db; padding: 8px; text-align: left; }
.table th { background-color: #1e40af; color: #ffffff; }
.table tr:nth-child(even) { background-color: #f3f4f6; }
img { max-width: 100%; height: auto; border: 1px solid #d1d5db; border-radius: 6px; margin-top: 10px; }
footer { margin-top: 30px; color: #6b7280; font-size: 12px; text-align: center; }
"#;

/// Render the report artifact. Self-contained apart from the sibling SVG
/// files referenced by relative name; renders for zero, one or many rows.
pub fn render(view: &ReportView, charts: &ChartFiles) -> String {
    let mut html = String::new();

    let _ = write!(
        html,
        "<html>\n<head>\n<meta charset=\"utf-8\">\n<title>SIEM Server Sizing Report - {date}</title>\n<style>{style}</style>\n</head>\n<body>\n<h1>SIEM Server Sizing Report</h1>\n",
        date = view.generated_on.format("%Y-%m-%d"),
        style = STYLE
    );

    let _ = write!(
        html,
        "<div class=\"card\">\n<strong>Date:</strong> {}<br>\n<strong>Host:</strong> {}<br>\n<strong>Agent count:</strong> {}<br>\n<strong>Total agent logs (GB):</strong> {}<br>\n</div>\n",
        view.generated_on.format("%Y-%m-%d"),
        view.hostname,
        view.agent_count,
        view.agent_log_gb
    );

    html.push_str("<div class=\"card\">\n<strong>Latest sizes (GB):</strong>\n<ul>\n");
    if view.latest.is_empty() {
        html.push_str("<li>no history yet</li>\n");
    }
    for (column, gb) in &view.latest {
        let _ = write!(html, "<li>{} : {}</li>\n", column.trim_end_matches("_gb"), gb);
    }
    html.push_str("</ul>\n</div>\n");

    let _ = write!(
        html,
        "<div class=\"card\">\n<strong>Projection (linear)</strong>\n<ul>\n<li>Projected /var in 180 days: {} GB</li>\n<li>Projected /var in 365 days: {} GB</li>\n</ul>\n</div>\n",
        projection_text(view.projection_180),
        projection_text(view.projection_365)
    );

    html.push_str("<h2>Graphs</h2>\n");
    chart_card(&mut html, "Disk Growth", charts.disk.as_deref(), "No disk growth chart yet");
    chart_card(&mut html, "Daily Ingestion", charts.ingestion.as_deref(), "No ingestion chart yet");
    chart_card(&mut html, "Agent Growth", charts.agents.as_deref(), "No agent chart yet");

    html.push_str("<div class=\"card\">\n");
    recent_table(&mut html, view);
    html.push_str("</div>\n");

    let _ = write!(
        html,
        "<footer><p>SIEM server growth &amp; log volume report &mdash; generated {}</p></footer>\n</body>\n</html>\n",
        view.generated_on.format("%Y-%m-%d")
    );
    html
}

fn projection_text(projection: Option<f64>) -> String {
    match projection {
        Some(gb) => format!("{}", gb),
        None => "N/A".to_string(),
    }
}

fn chart_card(html: &mut String, title: &str, file: Option<&str>, placeholder: &str) {
    let _ = write!(html, "<div class=\"card\">\n<h3>{}</h3>\n", title);
    match file {
        Some(name) => {
            let _ = write!(html, "<img src=\"{}\" alt=\"{}\">\n", name, title);
        }
        None => {
            let _ = write!(html, "<p>{}</p>\n", placeholder);
        }
    }
    html.push_str("</div>\n");
}

fn recent_table(html: &mut String, view: &ReportView) {
    html.push_str("<table class=\"table\">\n<tr>");
    let _ = write!(html, "<th>{}</th>", DATE_COLUMN);
    for column in &view.columns {
        let _ = write!(html, "<th>{}</th>", column);
    }
    let _ = write!(html, "<th>{}</th><th>{}</th></tr>\n", AGENT_COUNT_COLUMN, AGENT_LOG_COLUMN);

    if view.recent.is_empty() {
        let cols = view.columns.len() + 3;
        let _ = write!(html, "<tr><td colspan=\"{}\">no samples recorded yet</td></tr>\n", cols);
    }
    for sample in &view.recent {
        let _ = write!(html, "<tr><td>{}</td>", sample.date.format("%Y-%m-%d"));
        for column in &view.columns {
            match sample.usage(column) {
                Some(gb) => {
                    let _ = write!(html, "<td>{}</td>", gb);
                }
                None => html.push_str("<td></td>"),
            }
        }
        let _ = write!(
            html,
            "<td>{}</td><td>{}</td></tr>\n",
            sample.agent_count, sample.agent_log_gb
        );
    }
    html.push_str("</table>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::view::build_view;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
    }

    #[test]
    fn test_empty_history_renders_placeholders() {
        let view = build_view(&[], today(), "siem01".into(), None, None);
        let html = render(&view, &ChartFiles::default());

        assert!(html.contains("No disk growth chart yet"));
        assert!(html.contains("no samples recorded yet"));
        assert!(html.contains("Projected /var in 180 days: N/A GB"));
        assert!(html.contains("siem01"));
    }

    #[test]
    fn test_charts_referenced_by_relative_name() {
        let view = build_view(&[], today(), "siem01".into(), Some(199.0), Some(384.0));
        let charts = ChartFiles {
            disk: Some("disk_growth.svg".to_string()),
            ingestion: None,
            agents: Some("agent_growth.svg".to_string()),
        };
        let html = render(&view, &charts);

        assert!(html.contains("src=\"disk_growth.svg\""));
        assert!(html.contains("src=\"agent_growth.svg\""));
        assert!(html.contains("No ingestion chart yet"));
        assert!(html.contains("Projected /var in 180 days: 199 GB"));
    }
}
