use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default candidate roots tracked on a SIEM host. Which of these actually
/// become columns is decided per run by path existence (see `metrics::disk`).
pub const DEFAULT_TRACK_DIRS: &[(&str, &str)] = &[
    ("var", "/var"),
    ("var_log", "/var/log"),
    ("var_lib", "/var/lib"),
    ("var_ossec", "/var/ossec"),
    ("root", "/"),
    ("usr", "/usr"),
    ("home", "/home"),
    ("opt", "/opt"),
];

/// Process-wide configuration, read once from the environment at startup and
/// passed by reference into each component. A `.env` file is loaded
/// best-effort before this is built.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the agent directory API (e.g. https://localhost:55000).
    pub api_url: String,
    pub api_user: String,
    pub api_pass: String,
    /// Verify the API's TLS certificate. Off by default: these hosts run
    /// self-signed certs on localhost.
    pub verify_tls: bool,
    /// Directory receiving the CSV, HTML report and chart files.
    pub output_dir: PathBuf,
    /// Candidate (key, path) pairs to track, in report column order.
    pub track_dirs: Vec<(String, String)>,
    /// Root whose size is reported as the agent-log volume.
    pub agent_log_dir: String,
    /// Budget for one `du` invocation.
    pub du_timeout: Duration,
    /// Budget for one directory API call.
    pub api_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let output_dir = env::var("SIZING_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("monitor")
            });

        let track_dirs = env::var("SIZING_TRACK_DIRS")
            .ok()
            .map(|raw| parse_track_dirs(&raw))
            .filter(|dirs| !dirs.is_empty())
            .unwrap_or_else(|| {
                DEFAULT_TRACK_DIRS
                    .iter()
                    .map(|(k, p)| (k.to_string(), p.to_string()))
                    .collect()
            });

        Self {
            api_url: env::var("SIZING_API_URL")
                .unwrap_or_else(|_| "https://localhost:55000".to_string()),
            api_user: env::var("SIZING_API_USER").unwrap_or_default(),
            api_pass: env::var("SIZING_API_PASS").unwrap_or_default(),
            verify_tls: env::var("SIZING_VERIFY_TLS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            output_dir,
            track_dirs,
            agent_log_dir: env::var("SIZING_AGENT_LOG_DIR")
                .unwrap_or_else(|_| "/var/ossec/logs".to_string()),
            du_timeout: Duration::from_secs(
                env::var("SIZING_DU_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),
            api_timeout: Duration::from_secs(
                env::var("SIZING_API_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(15),
            ),
        }
    }

    pub fn csv_path(&self) -> PathBuf {
        self.output_dir.join("server_sizing_master.csv")
    }

    pub fn html_path(&self) -> PathBuf {
        self.output_dir.join("server_sizing_report.html")
    }
}

/// Parse a `key=path;key=path` override list. Malformed entries are dropped.
fn parse_track_dirs(raw: &str) -> Vec<(String, String)> {
    raw.split(';')
        .filter_map(|entry| {
            let (key, path) = entry.split_once('=')?;
            let key = key.trim();
            let path = path.trim();
            if key.is_empty() || path.is_empty() {
                return None;
            }
            Some((key.to_string(), path.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_track_dirs() {
        let dirs = parse_track_dirs("var=/var;opt=/opt");
        assert_eq!(
            dirs,
            vec![
                ("var".to_string(), "/var".to_string()),
                ("opt".to_string(), "/opt".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_track_dirs_skips_malformed() {
        let dirs = parse_track_dirs("var=/var;bogus;=nopath;nokey=;home=/home");
        assert_eq!(
            dirs,
            vec![
                ("var".to_string(), "/var".to_string()),
                ("home".to_string(), "/home".to_string()),
            ]
        );
    }
}
