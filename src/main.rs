mod api;
mod config;
mod metrics;
mod projection;
mod report;
mod store;

use anyhow::Result;
use chrono::Local;
use dotenv::dotenv;
use log::{info, warn};

use api::DirectoryClient;
use config::Config;
use metrics::{discover, measure_all, measure_path};
use report::{build_view, PRIMARY_COLUMN};
use store::{CsvStore, Sample};

/// One unattended run: discover tracked roots, sample usage and the agent
/// count, append the row, then rebuild projections and the report from the
/// full history. Every external failure degrades to a default; only I/O on
/// the output location itself can abort the run.
#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenv().ok();

    // Initialize logging
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();
    info!(
        "Starting sizing run: API at {}, output under {}",
        config.api_url,
        config.output_dir.display()
    );

    let dimensions = discover(&config.track_dirs);
    info!(
        "Tracking {} of {} candidate roots",
        dimensions.len(),
        config.track_dirs.len()
    );

    let agent_count = match DirectoryClient::new(
        config.api_url.clone(),
        config.api_user.clone(),
        config.api_pass.clone(),
        config.verify_tls,
        config.api_timeout,
    ) {
        Ok(client) => match client.count_agents().await {
            Ok(count) => count,
            Err(err) => {
                warn!("Could not fetch agent count, recording 0: {:#}", err);
                0
            }
        },
        Err(err) => {
            warn!("Could not build directory client, recording 0 agents: {:#}", err);
            0
        }
    };

    let measured = measure_all(&dimensions, config.du_timeout).await;
    let agent_log = measure_path(&config.agent_log_dir, config.du_timeout).await;

    let today = Local::now().date_naive();
    let sample = Sample::assemble(&measured, agent_count, agent_log, today);

    let store = CsvStore::new(config.csv_path());
    store.append(&sample)?;
    info!("Appended today's sample to {}", store.path().display());

    let history = store.read_all();
    let projection_180 = projection::project(&history, PRIMARY_COLUMN, 180);
    let projection_365 = projection::project(&history, PRIMARY_COLUMN, 365);

    let host = hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown".to_string());
    let view = build_view(&history, today, host, projection_180, projection_365);
    let html_path = report::write_report(&config.output_dir, &view, &history)?;

    info!(
        "Run complete: {} rows of history, report at {}",
        history.len(),
        html_path.display()
    );
    Ok(())
}
