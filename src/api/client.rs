use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use reqwest::Client;
use std::time::Duration;

use super::models::{AgentsResponse, AuthResponse};

/// Client for the agent directory API (Wazuh-style two-step flow: basic-auth
/// token exchange, then a Bearer-authenticated agent listing).
///
/// Every call carries the configured timeout so a stalled manager node cannot
/// hang the run. Callers are expected to fold any error into an agent count
/// of 0 — a missing count must never abort the report.
pub struct DirectoryClient {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

impl DirectoryClient {
    pub fn new(
        base_url: String,
        username: String,
        password: String,
        verify_tls: bool,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            // Self-signed certs on localhost are the norm for these managers.
            .danger_accept_invalid_certs(!verify_tls)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url,
            username,
            password,
        })
    }

    /// Count the agents currently registered with the directory.
    pub async fn count_agents(&self) -> Result<u64> {
        let token = self.authenticate().await?;
        let endpoint = format!("{}/agents", self.base_url);
        debug!("Fetching agent list from {}", endpoint);

        let response = self
            .client
            .get(&endpoint)
            .bearer_auth(&token)
            .send()
            .await
            .with_context(|| format!("Agent listing request to {} failed", endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Agent listing failed ({}): {}", status, body));
        }

        let agents: AgentsResponse = response
            .json()
            .await
            .context("Failed to parse agent listing response")?;
        let count = agents.agent_count();
        info!("Directory reports {} registered agents", count);
        Ok(count)
    }

    /// Exchange the configured credentials for a bearer token.
    async fn authenticate(&self) -> Result<String> {
        let endpoint = format!("{}/security/user/authenticate", self.base_url);
        debug!("Authenticating against {}", endpoint);

        let response = self
            .client
            .post(&endpoint)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .with_context(|| format!("Authentication request to {} failed", endpoint))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Authentication failed with status {}", status));
        }

        let auth: AuthResponse = response
            .json()
            .await
            .context("Failed to parse authentication response")?;
        auth.data
            .token
            .ok_or_else(|| anyhow!("Authentication response carried no token"))
    }
}
