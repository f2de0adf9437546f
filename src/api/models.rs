use serde::Deserialize;
use serde_json::Value;

/// Response to the authentication request: `{"data": {"token": "..."}}`.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub data: AuthData,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuthData {
    pub token: Option<String>,
}

/// Response to the agent listing: `{"data": {"affected_items": [...]}}`.
/// Older API versions ship the list under `items` instead.
#[derive(Debug, Deserialize)]
pub struct AgentsResponse {
    #[serde(default)]
    pub data: AgentsData,
}

#[derive(Debug, Default, Deserialize)]
pub struct AgentsData {
    #[serde(default)]
    pub affected_items: Vec<Value>,
    #[serde(default)]
    pub items: Vec<Value>,
}

impl AgentsResponse {
    /// Number of registered agents in this response.
    pub fn agent_count(&self) -> u64 {
        if !self.data.affected_items.is_empty() {
            self.data.affected_items.len() as u64
        } else {
            self.data.items.len() as u64
        }
    }
}
