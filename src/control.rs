//! Consumed HTTP control surface of the external agent
//!
//! Response types for the agency control API and thin fetch helpers. A
//! view is re-fetched on every poll and never cached across polls.

use std::collections::HashMap;

use serde::Deserialize;

/// Membership section of the agency control response
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AgencyConfiguration {
    /// All known agent ids mapped to their endpoints
    #[serde(default)]
    pub pool: HashMap<String, String>,
    /// Agent ids currently participating in consensus
    #[serde(default)]
    pub active: Vec<String>,
    /// Id of the responding agent
    #[serde(default)]
    pub id: String,
    /// Endpoint of the responding agent
    #[serde(default)]
    pub endpoint: String,
}

/// Result structure of the agency control API
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AgencyControl {
    /// Current election term
    #[serde(default)]
    pub term: u64,
    /// Leader id, empty while no leader is elected
    #[serde(rename = "leaderId", default)]
    pub leader_id: String,
    /// Membership as seen by the responding agent
    #[serde(default)]
    pub configuration: AgencyConfiguration,
}

/// Fetch the control view from the agent at `endpoint`.
///
/// Non-success statuses are turned into errors so callers can treat every
/// failure mode as a retry.
pub async fn fetch_config(
    http: &reqwest::Client,
    endpoint: &str,
) -> Result<AgencyControl, reqwest::Error> {
    http.get(format!("{}/_api/agency/config", endpoint))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
}

/// Probe the version endpoint; `Ok` means the agent answered with a
/// success status.
pub async fn probe_version(http: &reqwest::Client, endpoint: &str) -> Result<(), reqwest::Error> {
    http.get(format!("{}/_api/version", endpoint))
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}
