use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;

/// How the grouping key for new samples is chosen once the stats fetch
/// has succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpochPolicy {
    /// Group samples under the epoch reported by the network-status feed.
    Fetched,
    /// Group everything under a fixed key. The feed is still consulted,
    /// so an unreachable feed keeps skipping cycles.
    Pinned(String),
}

#[derive(Clone)]
pub struct EpochClient {
    client: Client,
    stats_url: String,
    policy: EpochPolicy,
}

impl EpochClient {
    pub fn new(stats_url: String, policy: EpochPolicy, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            stats_url,
            policy,
        })
    }

    /// Current epoch as a grouping key.
    pub async fn fetch_epoch(&self) -> Result<String> {
        let res: StatsResponse = self
            .client
            .get(&self.stats_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let epoch = res
            .network_stats
            .and_then(|stats| stats.epoch)
            .context("epoch missing from stats response")?;

        Ok(match &self.policy {
            EpochPolicy::Fetched => epoch.to_string(),
            EpochPolicy::Pinned(key) => key.clone(),
        })
    }
}

//
// Match the pool stats JSON
//
#[derive(Debug, Deserialize)]
struct StatsResponse {
    #[serde(rename = "NetworkStats")]
    network_stats: Option<NetworkStats>,
}

#[derive(Debug, Deserialize)]
struct NetworkStats {
    epoch: Option<u64>,
}
