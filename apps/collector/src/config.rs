use std::env::var;
use std::time::Duration;

use anyhow::{Context, Result};
use sol::EpochPolicy;

const DEFAULT_PRICE_URL: &str =
    "https://jetski.grafana.net/api/public/dashboards/554eb1bf2d224a9eaaf15d4b98b5f4e4/panels/12/query";
const DEFAULT_EPOCH_URL: &str = "https://jetskipoolapi.xyz/api/stats";
const DEFAULT_DATA_FILE: &str = "data.json";
const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 3600;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Clone)]
pub struct Config {
    pub price_url: String,
    pub epoch_url: String,
    pub data_file: String,
    /// Sleep between the end of one cycle and the start of the next.
    pub update_interval: Duration,
    pub request_timeout: Duration,
    pub epoch_policy: EpochPolicy,
}

impl Config {
    /// Read configuration from the environment. Every knob has a default;
    /// only a malformed numeric override is an error.
    ///
    /// - `PRICE_URL`, `EPOCH_URL`: feed endpoints
    /// - `DATA_FILE`: series file path (default `data.json`)
    /// - `UPDATE_INTERVAL_SECS`: default 3600
    /// - `REQUEST_TIMEOUT_SECS`: default 10
    /// - `EPOCH_PINNED`: when set, group every sample under this fixed key
    pub fn from_env() -> Result<Self> {
        let epoch_policy = match var("EPOCH_PINNED") {
            Ok(key) => EpochPolicy::Pinned(key),
            Err(_) => EpochPolicy::Fetched,
        };

        Ok(Self {
            price_url: var("PRICE_URL").unwrap_or_else(|_| DEFAULT_PRICE_URL.to_string()),
            epoch_url: var("EPOCH_URL").unwrap_or_else(|_| DEFAULT_EPOCH_URL.to_string()),
            data_file: var("DATA_FILE").unwrap_or_else(|_| DEFAULT_DATA_FILE.to_string()),
            update_interval: secs_var("UPDATE_INTERVAL_SECS", DEFAULT_UPDATE_INTERVAL_SECS)?,
            request_timeout: secs_var("REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            epoch_policy,
        })
    }
}

fn secs_var(name: &str, default: u64) -> Result<Duration> {
    let secs = match var(name) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{name} is not a number: {raw:?}"))?,
        Err(_) => default,
    };

    Ok(Duration::from_secs(secs))
}
