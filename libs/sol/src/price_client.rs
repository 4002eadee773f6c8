use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const INTERVAL_MS: u64 = 60_000;
const MAX_DATA_POINTS: u32 = 179;

#[derive(Clone)]
pub struct PriceClient {
    client: Client,
    query_url: String,
}

impl PriceClient {
    pub fn new(query_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, query_url })
    }

    /// Current SOL spot price, queried over a one-second window ending now.
    pub async fn fetch_price(&self) -> Result<f64> {
        let now = Utc::now().timestamp_millis();

        let query = PanelQuery {
            interval_ms: INTERVAL_MS,
            max_data_points: MAX_DATA_POINTS,
            time_range: TimeRange {
                from: (now - 1000).to_string(),
                to: now.to_string(),
                timezone: "browser",
            },
        };

        let res: PanelResponse = self
            .client
            .post(&self.query_url)
            .json(&query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let raw = first_value(&res)
            .and_then(Value::as_str)
            .context("price missing from panel response")?;

        parse_price(raw)
    }
}

/// First cell of the first column of the first frame, if the response has one.
fn first_value(res: &PanelResponse) -> Option<&Value> {
    res.results
        .as_ref()?
        .a
        .as_ref()?
        .frames
        .first()?
        .data
        .as_ref()?
        .values
        .first()?
        .first()
}

fn parse_price(raw: &str) -> Result<f64> {
    let stripped = raw.strip_prefix('$').unwrap_or(raw);

    stripped
        .parse()
        .with_context(|| format!("price is not numeric: {raw:?}"))
}

//
// Match the Grafana panel-query JSON
//
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PanelQuery {
    interval_ms: u64,
    max_data_points: u32,
    time_range: TimeRange,
}

#[derive(Debug, Serialize)]
struct TimeRange {
    from: String,
    to: String,
    timezone: &'static str,
}

#[derive(Debug, Deserialize)]
struct PanelResponse {
    results: Option<PanelResults>,
}

#[derive(Debug, Deserialize)]
struct PanelResults {
    #[serde(rename = "A")]
    a: Option<RefResult>,
}

#[derive(Debug, Deserialize)]
struct RefResult {
    #[serde(default)]
    frames: Vec<Frame>,
}

#[derive(Debug, Deserialize)]
struct Frame {
    data: Option<FrameData>,
}

#[derive(Debug, Deserialize)]
struct FrameData {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}
