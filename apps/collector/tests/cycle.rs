use std::time::Duration;

use chrono::Utc;
use collector::cycle;
use httpmock::prelude::*;
use serde_json::json;
use sol::{EpochClient, EpochPolicy, PriceClient, SeriesStore};
use tempfile::tempdir;

const TIMEOUT: Duration = Duration::from_secs(2);

fn panel_body(price: &str) -> serde_json::Value {
    json!({
        "results": { "A": { "frames": [ { "data": { "values": [[price]] } } ] } }
    })
}

fn stats_body(epoch: u64) -> serde_json::Value {
    json!({ "NetworkStats": { "epoch": epoch } })
}

fn price_client(server: &MockServer) -> PriceClient {
    PriceClient::new(server.url("/query"), TIMEOUT).unwrap()
}

fn epoch_client(server: &MockServer) -> EpochClient {
    EpochClient::new(server.url("/api/stats"), EpochPolicy::Fetched, TIMEOUT).unwrap()
}

#[tokio::test]
async fn two_cycles_append_under_the_shared_epoch_key() {
    let server = MockServer::start_async().await;
    let dir = tempdir().unwrap();
    let store = SeriesStore::new(dir.path().join("data.json"));

    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/stats");
            then.status(200).json_body(stats_body(7));
        })
        .await;
    let mut first_price = server
        .mock_async(|when, then| {
            when.method(POST).path("/query");
            then.status(200).json_body(panel_body("$142.37"));
        })
        .await;

    let before = Utc::now().timestamp_millis();
    cycle::run_once(&price_client(&server), &epoch_client(&server), &store)
        .await
        .unwrap();

    first_price.delete_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/query");
            then.status(200).json_body(panel_body("$143.00"));
        })
        .await;

    cycle::run_once(&price_client(&server), &epoch_client(&server), &store)
        .await
        .unwrap();
    let after = Utc::now().timestamp_millis();

    let series = store.load();
    assert_eq!(series.len(), 1);

    let samples = &series["7"];
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].sol_price, 142.37);
    assert_eq!(samples[1].sol_price, 143.00);
    assert!(samples.iter().all(|s| (before..=after).contains(&s.timestamp)));
    assert!(samples[0].timestamp <= samples[1].timestamp);
}

#[tokio::test]
async fn failed_price_fetch_skips_the_epoch_fetch_and_the_store() {
    let server = MockServer::start_async().await;
    let dir = tempdir().unwrap();
    let data_file = dir.path().join("data.json");
    let store = SeriesStore::new(&data_file);

    server
        .mock_async(|when, then| {
            when.method(POST).path("/query");
            then.status(500);
        })
        .await;
    let stats = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/stats");
            then.status(200).json_body(stats_body(7));
        })
        .await;

    cycle::run_once(&price_client(&server), &epoch_client(&server), &store)
        .await
        .unwrap();

    assert_eq!(stats.hits_async().await, 0);
    assert!(!data_file.exists());
}

#[tokio::test]
async fn failed_epoch_fetch_discards_the_price_reading() {
    let server = MockServer::start_async().await;
    let dir = tempdir().unwrap();
    let data_file = dir.path().join("data.json");
    let store = SeriesStore::new(&data_file);

    let price = server
        .mock_async(|when, then| {
            when.method(POST).path("/query");
            then.status(200).json_body(panel_body("$142.37"));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/stats");
            then.status(500);
        })
        .await;

    cycle::run_once(&price_client(&server), &epoch_client(&server), &store)
        .await
        .unwrap();

    assert_eq!(price.hits_async().await, 1);
    assert!(!data_file.exists());
}

#[tokio::test]
async fn malformed_price_payload_leaves_the_store_unchanged() {
    let server = MockServer::start_async().await;
    let dir = tempdir().unwrap();
    let data_file = dir.path().join("data.json");
    let store = SeriesStore::new(&data_file);

    server
        .mock_async(|when, then| {
            when.method(POST).path("/query");
            then.status(200)
                .json_body(json!({ "results": { "A": { "frames": [] } } }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/stats");
            then.status(200).json_body(stats_body(7));
        })
        .await;

    cycle::run_once(&price_client(&server), &epoch_client(&server), &store)
        .await
        .unwrap();

    assert!(!data_file.exists());
}

#[tokio::test]
async fn failed_save_surfaces_to_the_caller() {
    let server = MockServer::start_async().await;
    let dir = tempdir().unwrap();
    // the store path is a directory, so the write fails
    let store = SeriesStore::new(dir.path());

    server
        .mock_async(|when, then| {
            when.method(POST).path("/query");
            then.status(200).json_body(panel_body("$142.37"));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/stats");
            then.status(200).json_body(stats_body(7));
        })
        .await;

    let res = cycle::run_once(&price_client(&server), &epoch_client(&server), &store).await;

    assert!(res.is_err());
}
