use anyhow::Result;
use collector::{config::Config, cycle};
use sol::{EpochClient, PriceClient, SeriesStore};
use tokio::time::sleep;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let price_client = PriceClient::new(config.price_url.clone(), config.request_timeout)?;
    let epoch_client = EpochClient::new(
        config.epoch_url.clone(),
        config.epoch_policy.clone(),
        config.request_timeout,
    )?;
    let store = SeriesStore::new(&config.data_file);

    info!(
        interval_secs = config.update_interval.as_secs(),
        data_file = %config.data_file,
        "starting data collection"
    );

    // Installed before the loop so a signal arriving mid-cycle is picked up
    // at the next sleep boundary; the running cycle always completes.
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut iteration = 0u64;
    loop {
        iteration += 1;

        if let Err(e) = cycle::run_once(&price_client, &epoch_client, &store).await {
            error!(error = ?e, iteration, "update cycle failed");
        }

        tokio::select! {
            _ = &mut shutdown => break,
            _ = sleep(config.update_interval) => {}
        }
    }

    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::{
            select,
            signal::unix::{SignalKind, signal},
        };
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
        select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv()  => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
