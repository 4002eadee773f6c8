use anyhow::Result;
use chrono::Utc;
use sol::{EpochClient, PriceClient, Sample, SeriesStore, upsert};
use tracing::{debug, info, instrument, warn};

/// One fetch-merge-persist round. A failed source fetch skips the round
/// without touching the store; only a failed write surfaces to the caller.
#[instrument(name = "update_cycle", skip_all)]
pub async fn run_once(
    price_client: &PriceClient,
    epoch_client: &EpochClient,
    store: &SeriesStore,
) -> Result<()> {
    let sol_price = match price_client.fetch_price().await {
        Ok(price) => {
            debug!(price, "fetched spot price");
            price
        }
        Err(e) => {
            warn!(error = ?e, "fetch_price failed, skipping cycle");
            return Ok(());
        }
    };

    let epoch_key = match epoch_client.fetch_epoch().await {
        Ok(epoch) => {
            debug!(epoch = %epoch, "fetched epoch");
            epoch
        }
        Err(e) => {
            warn!(error = ?e, "fetch_epoch failed, skipping cycle");
            return Ok(());
        }
    };

    // Stamped here, not reused from the price query window.
    let timestamp = Utc::now().timestamp_millis();

    let mut series = store.load();
    upsert(
        &mut series,
        &epoch_key,
        Sample {
            timestamp,
            sol_price,
        },
    );
    store.save(&series)?;

    info!(epoch = %epoch_key, price = sol_price, "sample recorded");

    Ok(())
}
