mod epoch_client;
mod price_client;
mod series_store;

pub use epoch_client::{EpochClient, EpochPolicy};
pub use price_client::PriceClient;
pub use series_store::{Sample, Series, SeriesStore, upsert};
