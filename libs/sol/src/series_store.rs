use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One spot-price observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub sol_price: f64,
}

/// Samples grouped by epoch key, in arrival order within each key.
pub type Series = BTreeMap<String, Vec<Sample>>;

/// Append `sample` under `epoch_key`, creating the sequence if the key is new.
pub fn upsert(series: &mut Series, epoch_key: &str, sample: Sample) {
    series.entry(epoch_key.to_string()).or_default().push(sample);
}

#[derive(Clone)]
pub struct SeriesStore {
    path: PathBuf,
}

impl SeriesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the persisted series. A missing, unreadable, or malformed file
    /// starts the series over empty; it is never an error.
    pub fn load(&self) -> Series {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Series::new(),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to read series file, starting empty"
                );
                return Series::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(series) => series,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "series file is malformed, starting empty"
                );
                Series::new()
            }
        }
    }

    /// Rewrite the whole series file. Not atomic; a crash mid-write can
    /// truncate the file, and the next load starts empty.
    pub fn save(&self, series: &Series) -> Result<()> {
        let json = serde_json::to_string_pretty(series)?;

        fs::write(&self.path, json).with_context(|| format!("failed to write {}", self.path.display()))
    }
}
