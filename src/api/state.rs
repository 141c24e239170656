//! Shared application state for the pricing engine API.

use std::sync::Arc;
use std::time::Duration;

use crate::config::ConfigLoader;
use crate::distance::StaticDistanceTable;

/// Shared application state.
///
/// Holds the loaded reference-data snapshot and the distance table built
/// from it. Both are immutable and shared between requests.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigLoader>,
    distances: Arc<StaticDistanceTable>,
}

impl AppState {
    /// Creates the application state from a loaded configuration.
    pub fn new(config: ConfigLoader) -> Self {
        let distances = StaticDistanceTable::from_routes(config.config().routes());
        Self {
            config: Arc::new(config),
            distances: Arc::new(distances),
        }
    }

    /// Returns the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the distance table.
    pub fn distances(&self) -> &StaticDistanceTable {
        &self.distances
    }

    /// Deadline for distance resolution.
    pub fn distance_timeout(&self) -> Duration {
        Duration::from_millis(self.config.config().policies().distance.timeout_ms)
    }
}
