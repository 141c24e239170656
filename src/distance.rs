//! Distance resolution between the plant and a delivery site.
//!
//! Distances are an external input. The engine ships a static table loaded
//! from `distances.yaml`; other resolvers (a routing service, say) plug in
//! through [`DistanceResolver`]. Every resolution runs under a deadline so a
//! slow resolver fails the request instead of hanging it.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::Route;
use crate::error::{EngineError, EngineResult};

/// Resolves a road distance in km.
pub trait DistanceResolver: Send + Sync {
    /// Returns the distance from `origin` to `destination`.
    fn distance_km(
        &self,
        origin: &str,
        destination: &str,
    ) -> impl Future<Output = EngineResult<Decimal>> + Send;
}

/// A fixed origin/destination table.
#[derive(Debug, Clone, Default)]
pub struct StaticDistanceTable {
    routes: HashMap<(String, String), Decimal>,
}

impl StaticDistanceTable {
    /// Builds a table from configured routes. Later duplicates win.
    pub fn from_routes(routes: &[Route]) -> Self {
        let routes = routes
            .iter()
            .map(|r| ((r.origin.clone(), r.destination.clone()), r.km))
            .collect();
        Self { routes }
    }

    /// Number of known routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no routes are known.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    fn lookup(&self, origin: &str, destination: &str) -> EngineResult<Decimal> {
        self.routes
            .get(&(origin.to_string(), destination.to_string()))
            .copied()
            .ok_or_else(|| EngineError::DistanceNotFound {
                origin: origin.to_string(),
                destination: destination.to_string(),
            })
    }
}

impl DistanceResolver for StaticDistanceTable {
    async fn distance_km(&self, origin: &str, destination: &str) -> EngineResult<Decimal> {
        self.lookup(origin, destination)
    }
}

/// Resolves a distance, failing with [`EngineError::DistanceTimeout`] if the
/// resolver does not answer within `timeout`.
pub async fn resolve_distance<D>(
    resolver: &D,
    origin: &str,
    destination: &str,
    timeout: Duration,
) -> EngineResult<Decimal>
where
    D: DistanceResolver,
{
    match tokio::time::timeout(timeout, resolver.distance_km(origin, destination)).await {
        Ok(result) => {
            if let Ok(km) = &result {
                debug!(origin, destination, %km, "Distance resolved");
            }
            result
        }
        Err(_) => {
            let timeout_ms = timeout.as_millis() as u64;
            warn!(origin, destination, timeout_ms, "Distance resolution timed out");
            Err(EngineError::DistanceTimeout { timeout_ms })
        }
    }
}
