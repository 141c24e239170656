//! Configuration loading and management for the pricing engine.
//!
//! This module loads a plant's reference data from YAML files: the catalog,
//! versioned cost parameters, adjustment scales, monthly indices, freight and
//! assembly rates, and the engine policies that govern fallbacks.
//!
//! # Example
//!
//! ```no_run
//! use pricing_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/precast").unwrap();
//! println!("Loaded plant: {}", config.plant().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AdjustmentPolicy, AssemblyTiers, BillingPolicy, DEFAULT_DISTANCE_TIMEOUT_MS,
    DistanceSettings, EnginePolicies, EscalationWeights, FreightPolicy, FreightTier,
    LEGACY_ADJUSTMENT_FACTOR, LEGACY_DISCOUNT_FACTOR, LEGACY_SPECIAL_ADJUSTMENT,
    LegacyAdjustmentFactors, NoScaleBehavior, PlantMetadata, PricingConfig, RateColumn, Route,
    default_trucks,
};
