//! Pricing and freight optimization engine for precast concrete quotations.
//!
//! This crate prices precast pieces from their bill of materials, general
//! costs, an adjustment scale and index escalation; packs budget pieces into
//! trucks and bills their freight; and estimates on-site assembly. All
//! reference data is read from a YAML-loaded, read-only snapshot.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod distance;
pub mod error;
pub mod logging;
pub mod models;
pub mod repository;
