//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading a plant's
//! reference data from YAML files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{Material, MonthlyIndex, Period, Piece};

use super::types::{
    AdjustmentScalesFile, AssemblyFile, CatalogFile, CostParametersFile, DistancesFile,
    EnginePolicies, FreightFile, PlantFile, PlantMetadata, PricingConfig,
};

/// Loads and provides access to a plant's reference data.
///
/// The `ConfigLoader` reads YAML configuration files from a directory,
/// validates them as a whole and exposes the resulting [`PricingConfig`].
///
/// # Directory Structure
///
/// ```text
/// config/precast/
/// ├── plant.yaml             # Plant metadata and engine policies
/// ├── catalog.yaml           # Materials and pieces with their BOM
/// ├── cost_parameters.yaml   # Versioned general cost rates
/// ├── adjustment_scales.yaml # Discount/markup scales
/// ├── freight.yaml           # Trucks, tiers, billing policy and rates
/// ├── assembly.yaml          # Tonnage tiers and crane mobilization rates
/// ├── distances.yaml         # Known road distances
/// └── indices/
///     └── 2025-01.yaml       # Monthly price index snapshot
/// ```
///
/// # Example
///
/// ```no_run
/// use pricing_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/precast").unwrap();
/// let piece = loader.get_piece("VIG-30").unwrap();
/// println!("Piece: {}", piece.name);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PricingConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Any required file or the `indices/` directory is missing
    /// - Any file contains invalid YAML
    /// - An index file's period does not match its file name
    /// - The files are inconsistent with each other (see [`PricingConfig::validate`])
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let plant = Self::load_yaml::<PlantFile>(&path.join("plant.yaml"))?;
        let catalog = Self::load_yaml::<CatalogFile>(&path.join("catalog.yaml"))?;
        let parameters = Self::load_yaml::<CostParametersFile>(&path.join("cost_parameters.yaml"))?;
        let scales = Self::load_yaml::<AdjustmentScalesFile>(&path.join("adjustment_scales.yaml"))?;
        let freight = Self::load_yaml::<FreightFile>(&path.join("freight.yaml"))?;
        let assembly = Self::load_yaml::<AssemblyFile>(&path.join("assembly.yaml"))?;
        let distances = Self::load_yaml::<DistancesFile>(&path.join("distances.yaml"))?;
        let indices = Self::load_indices(&path.join("indices"))?;

        let policies = EnginePolicies {
            adjustment: plant.adjustment,
            escalation: plant.escalation,
            distance: plant.distance,
            freight: freight.policy,
            assembly: assembly.tiers,
        };

        let config = PricingConfig::new(plant.metadata)
            .with_policies(policies)
            .with_materials(catalog.materials)
            .with_pieces(catalog.pieces)
            .with_cost_parameters(parameters.parameters)
            .with_adjustment_scales(scales.scales)
            .with_trucks(freight.trucks)
            .with_freight_rates(freight.rates)
            .with_assembly_rates(assembly.rates)
            .with_routes(distances.routes)
            .with_monthly_indices(indices);
        config.validate()?;

        debug!(
            plant = %config.metadata().code,
            materials = config.materials().len(),
            pieces = config.pieces().len(),
            indices = config.monthly_indices().len(),
            "Loaded pricing configuration"
        );

        Ok(Self { config })
    }

    /// Wraps an already-built configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] if the configuration is inconsistent.
    pub fn from_config(config: PricingConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all monthly index files from the indices directory.
    ///
    /// An empty directory is accepted: escalation then degrades to K = 1.
    fn load_indices(indices_dir: &Path) -> EngineResult<Vec<MonthlyIndex>> {
        let indices_dir_str = indices_dir.display().to_string();

        let entries = fs::read_dir(indices_dir).map_err(|_| EngineError::ConfigNotFound {
            path: indices_dir_str.clone(),
        })?;

        let mut indices = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: indices_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                let index = Self::load_yaml::<MonthlyIndex>(&path)?;
                let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
                if let Ok(named) = stem.parse::<Period>() {
                    if named != index.period {
                        return Err(EngineError::InvalidConfig {
                            message: format!(
                                "index file '{}' contains period {}",
                                path.display(),
                                index.period
                            ),
                        });
                    }
                }
                indices.push(index);
            }
        }

        indices.sort_by_key(|i| i.period);
        Ok(indices)
    }

    /// Returns the underlying pricing configuration.
    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Returns the plant metadata.
    pub fn plant(&self) -> &PlantMetadata {
        self.config.metadata()
    }

    /// Gets a piece by its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::PieceNotFound`] if the piece is not in the catalog.
    pub fn get_piece(&self, piece_id: &str) -> EngineResult<&Piece> {
        self.config
            .pieces()
            .get(piece_id)
            .ok_or_else(|| EngineError::PieceNotFound {
                piece_id: piece_id.to_string(),
            })
    }

    /// Gets a material by its identifier.
    pub fn get_material(&self, material_id: &str) -> Option<&Material> {
        self.config.materials().get(material_id)
    }
}
