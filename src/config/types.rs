//! Configuration types for the pricing engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML files of a plant configuration directory,
//! plus the assembled [`PricingConfig`] snapshot the engine reads from.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AdjustmentScale, AssemblyRate, CostParameter, FreightRate, Material, MonthlyIndex, Period,
    Piece, TonnageTier, TruckConfig, TruckType,
};

/// Historical discount factor applied when no adjustment scale is active
/// and the legacy policy is selected.
pub const LEGACY_DISCOUNT_FACTOR: Decimal = Decimal::from_parts(85, 0, 0, false, 2);

/// Historical adjustment factor of the legacy policy.
pub const LEGACY_ADJUSTMENT_FACTOR: Decimal = Decimal::from_parts(411365, 0, 0, false, 5);

/// Historical special adjustment (as a fraction) of the legacy policy.
pub const LEGACY_SPECIAL_ADJUSTMENT: Decimal = Decimal::from_parts(20, 0, 0, true, 2);

/// Default distance resolution deadline in milliseconds.
pub const DEFAULT_DISTANCE_TIMEOUT_MS: u64 = 15_000;

/// Plant metadata from `plant.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantMetadata {
    /// Plant code (e.g., "PLT-01").
    pub code: String,
    /// Human-readable plant name.
    pub name: String,
    /// Origin key used for freight rates and distances.
    pub origin: String,
    /// Currency code of all monetary values.
    pub currency: String,
}

/// What the adjustment layer does when no scale is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoScaleBehavior {
    /// Pass the base cost through unchanged.
    #[default]
    Identity,
    /// Apply the historical constant factors.
    Legacy,
}

/// Historical hard-coded adjustment factors, kept overridable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyAdjustmentFactors {
    /// Multiplier applied as a discount.
    pub discount_factor: Decimal,
    /// Multiplier applied as a markup.
    pub adjustment_factor: Decimal,
    /// Extra fraction applied to special families (`x (1 + special)`).
    pub special_adjustment: Decimal,
    /// Family codes receiving the special adjustment.
    #[serde(default)]
    pub special_categories: Vec<String>,
}

impl Default for LegacyAdjustmentFactors {
    fn default() -> Self {
        Self {
            discount_factor: LEGACY_DISCOUNT_FACTOR,
            adjustment_factor: LEGACY_ADJUSTMENT_FACTOR,
            special_adjustment: LEGACY_SPECIAL_ADJUSTMENT,
            special_categories: Vec::new(),
        }
    }
}

/// Adjustment layer policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentPolicy {
    /// Behaviour with zero active scales.
    #[serde(default)]
    pub no_active_scale: NoScaleBehavior,
    /// Factors used by [`NoScaleBehavior::Legacy`].
    #[serde(default)]
    pub legacy: LegacyAdjustmentFactors,
}

/// Weights of the polynomial escalation formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationWeights {
    /// Steel weight (default 0.4).
    pub steel: Decimal,
    /// Labor weight (default 0.3).
    pub labor: Decimal,
    /// Concrete weight (default 0.2).
    pub concrete: Decimal,
    /// Fuel weight (default 0.1).
    pub fuel: Decimal,
}

impl Default for EscalationWeights {
    fn default() -> Self {
        Self {
            steel: Decimal::new(4, 1),
            labor: Decimal::new(3, 1),
            concrete: Decimal::new(2, 1),
            fuel: Decimal::new(1, 1),
        }
    }
}

impl EscalationWeights {
    /// Sum of all weights.
    pub fn total(&self) -> Decimal {
        self.steel + self.labor + self.concrete + self.fuel
    }
}

/// Distance resolution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceSettings {
    /// Deadline for resolving a distance, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for DistanceSettings {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_DISTANCE_TIMEOUT_MS,
        }
    }
}

/// Which freight rate column a tier is billed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateColumn {
    /// `rate_under_12m`.
    Under12m,
    /// `rate_over_12m`.
    Over12m,
}

/// A length tier mapping pieces to a truck type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreightTier {
    /// Truck type used for this tier.
    pub truck_type: TruckType,
    /// Longest piece (inclusive) in this tier; `None` means unbounded.
    #[serde(default)]
    pub max_length_m: Option<Decimal>,
    /// Freight rate column for this tier.
    pub rate_column: RateColumn,
    /// Pieces in this tier always ship on a dedicated truck.
    #[serde(default)]
    pub dedicated: bool,
}

impl FreightTier {
    /// Returns true if a piece of the given length belongs to this tier.
    pub fn accepts_length(&self, length_m: Decimal) -> bool {
        self.max_length_m.is_none_or(|max| length_m <= max)
    }
}

fn default_true() -> bool {
    true
}

/// Minimum-billable policy for dedicated trucks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPolicy {
    /// Bill individually dispatched units (within capacity) at the minimum.
    #[serde(default = "default_true")]
    pub individual_min_floor: bool,
    /// Bill over-capacity units at the minimum. Disabled by default: such
    /// loads are billed at real weight pending business confirmation.
    #[serde(default)]
    pub over_capacity_min_floor: bool,
}

impl Default for BillingPolicy {
    fn default() -> Self {
        Self {
            individual_min_floor: true,
            over_capacity_min_floor: false,
        }
    }
}

/// Freight policy: tiers, billing rules and escort surcharge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreightPolicy {
    /// Tiers ordered by ascending maximum length.
    pub tiers: Vec<FreightTier>,
    /// Minimum-billable policy.
    #[serde(default)]
    pub billing: BillingPolicy,
    /// Escort surcharge per km for trucks carrying escorted pieces.
    #[serde(default)]
    pub escort_rate_per_km: Decimal,
}

impl Default for FreightPolicy {
    fn default() -> Self {
        Self {
            tiers: vec![
                FreightTier {
                    truck_type: TruckType::Standard,
                    max_length_m: Some(Decimal::from(12)),
                    rate_column: RateColumn::Under12m,
                    dedicated: false,
                },
                FreightTier {
                    truck_type: TruckType::Medium,
                    max_length_m: Some(Decimal::new(215, 1)),
                    rate_column: RateColumn::Over12m,
                    dedicated: false,
                },
                FreightTier {
                    truck_type: TruckType::Extended,
                    max_length_m: None,
                    rate_column: RateColumn::Over12m,
                    dedicated: false,
                },
            ],
            billing: BillingPolicy::default(),
            escort_rate_per_km: Decimal::ZERO,
        }
    }
}

impl FreightPolicy {
    /// Returns the index of the tier a piece length belongs to.
    pub fn tier_index_for(&self, length_m: Decimal) -> Option<usize> {
        self.tiers.iter().position(|t| t.accepts_length(length_m))
    }
}

/// Tonnage thresholds for assembly jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyTiers {
    /// Jobs strictly below this weight are `LIGHT` (default 100 t).
    pub light_below_tons: Decimal,
    /// Jobs strictly above this weight are `HEAVY` (default 300 t).
    pub heavy_above_tons: Decimal,
}

impl Default for AssemblyTiers {
    fn default() -> Self {
        Self {
            light_below_tons: Decimal::from(100),
            heavy_above_tons: Decimal::from(300),
        }
    }
}

impl AssemblyTiers {
    /// Classifies a job weight.
    pub fn tier_for(&self, total_tons: Decimal) -> TonnageTier {
        if total_tons < self.light_below_tons {
            TonnageTier::Light
        } else if total_tons > self.heavy_above_tons {
            TonnageTier::Heavy
        } else {
            TonnageTier::Medium
        }
    }
}

/// All engine policies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnginePolicies {
    /// Adjustment layer policy.
    pub adjustment: AdjustmentPolicy,
    /// Escalation weights.
    pub escalation: EscalationWeights,
    /// Distance resolution settings.
    pub distance: DistanceSettings,
    /// Freight policy.
    pub freight: FreightPolicy,
    /// Assembly tonnage tiers.
    pub assembly: AssemblyTiers,
}

/// A known road distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Origin key.
    pub origin: String,
    /// Destination name.
    pub destination: String,
    /// Distance in km.
    pub km: Decimal,
}

/// `plant.yaml` file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct PlantFile {
    /// Plant metadata.
    #[serde(flatten)]
    pub metadata: PlantMetadata,
    /// Adjustment policy.
    #[serde(default)]
    pub adjustment: AdjustmentPolicy,
    /// Escalation weights.
    #[serde(default)]
    pub escalation: EscalationWeights,
    /// Distance settings.
    #[serde(default)]
    pub distance: DistanceSettings,
}

/// `catalog.yaml` file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogFile {
    /// Materials.
    pub materials: Vec<Material>,
    /// Pieces with their BOM.
    pub pieces: Vec<Piece>,
}

/// `cost_parameters.yaml` file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct CostParametersFile {
    /// All parameter versions.
    pub parameters: Vec<CostParameter>,
}

/// `adjustment_scales.yaml` file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct AdjustmentScalesFile {
    /// All scale versions.
    pub scales: Vec<AdjustmentScale>,
}

/// `freight.yaml` file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct FreightFile {
    /// Truck configurations.
    pub trucks: Vec<TruckConfig>,
    /// Tiers, billing and escort settings.
    #[serde(flatten)]
    pub policy: FreightPolicy,
    /// Freight rate rows.
    #[serde(default)]
    pub rates: Vec<FreightRate>,
}

/// `assembly.yaml` file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct AssemblyFile {
    /// Tonnage thresholds.
    #[serde(default)]
    pub tiers: AssemblyTiers,
    /// Mobilization rate rows.
    #[serde(default)]
    pub rates: Vec<AssemblyRate>,
}

/// `distances.yaml` file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct DistancesFile {
    /// Known routes.
    #[serde(default)]
    pub routes: Vec<Route>,
}

/// Default truck fleet: standard, medium and extended trailers.
pub fn default_trucks() -> Vec<TruckConfig> {
    vec![
        TruckConfig {
            truck_type: TruckType::Standard,
            capacity_tons: Decimal::from(25),
            min_billable_tons: Decimal::from(21),
        },
        TruckConfig {
            truck_type: TruckType::Medium,
            capacity_tons: Decimal::from(27),
            min_billable_tons: Decimal::from(24),
        },
        TruckConfig {
            truck_type: TruckType::Extended,
            capacity_tons: Decimal::new(366, 1),
            min_billable_tons: Decimal::from(26),
        },
    ]
}

/// The complete reference-data snapshot the engine reads from.
///
/// A snapshot is immutable once built; administrative updates produce a new
/// snapshot rather than mutating this one.
#[derive(Debug, Clone)]
pub struct PricingConfig {
    metadata: PlantMetadata,
    policies: EnginePolicies,
    materials: HashMap<String, Material>,
    pieces: HashMap<String, Piece>,
    parameters: Vec<CostParameter>,
    indices: BTreeMap<Period, MonthlyIndex>,
    scales: Vec<AdjustmentScale>,
    trucks: Vec<TruckConfig>,
    freight_rates: Vec<FreightRate>,
    assembly_rates: Vec<AssemblyRate>,
    routes: Vec<Route>,
}

impl PricingConfig {
    /// Creates an empty snapshot with default policies and the default truck fleet.
    pub fn new(metadata: PlantMetadata) -> Self {
        Self {
            metadata,
            policies: EnginePolicies::default(),
            materials: HashMap::new(),
            pieces: HashMap::new(),
            parameters: Vec::new(),
            indices: BTreeMap::new(),
            scales: Vec::new(),
            trucks: default_trucks(),
            freight_rates: Vec::new(),
            assembly_rates: Vec::new(),
            routes: Vec::new(),
        }
    }

    /// Replaces the engine policies.
    pub fn with_policies(mut self, policies: EnginePolicies) -> Self {
        self.policies = policies;
        self
    }

    /// Replaces the materials.
    pub fn with_materials(mut self, materials: Vec<Material>) -> Self {
        self.materials = materials.into_iter().map(|m| (m.id.clone(), m)).collect();
        self
    }

    /// Replaces the pieces.
    pub fn with_pieces(mut self, pieces: Vec<Piece>) -> Self {
        self.pieces = pieces.into_iter().map(|p| (p.id.clone(), p)).collect();
        self
    }

    /// Replaces the cost parameters.
    pub fn with_cost_parameters(mut self, parameters: Vec<CostParameter>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Replaces the monthly indices.
    pub fn with_monthly_indices(mut self, indices: Vec<MonthlyIndex>) -> Self {
        self.indices = indices.into_iter().map(|i| (i.period, i)).collect();
        self
    }

    /// Replaces the adjustment scales.
    pub fn with_adjustment_scales(mut self, scales: Vec<AdjustmentScale>) -> Self {
        self.scales = scales;
        self
    }

    /// Replaces the truck configurations.
    pub fn with_trucks(mut self, trucks: Vec<TruckConfig>) -> Self {
        self.trucks = trucks;
        self
    }

    /// Replaces the freight rates.
    pub fn with_freight_rates(mut self, rates: Vec<FreightRate>) -> Self {
        self.freight_rates = rates;
        self
    }

    /// Replaces the assembly rates.
    pub fn with_assembly_rates(mut self, rates: Vec<AssemblyRate>) -> Self {
        self.assembly_rates = rates;
        self
    }

    /// Replaces the known routes.
    pub fn with_routes(mut self, routes: Vec<Route>) -> Self {
        self.routes = routes;
        self
    }

    /// Checks cross-file consistency.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] if tiers are empty, unordered,
    /// bounded in the last tier or reference a truck type without configuration, if a truck's
    /// minimum exceeds its capacity, if escalation weights do not sum to 1,
    /// or if assembly thresholds are inverted.
    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |message: String| Err(EngineError::InvalidConfig { message });
        let tiers = &self.policies.freight.tiers;

        if tiers.is_empty() {
            return invalid("at least one freight tier is required".to_string());
        }
        for (i, tier) in tiers.iter().enumerate() {
            let is_last = i == tiers.len() - 1;
            match (tier.max_length_m, is_last) {
                (None, false) => {
                    return invalid(format!(
                        "only the last freight tier may be unbounded ({} is not last)",
                        tier.truck_type
                    ));
                }
                (Some(max), true) => {
                    return invalid(format!(
                        "the last freight tier ({}) must be unbounded, got max length {}",
                        tier.truck_type, max
                    ));
                }
                (Some(max), _) if i > 0 => {
                    if let Some(prev) = tiers[i - 1].max_length_m {
                        if max <= prev {
                            return invalid(format!(
                                "freight tier {} max length {} must exceed previous tier's {}",
                                tier.truck_type, max, prev
                            ));
                        }
                    }
                }
                _ => {}
            }
            if !self.trucks.iter().any(|t| t.truck_type == tier.truck_type) {
                return invalid(format!(
                    "freight tier uses truck type {} which has no configuration",
                    tier.truck_type
                ));
            }
        }
        for truck in &self.trucks {
            if truck.min_billable_tons > truck.capacity_tons {
                return invalid(format!(
                    "truck {} minimum billable {} exceeds capacity {}",
                    truck.truck_type, truck.min_billable_tons, truck.capacity_tons
                ));
            }
        }
        if self.policies.escalation.total() != Decimal::ONE {
            return invalid(format!(
                "escalation weights must sum to 1, got {}",
                self.policies.escalation.total()
            ));
        }
        let assembly = &self.policies.assembly;
        if assembly.light_below_tons > assembly.heavy_above_tons {
            return invalid(format!(
                "assembly light threshold {} exceeds heavy threshold {}",
                assembly.light_below_tons, assembly.heavy_above_tons
            ));
        }
        Ok(())
    }

    /// Returns the plant metadata.
    pub fn metadata(&self) -> &PlantMetadata {
        &self.metadata
    }

    /// Returns the engine policies.
    pub fn policies(&self) -> &EnginePolicies {
        &self.policies
    }

    /// Returns all materials keyed by id.
    pub fn materials(&self) -> &HashMap<String, Material> {
        &self.materials
    }

    /// Returns all pieces keyed by id.
    pub fn pieces(&self) -> &HashMap<String, Piece> {
        &self.pieces
    }

    /// Returns all cost parameter versions.
    pub fn cost_parameters(&self) -> &[CostParameter] {
        &self.parameters
    }

    /// Returns all monthly indices keyed by period.
    pub fn monthly_indices(&self) -> &BTreeMap<Period, MonthlyIndex> {
        &self.indices
    }

    /// Returns all adjustment scale versions.
    pub fn adjustment_scales(&self) -> &[AdjustmentScale] {
        &self.scales
    }

    /// Returns the truck configurations.
    pub fn trucks(&self) -> &[TruckConfig] {
        &self.trucks
    }

    /// Returns all freight rate rows.
    pub fn freight_rates(&self) -> &[FreightRate] {
        &self.freight_rates
    }

    /// Returns all assembly rate rows.
    pub fn assembly_rates(&self) -> &[AssemblyRate] {
        &self.assembly_rates
    }

    /// Returns the known routes.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}
