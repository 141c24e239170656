//! Repository implementations over an in-memory [`PricingConfig`] snapshot.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::{EnginePolicies, PlantMetadata, PricingConfig};
use crate::models::{
    AdjustmentScale, AssemblyRate, CostParameter, FreightRate, Material, MonthlyIndex, Period,
    Piece, TonnageTier, TruckConfig, TruckType,
};

use super::{
    AdjustmentScaleRepository, AssemblyRateRepository, BandLookup, CostParameterRepository,
    FreightRateRepository, MaterialRepository, MonthlyIndexRepository, PieceRepository,
    PolicySource, TruckConfigRepository, find_band,
};

impl PieceRepository for PricingConfig {
    fn piece(&self, piece_id: &str) -> Option<&Piece> {
        self.pieces().get(piece_id)
    }
}

impl MaterialRepository for PricingConfig {
    fn materials_by_ids(&self, ids: &[&str]) -> Vec<&Material> {
        ids.iter().filter_map(|id| self.materials().get(*id)).collect()
    }
}

impl CostParameterRepository for PricingConfig {
    fn active_parameter(&self, name: &str, as_of: NaiveDate) -> Option<&CostParameter> {
        self.cost_parameters()
            .iter()
            .filter(|p| p.name == name && p.is_effective_on(as_of))
            .rev()
            .max_by_key(|p| p.effective_date)
    }
}

impl MonthlyIndexRepository for PricingConfig {
    fn monthly_index(&self, period: Period) -> Option<&MonthlyIndex> {
        self.monthly_indices().get(&period)
    }
}

impl AdjustmentScaleRepository for PricingConfig {
    fn active_scales(&self, as_of: NaiveDate) -> Vec<&AdjustmentScale> {
        let mut scales: Vec<&AdjustmentScale> = self
            .adjustment_scales()
            .iter()
            .filter(|s| s.is_effective_on(as_of))
            .collect();
        // Stable: equal dates keep file order.
        scales.sort_by(|a, b| b.effective_date.cmp(&a.effective_date));
        scales
    }
}

impl FreightRateRepository for PricingConfig {
    fn find_freight_rate(
        &self,
        origin: &str,
        distance_km: Decimal,
        as_of: NaiveDate,
    ) -> BandLookup<'_, FreightRate> {
        find_band(
            self.freight_rates().iter().filter(|r| r.origin == origin),
            distance_km,
            as_of,
        )
    }
}

impl TruckConfigRepository for PricingConfig {
    fn truck_config(&self, truck_type: TruckType) -> Option<&TruckConfig> {
        self.trucks().iter().find(|t| t.truck_type == truck_type)
    }

    fn truck_configs(&self) -> &[TruckConfig] {
        self.trucks()
    }
}

impl AssemblyRateRepository for PricingConfig {
    fn find_assembly_rate(
        &self,
        tier: TonnageTier,
        distance_km: Decimal,
        as_of: NaiveDate,
    ) -> BandLookup<'_, AssemblyRate> {
        find_band(
            self.assembly_rates().iter().filter(|r| r.tonnage_tier == tier),
            distance_km,
            as_of,
        )
    }
}

impl PolicySource for PricingConfig {
    fn plant(&self) -> &PlantMetadata {
        self.metadata()
    }

    fn policies(&self) -> &EnginePolicies {
        PricingConfig::policies(self)
    }
}
