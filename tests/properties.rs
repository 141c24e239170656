use chrono::NaiveDate;
use pricing_engine::calculation::{
    PackItem, bill_tonnage, calculate_freight, calculate_materials_cost, first_fit_decreasing,
};
use pricing_engine::config::{PlantMetadata, PricingConfig};
use pricing_engine::models::{
    BomLine, BudgetPiece, DispatchKind, FreightRate, Material, MaterialCategory, MaterialUnit,
    Piece, PieceFamily, TruckConfig, TruckType,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

// --- STRATEGIES ---

// Weights in tenths of a ton, 0.1 t to 40 t
fn arb_weight() -> impl Strategy<Value = Decimal> {
    (1i64..=400).prop_map(|tenths| Decimal::new(tenths, 1))
}

prop_compose! {
    fn arb_item()(
        weight in arb_weight(),
        max_stackable in 1u32..6
    ) -> (Decimal, u32) {
        (weight, max_stackable)
    }
}

prop_compose! {
    fn arb_budget_piece()(
        weight in arb_weight(),
        length_tenths in 10i64..300,
        quantity in 1u32..4,
        max_stackable in 1u32..11,
        individual in proptest::bool::weighted(0.1),
        requires_escort in proptest::bool::weighted(0.1)
    ) -> BudgetPiece {
        BudgetPiece {
            id: "prop".to_string(),
            weight_tons: weight,
            length_m: Decimal::new(length_tenths, 1),
            quantity,
            individual,
            special_handling: false,
            max_stackable,
            requires_escort,
        }
    }
}

// Scrap in hundredths of a percent, 0% to 50%
fn arb_scrap() -> impl Strategy<Value = Decimal> {
    (0i64..=5000).prop_map(|hundredths| Decimal::new(hundredths, 2))
}

fn plant() -> PlantMetadata {
    PlantMetadata {
        code: "PLT-01".to_string(),
        name: "Property Plant".to_string(),
        origin: "PLANTA_CENTRAL".to_string(),
        currency: "CLP".to_string(),
    }
}

fn beam_with_scrap(scrap_percent: Decimal, quantity_per_unit: Decimal) -> Piece {
    Piece {
        id: "VIG-P".to_string(),
        name: "Property beam".to_string(),
        family: PieceFamily::Generic,
        weight_tons: Decimal::from(2),
        volume_m3: Decimal::ONE,
        length_m: None,
        width_m: None,
        bom: vec![
            BomLine {
                material_id: "MAT-HOR".to_string(),
                quantity_per_unit,
                scrap_percent,
            },
            BomLine {
                material_id: "MAT-ACE".to_string(),
                quantity_per_unit: Decimal::from(120),
                scrap_percent: Decimal::from(3),
            },
        ],
    }
}

fn materials_config(concrete_price: Decimal) -> PricingConfig {
    let updated = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    PricingConfig::new(plant()).with_materials(vec![
        Material {
            id: "MAT-HOR".to_string(),
            name: "Concrete".to_string(),
            category: MaterialCategory::Concrete,
            unit: MaterialUnit::M3,
            current_price: concrete_price,
            price_updated_at: updated,
        },
        Material {
            id: "MAT-ACE".to_string(),
            name: "Rebar".to_string(),
            category: MaterialCategory::Steel,
            unit: MaterialUnit::Kg,
            current_price: Decimal::from(1050),
            price_updated_at: updated,
        },
    ])
}

fn standard_truck() -> TruckConfig {
    TruckConfig {
        truck_type: TruckType::Standard,
        capacity_tons: Decimal::from(25),
        min_billable_tons: Decimal::from(21),
    }
}

fn freight_config() -> PricingConfig {
    PricingConfig::new(plant()).with_freight_rates(vec![FreightRate {
        id: "FR-1".to_string(),
        origin: "PLANTA_CENTRAL".to_string(),
        km_from: Decimal::ZERO,
        km_to: Decimal::from(1000),
        rate_under_12m: Decimal::from(90),
        rate_over_12m: Decimal::from(110),
        effective_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
    }])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn prop_packer_places_every_item_once(items in proptest::collection::vec(arb_item(), 0..40)) {
        let pack: Vec<PackItem<usize>> = items
            .iter()
            .enumerate()
            .map(|(key, (weight, max_stackable))| PackItem { key, weight: *weight, max_stackable: *max_stackable })
            .collect();

        let bins = first_fit_decreasing(pack, Decimal::from(25));

        let mut keys: Vec<usize> = bins.iter().flat_map(|b| b.items.iter().map(|i| i.key)).collect();
        keys.sort_unstable();
        prop_assert_eq!(keys, (0..items.len()).collect::<Vec<_>>());
    }

    #[test]
    fn prop_packer_respects_capacity_and_stacking(items in proptest::collection::vec(arb_item(), 0..40)) {
        let capacity = Decimal::from(25);
        let pack: Vec<PackItem<usize>> = items
            .iter()
            .enumerate()
            .map(|(key, (weight, max_stackable))| PackItem { key, weight: *weight, max_stackable: *max_stackable })
            .collect();

        for bin in first_fit_decreasing(pack, capacity) {
            let sum: Decimal = bin.items.iter().map(|i| i.weight).sum();
            prop_assert_eq!(sum, bin.weight);
            if bin.oversized {
                prop_assert_eq!(bin.items.len(), 1);
                prop_assert!(bin.weight > capacity);
            } else {
                prop_assert!(bin.weight <= capacity);
                // Each unit joined a bin holding fewer units than its own limit
                for (position, item) in bin.items.iter().enumerate() {
                    prop_assert!((position as u32) < item.max_stackable);
                }
            }
        }
    }

    #[test]
    fn prop_packer_is_deterministic(items in proptest::collection::vec(arb_item(), 0..30)) {
        let pack = || -> Vec<PackItem<usize>> {
            items
                .iter()
                .enumerate()
                .map(|(key, (weight, max_stackable))| PackItem { key, weight: *weight, max_stackable: *max_stackable })
                .collect()
        };
        prop_assert_eq!(
            first_fit_decreasing(pack(), Decimal::from(25)),
            first_fit_decreasing(pack(), Decimal::from(25))
        );
    }

    #[test]
    fn prop_billed_tons_cover_real_and_minimum(real in arb_weight(), apply_floor in any::<bool>()) {
        let truck = standard_truck();
        let bill = bill_tonnage(real, &truck, apply_floor);

        prop_assert!(bill.false_tons >= Decimal::ZERO);
        prop_assert_eq!(bill.total_tons, bill.real_tons + bill.false_tons);
        prop_assert!(bill.total_tons >= real);
        if apply_floor {
            prop_assert!(bill.total_tons >= truck.min_billable_tons);
        } else {
            prop_assert_eq!(bill.false_tons, Decimal::ZERO);
        }
    }

    #[test]
    fn prop_freight_ships_all_weight(pieces in proptest::collection::vec(arb_budget_piece(), 1..8)) {
        let pieces: Vec<BudgetPiece> = pieces
            .into_iter()
            .enumerate()
            .map(|(i, p)| BudgetPiece { id: format!("P{}", i), ..p })
            .collect();
        let as_of = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();

        let result = calculate_freight(&freight_config(), &pieces, "PLANTA_CENTRAL", Decimal::from(50), as_of)
            .unwrap();

        let expected: Decimal = pieces.iter().map(|p| p.weight_tons * Decimal::from(p.quantity)).sum();
        prop_assert_eq!(result.totals.total_real_tons, expected);

        // Every unit is on exactly one truck
        let mut loaded: Vec<(String, u32)> = result
            .trucks
            .iter()
            .flat_map(|t| t.units.iter().map(|u| (u.piece_id.clone(), u.unit)))
            .collect();
        loaded.sort();
        let mut expected_units: Vec<(String, u32)> = pieces
            .iter()
            .flat_map(|p| (1..=p.quantity).map(move |unit| (p.id.clone(), unit)))
            .collect();
        expected_units.sort();
        prop_assert_eq!(loaded, expected_units);

        for truck in &result.trucks {
            prop_assert_eq!(truck.total_tons, truck.real_tons + truck.false_tons);
            if truck.dispatch == DispatchKind::Grouped {
                prop_assert!(truck.real_tons <= truck.capacity_tons);
                prop_assert!(truck.total_tons >= truck.min_billable_tons);
            }
        }
        prop_assert!(result.metrics.avg_utilization <= Decimal::ONE);
    }

    #[test]
    fn prop_more_scrap_never_lowers_materials_cost(
        first in arb_scrap(),
        second in arb_scrap(),
        quantity_tenths in 1i64..100,
        price in 1i64..200_000,
        order_quantity in 1u32..20
    ) {
        let (low, high) = if first <= second { (first, second) } else { (second, first) };
        let per_unit = Decimal::new(quantity_tenths, 1);
        let config = materials_config(Decimal::from(price));

        let cheap = calculate_materials_cost(&beam_with_scrap(low, per_unit), order_quantity, &config, 1)
            .unwrap();
        let dear = calculate_materials_cost(&beam_with_scrap(high, per_unit), order_quantity, &config, 1)
            .unwrap();

        prop_assert!(dear.lines[0].waste_factor >= cheap.lines[0].waste_factor);
        prop_assert!(dear.lines[0].total_quantity >= cheap.lines[0].total_quantity);
        prop_assert!(dear.lines[0].cost >= cheap.lines[0].cost);
        prop_assert!(dear.total >= cheap.total);
        prop_assert_eq!(&dear.lines[1], &cheap.lines[1]);
        prop_assert_eq!(dear.steel_weight_tons, cheap.steel_weight_tons);
    }
}
