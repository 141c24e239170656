//! Reference data read by the engine: cost parameters, monthly indices,
//! adjustment scales, freight and assembly rates, and truck configurations.
//!
//! Every versioned row carries an effective window and is queried with an
//! explicit `as_of` date, never through a mutable "current" value.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Category of a cost parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParameterCategory {
    /// Plant production costs (energy, utilities).
    Production,
    /// Factory and company overheads.
    Overhead,
    /// Labor rates.
    Labor,
    /// On-site assembly crew and crane rates.
    Assembly,
}

/// A versioned, named cost rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostParameter {
    /// Parameter name, e.g. `energy_per_ton`.
    pub name: String,
    /// Parameter category.
    pub category: ParameterCategory,
    /// Unit description, e.g. `$/t`.
    pub unit: String,
    /// The rate value.
    pub value: Decimal,
    /// First date the value applies.
    pub effective_date: NaiveDate,
    /// Last date the value applies (inclusive), if bounded.
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
    /// Whether the row is enabled at all.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl CostParameter {
    /// Returns true if the parameter is active and `date` falls in its window.
    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        self.is_active
            && self.effective_date <= date
            && self.expiration_date.is_none_or(|end| date <= end)
    }
}

fn default_true() -> bool {
    true
}

/// A calendar month, serialized as `YYYY-MM`.
///
/// ```
/// use pricing_engine::models::Period;
///
/// let period: Period = "2025-03".parse().unwrap();
/// assert_eq!(period, Period::new(2025, 3).unwrap());
/// assert_eq!(period.to_string(), "2025-03");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Creates a period, rejecting months outside 1..=12.
    pub fn new(year: i32, month: u32) -> Result<Self, EngineError> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::invalid_input(
                "period",
                format!("month must be between 1 and 12, got {}", month),
            ));
        }
        Ok(Self { year, month })
    }

    /// The year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month (1-12).
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Returns the period immediately before this one.
    pub fn previous(&self) -> Period {
        if self.month == 1 {
            Period {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Period {
                year: self.year,
                month: self.month - 1,
            }
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::invalid_input("period", format!("expected YYYY-MM, got '{}'", s));
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        Period::new(year, month)
    }
}

impl TryFrom<String> for Period {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}

/// Monthly price index snapshot used for escalation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyIndex {
    /// The month this snapshot belongs to.
    pub period: Period,
    /// Steel sub-index.
    pub steel_index: Decimal,
    /// Labor sub-index.
    pub labor_index: Decimal,
    /// Concrete sub-index.
    pub concrete_index: Decimal,
    /// Fuel sub-index.
    pub fuel_index: Decimal,
    /// Exchange rate (local currency per US dollar).
    pub dollar_rate: Decimal,
}

/// A discount/markup scale applied to base costs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentScale {
    /// Unique identifier.
    pub id: String,
    /// General discount in percent (negative values discount).
    pub general_discount: Decimal,
    /// General adjustment in percent.
    pub general_adjustment: Decimal,
    /// Extra adjustment in percent for the listed families.
    #[serde(default)]
    pub special_adjustment: Option<Decimal>,
    /// Family codes the special adjustment applies to.
    #[serde(default)]
    pub special_categories: Vec<String>,
    /// First date the scale applies.
    pub effective_date: NaiveDate,
    /// Last date the scale applies (inclusive), if bounded.
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
    /// Whether the scale is enabled.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl AdjustmentScale {
    /// Returns true if the scale is active and `date` falls in its window.
    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        self.is_active
            && self.effective_date <= date
            && self.expiration_date.is_none_or(|end| date <= end)
    }

    /// Returns true if the special adjustment applies to the given family code.
    pub fn covers_family(&self, family_code: &str) -> bool {
        self.special_categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(family_code))
    }
}

/// Distance-banded freight rate.
///
/// Rates are expressed in currency per billed ton per kilometre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreightRate {
    /// Unique identifier.
    pub id: String,
    /// Dispatch origin (plant) the rate applies to.
    pub origin: String,
    /// Lower bound of the distance band, inclusive.
    pub km_from: Decimal,
    /// Upper bound of the distance band, inclusive.
    pub km_to: Decimal,
    /// Rate for loads up to 12 m.
    pub rate_under_12m: Decimal,
    /// Rate for loads longer than 12 m.
    pub rate_over_12m: Decimal,
    /// First date the rate applies.
    pub effective_date: NaiveDate,
}

/// Truck category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TruckType {
    /// Flatbed for pieces up to 12 m.
    Standard,
    /// Semi-trailer for medium-length pieces.
    Medium,
    /// Extendable trailer for long pieces.
    Extended,
}

impl fmt::Display for TruckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TruckType::Standard => "STANDARD",
            TruckType::Medium => "MEDIUM",
            TruckType::Extended => "EXTENDED",
        };
        f.write_str(name)
    }
}

/// Capacity and billing floor of a truck type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruckConfig {
    /// The truck type.
    pub truck_type: TruckType,
    /// Maximum load in tons.
    pub capacity_tons: Decimal,
    /// Minimum tonnage the carrier bills for.
    pub min_billable_tons: Decimal,
}

/// Tonnage tier of an assembly job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TonnageTier {
    /// Below the light threshold (100 t by default).
    Light,
    /// Between the light and heavy thresholds.
    Medium,
    /// Above the heavy threshold (300 t by default).
    Heavy,
}

/// Distance-banded crane mobilization rate for one tonnage tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyRate {
    /// Unique identifier.
    pub id: String,
    /// The tonnage tier the rate applies to.
    pub tonnage_tier: TonnageTier,
    /// Lower bound of the distance band, inclusive.
    pub km_from: Decimal,
    /// Upper bound of the distance band, inclusive.
    pub km_to: Decimal,
    /// Flat crane mobilization cost.
    pub mobilization_cost: Decimal,
    /// First date the rate applies.
    pub effective_date: NaiveDate,
}
