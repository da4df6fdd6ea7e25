// 🏠 Property - Aggregate root of one analysis
//
// Built once by the assembler and never mutated afterwards. The attached
// ScoringAttributes are the audit trail for the vacancy score.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::building::{BuildingDetails, EstimateSource};
use super::energy::{ConsumptionCheck, EnergyClass, EnergyRecord};
use super::owner::OwnerRecord;

// ============================================================================
// CLASSIFICATIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    ResidentialUnit,
    Building,
    Commercial,
    Land,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::ResidentialUnit => "Residential unit",
            PropertyType::Building => "Building",
            PropertyType::Commercial => "Commercial",
            PropertyType::Land => "Land",
        }
    }

    /// Accepts both the display label and the variant name, case-insensitive
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().replace(['_', '-'], " ").as_str() {
            "residential unit" | "residentialunit" | "living" => Some(PropertyType::ResidentialUnit),
            "building" => Some(PropertyType::Building),
            "commercial" => Some(PropertyType::Commercial),
            "land" => Some(PropertyType::Land),
            _ => None,
        }
    }
}

/// Recommended reuse direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trajectory {
    Social,
    Ecological,
    Indeterminate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyStatus {
    Vacant,
    Occupied,
    #[serde(rename = "Under Analysis")]
    UnderAnalysis,
}

/// Liveness of an individual owner or administrative state of a company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnerLiveness {
    Alive,
    Deceased,
    Active,
    Inactive,
    Liquidation,
    Receivership,
    Unknown,
}

// ============================================================================
// SCORING ATTRIBUTES
// ============================================================================

/// Frozen, normalized inputs the scoring engine consumed.
///
/// Signals that are not yet available keep a fixed sentinel value
/// (`0` / `false`) so the record shape stays stable across rollouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringAttributes {
    pub consumption_ratio: Option<f64>,
    pub owner_status: OwnerLiveness,
    /// None when no transaction is on record
    pub years_since_last_transaction: Option<i32>,
    /// Street-level imagery comparison; not yet available, always 0
    pub facade_unchanged_years: u32,
    pub is_sci_or_indivision: bool,
    pub dpe_class: Option<EnergyClass>,
    /// Years since construction, 0 when unknown
    pub building_age: u32,
    /// Cadastre cross-reference; not yet available, always false
    pub has_vacant_lot_identified: bool,
    /// Floor located through the registry; not yet available, always false
    pub floor_identified: bool,
}

impl ScoringAttributes {
    pub fn is_energy_sieve(&self) -> bool {
        self.dpe_class.map_or(false, |class| class.is_sieve())
    }
}

// ============================================================================
// PROPERTY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Reversible encoding of the query string that produced this analysis
    pub id: String,

    pub address: String,
    pub city: String,
    pub zip_code: String,

    pub property_type: PropertyType,

    /// Unit surface in m² (0 when unknown)
    pub area: f64,

    /// Clamped 0-100
    pub vacancy_score: u8,
    pub trajectory: Trajectory,
    pub status: PropertyStatus,

    pub owner: OwnerRecord,
    pub energy: Option<EnergyRecord>,
    pub consumption: ConsumptionCheck,
    pub last_transaction_date: Option<NaiveDate>,

    pub building_surface: f64,
    pub building_units: u32,
    pub building_estimate_source: EstimateSource,
    pub building: BuildingDetails,

    pub scoring_attributes: ScoringAttributes,
    pub insights: Vec<String>,

    /// Neighbouring address substituted for missing metering data
    pub nearby_valid_address: Option<String>,

    pub confidence: f64,
}

/// What `analyze` hands to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub property: Property,
    pub confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_type_parse() {
        assert_eq!(PropertyType::parse("Building"), Some(PropertyType::Building));
        assert_eq!(PropertyType::parse("residential_unit"), Some(PropertyType::ResidentialUnit));
        assert_eq!(PropertyType::parse("Living"), Some(PropertyType::ResidentialUnit));
        assert_eq!(PropertyType::parse("castle"), None);
    }

    #[test]
    fn test_status_serializes_with_display_label() {
        let json = serde_json::to_string(&PropertyStatus::UnderAnalysis).unwrap();
        assert_eq!(json, "\"Under Analysis\"");
    }
}
