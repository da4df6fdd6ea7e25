// 🏢 Building Model - Registry details, risk flags and reconstructed estimates

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingRiskFlags {
    /// Building under a peril order (arrêté de péril)
    pub is_peril: bool,

    /// Building declared unsanitary (arrêté d'insalubrité)
    pub is_unsanitary: bool,
}

/// Co-ownership registry entry for the building
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoproRecord {
    /// Registry identifier; None while the registry search is pending
    pub registry_id: Option<String>,

    /// Declared lots (0 = unknown)
    pub total_lots: u32,

    pub construction_year: Option<i32>,

    pub insured_value: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildingDetails {
    pub registry_id: Option<String>,
    pub total_lots: u32,
    pub construction_year: Option<i32>,
    pub risks: BuildingRiskFlags,
    pub insured_value: Option<f64>,
}

impl BuildingDetails {
    pub fn from_registry(copro: &CoproRecord, risks: BuildingRiskFlags) -> Self {
        BuildingDetails {
            registry_id: copro.registry_id.clone(),
            total_lots: copro.total_lots,
            construction_year: copro.construction_year,
            risks,
            insured_value: copro.insured_value,
        }
    }

    pub fn registry_label(&self) -> &str {
        self.registry_id.as_deref().unwrap_or("PENDING-SEARCH")
    }
}

// ============================================================================
// BUILDING ESTIMATE
// ============================================================================

/// Where the final unit count came from, in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EstimateSource {
    /// Delivery points reported by the metering source
    Metered,

    /// Lots declared in the co-ownership registry
    Registry,

    /// Reconstructed from transaction lots and surfaces
    Transactions,

    /// Reconstructed unit count times a fallback unit surface
    FallbackSurface,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingEstimate {
    pub unit_count: u32,

    /// Total housing surface, m²
    pub surface: f64,

    pub average_unit_surface: f64,

    pub source: EstimateSource,
}

impl BuildingEstimate {
    /// Only co-ownership registry figures count as confirmed
    pub fn is_registry_confirmed(&self) -> bool {
        self.source == EstimateSource::Registry
    }

    /// Statistical reconstruction rather than a reported figure
    pub fn is_reconstructed(&self) -> bool {
        matches!(
            self.source,
            EstimateSource::Transactions | EstimateSource::FallbackSurface
        )
    }
}
