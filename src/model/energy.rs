// ⚡ Energy Model - Diagnostics (DPE) and metered consumption
//
// The energy-sieve flag is derived from the DPE class and never stored
// independently: construction and deserialization both recompute it.

use serde::{Deserialize, Serialize};

// ============================================================================
// ENERGY CLASS
// ============================================================================

/// DPE letter grade, A (best) to G (worst)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EnergyClass {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl EnergyClass {
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "A" => Some(EnergyClass::A),
            "B" => Some(EnergyClass::B),
            "C" => Some(EnergyClass::C),
            "D" => Some(EnergyClass::D),
            "E" => Some(EnergyClass::E),
            "F" => Some(EnergyClass::F),
            "G" => Some(EnergyClass::G),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnergyClass::A => "A",
            EnergyClass::B => "B",
            EnergyClass::C => "C",
            EnergyClass::D => "D",
            EnergyClass::E => "E",
            EnergyClass::F => "F",
            EnergyClass::G => "G",
        }
    }

    /// F and G units are "energy sieves"
    pub fn is_sieve(&self) -> bool {
        matches!(self, EnergyClass::F | EnergyClass::G)
    }
}

// ============================================================================
// ENERGY RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EnergyRecordFields")]
pub struct EnergyRecord {
    dpe_class: EnergyClass,

    pub ges_class: Option<EnergyClass>,

    /// Estimated primary consumption, kWh/m²/year
    pub estimated_consumption: Option<f64>,

    /// Living surface declared in the diagnostic, m²
    pub surface_estimate: Option<f64>,

    is_energy_sieve: bool,
}

/// Incoming shape: any sieve flag present in the payload is ignored
#[derive(Deserialize)]
struct EnergyRecordFields {
    dpe_class: EnergyClass,
    ges_class: Option<EnergyClass>,
    estimated_consumption: Option<f64>,
    surface_estimate: Option<f64>,
}

impl From<EnergyRecordFields> for EnergyRecord {
    fn from(fields: EnergyRecordFields) -> Self {
        EnergyRecord::new(
            fields.dpe_class,
            fields.ges_class,
            fields.estimated_consumption,
            fields.surface_estimate,
        )
    }
}

impl EnergyRecord {
    pub fn new(
        dpe_class: EnergyClass,
        ges_class: Option<EnergyClass>,
        estimated_consumption: Option<f64>,
        surface_estimate: Option<f64>,
    ) -> Self {
        EnergyRecord {
            dpe_class,
            ges_class,
            estimated_consumption,
            surface_estimate,
            is_energy_sieve: dpe_class.is_sieve(),
        }
    }

    /// Fixed at construction so the sieve flag cannot drift from it
    pub fn dpe_class(&self) -> EnergyClass {
        self.dpe_class
    }

    pub fn is_energy_sieve(&self) -> bool {
        self.is_energy_sieve
    }
}

/// Building-level aggregate of every diagnostic filed under one address id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingEnergyStats {
    /// Number of unit diagnostics on file for the building
    pub record_count: u32,

    /// Most frequent class among those diagnostics
    pub dominant_class: Option<EnergyClass>,

    pub mean_surface: Option<f64>,
}

// ============================================================================
// METERED CONSUMPTION
// ============================================================================

/// Annual residential consumption reported by the grid operator for an address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeteredConsumption {
    pub address_label: String,

    /// Total for the address, MWh/year
    pub total_mwh: Option<f64>,

    /// Average per delivery point, MWh/year
    pub average_mwh: Option<f64>,

    /// Number of housing units (delivery points) at the address
    pub unit_count: u32,

    /// Client segment ("RES1", "RES2"...)
    pub segment: Option<String>,
}

impl MeteredConsumption {
    /// Per-unit consumption, derived from the total when no average is given
    pub fn per_unit_mwh(&self) -> Option<f64> {
        self.average_mwh.or_else(|| match (self.total_mwh, self.unit_count) {
            (Some(total), units) if units > 0 => Some(total / units as f64),
            _ => None,
        })
    }
}

/// Real vs theoretical consumption for the analyzed unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionCheck {
    /// Metered consumption per unit, MWh/year (None without metering data)
    pub real_consumption: Option<f64>,

    /// Expected consumption, MWh/year
    pub theoretical_consumption: f64,

    /// real / theoretical
    pub consumption_ratio: Option<f64>,

    pub segment: Option<String>,

    /// Units reported by the metering source (0 = unavailable)
    pub unit_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_class_parse() {
        assert_eq!(EnergyClass::parse("g"), Some(EnergyClass::G));
        assert_eq!(EnergyClass::parse(" C "), Some(EnergyClass::C));
        assert_eq!(EnergyClass::parse("N/A"), None);
        assert_eq!(EnergyClass::parse(""), None);
    }

    #[test]
    fn test_sieve_follows_class() {
        for class in [EnergyClass::A, EnergyClass::B, EnergyClass::C, EnergyClass::D, EnergyClass::E] {
            assert!(!EnergyRecord::new(class, None, None, None).is_energy_sieve());
        }
        assert!(EnergyRecord::new(EnergyClass::F, None, None, None).is_energy_sieve());
        assert!(EnergyRecord::new(EnergyClass::G, None, None, None).is_energy_sieve());
    }

    #[test]
    fn test_sieve_flag_tracks_class_after_field_updates() {
        for class in [
            EnergyClass::A,
            EnergyClass::B,
            EnergyClass::C,
            EnergyClass::D,
            EnergyClass::E,
            EnergyClass::F,
            EnergyClass::G,
        ] {
            let mut record = EnergyRecord::new(class, None, Some(120.0), Some(45.0));
            record.ges_class = Some(EnergyClass::G);
            record.estimated_consumption = Some(480.0);
            record.surface_estimate = None;

            assert_eq!(record.dpe_class(), class);
            assert_eq!(record.is_energy_sieve(), record.dpe_class().is_sieve());
        }
    }

    #[test]
    fn test_deserialize_ignores_stale_sieve_flag() {
        let json = r#"{"dpe_class": "G", "ges_class": null, "estimated_consumption": 420.0,
            "surface_estimate": 30.0, "is_energy_sieve": false}"#;

        let record: EnergyRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.dpe_class(), EnergyClass::G);
        assert!(record.is_energy_sieve());
    }

    #[test]
    fn test_deserialize_recomputes_sieve_flag() {
        let json = r#"{
            "dpe_class": "B",
            "ges_class": "C",
            "estimated_consumption": 95.0,
            "surface_estimate": 40.0,
            "is_energy_sieve": true
        }"#;

        let record: EnergyRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.dpe_class(), EnergyClass::B);
        assert!(!record.is_energy_sieve());

        let serialized = serde_json::to_value(&record).unwrap();
        assert_eq!(serialized["is_energy_sieve"], serde_json::json!(false));
    }

    #[test]
    fn test_per_unit_consumption() {
        let mut metered = MeteredConsumption {
            address_label: "10 RUE X".to_string(),
            total_mwh: Some(40.0),
            average_mwh: None,
            unit_count: 8,
            segment: None,
        };
        assert_eq!(metered.per_unit_mwh(), Some(5.0));

        metered.average_mwh = Some(3.2);
        assert_eq!(metered.per_unit_mwh(), Some(3.2));

        metered.average_mwh = None;
        metered.unit_count = 0;
        assert_eq!(metered.per_unit_mwh(), None);
    }
}
