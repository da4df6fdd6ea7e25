// 📊 Scoring Engine - Weighted vacancy indicators
//
// Pure and deterministic: no I/O, no clock, no randomness.
// Points are additive; status thresholds apply to the raw sum, only the
// reported score is clamped to 0-100.

use serde::{Deserialize, Serialize};

use crate::model::{
    BuildingRiskFlags, OwnerKind, OwnerLiveness, PropertyStatus, ScoringAttributes, Trajectory,
};

// ============================================================================
// INDICATORS
// ============================================================================

/// Declared in evaluation order; insights follow the same order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Indicator {
    /// real / theoretical consumption below 0.20
    ConsumptionCollapse,

    /// real / theoretical consumption in [0.20, 0.50)
    ConsumptionDrop,

    /// No transaction for more than 5 years
    LongInertia,

    /// Last transaction between 3 (exclusive) and 5 (inclusive) years ago
    Inertia,

    OwnerDeceased,
    PerilOrder,
    Unsanitary,

    /// Energy class F or G
    EnergySieve,

    /// Floor located through the registry (signal not yet available)
    FloorIdentified,
}

impl Indicator {
    pub fn points(&self) -> u32 {
        match self {
            Indicator::ConsumptionCollapse => 40,
            Indicator::ConsumptionDrop => 20,
            Indicator::LongInertia => 20,
            Indicator::Inertia => 10,
            Indicator::OwnerDeceased => 20,
            Indicator::PerilOrder => 30,
            Indicator::Unsanitary => 20,
            Indicator::EnergySieve => 10,
            Indicator::FloorIdentified => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Indicator::ConsumptionCollapse => "Consumption far below theoretical",
            Indicator::ConsumptionDrop => "Consumption moderately below theoretical",
            Indicator::LongInertia => "No transaction in more than 5 years",
            Indicator::Inertia => "No transaction in 3 to 5 years",
            Indicator::OwnerDeceased => "Owner deceased",
            Indicator::PerilOrder => "Building under peril order",
            Indicator::Unsanitary => "Building flagged unsanitary",
            Indicator::EnergySieve => "Energy sieve (class F or G)",
            Indicator::FloorIdentified => "Floor identified via registry",
        }
    }

    /// "Owner deceased (+20)"
    pub fn insight(&self) -> String {
        format!("{} (+{})", self.label(), self.points())
    }
}

// ============================================================================
// OUTCOME
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreOutcome {
    /// Unclamped point sum (drives the status)
    pub raw_points: u32,

    /// raw_points clamped to 0-100
    pub score: u8,

    pub status: PropertyStatus,
    pub trajectory: Trajectory,

    /// Triggered indicators, in table order
    pub indicators: Vec<Indicator>,

    /// One line per triggered indicator
    pub insights: Vec<String>,
}

// ============================================================================
// SCORING ENGINE
// ============================================================================

pub struct ScoringEngine {
    /// Raw points at or above which a property is vacant (default: 12)
    pub vacant_threshold: u32,

    /// Raw points at or above which a property needs review (default: 6)
    pub review_threshold: u32,
}

impl ScoringEngine {
    pub fn new() -> Self {
        ScoringEngine {
            vacant_threshold: 12,
            review_threshold: 6,
        }
    }

    pub fn score(
        &self,
        attributes: &ScoringAttributes,
        risks: &BuildingRiskFlags,
        owner_kind: OwnerKind,
    ) -> ScoreOutcome {
        let indicators = self.triggered(attributes, risks);
        let raw_points: u32 = indicators.iter().map(Indicator::points).sum();

        ScoreOutcome {
            raw_points,
            score: raw_points.min(100) as u8,
            status: self.classify(raw_points),
            trajectory: trajectory(attributes, owner_kind),
            insights: indicators.iter().map(Indicator::insight).collect(),
            indicators,
        }
    }

    /// Every indicator whose trigger holds, in table order
    pub fn triggered(
        &self,
        attributes: &ScoringAttributes,
        risks: &BuildingRiskFlags,
    ) -> Vec<Indicator> {
        let mut hits = Vec::new();

        if let Some(ratio) = attributes.consumption_ratio {
            if ratio < 0.20 {
                hits.push(Indicator::ConsumptionCollapse);
            } else if ratio < 0.50 {
                hits.push(Indicator::ConsumptionDrop);
            }
        }

        if let Some(years) = attributes.years_since_last_transaction {
            if years > 5 {
                hits.push(Indicator::LongInertia);
            } else if years > 3 {
                hits.push(Indicator::Inertia);
            }
        }

        if attributes.owner_status == OwnerLiveness::Deceased {
            hits.push(Indicator::OwnerDeceased);
        }
        if risks.is_peril {
            hits.push(Indicator::PerilOrder);
        }
        if risks.is_unsanitary {
            hits.push(Indicator::Unsanitary);
        }
        if attributes.is_energy_sieve() {
            hits.push(Indicator::EnergySieve);
        }
        if attributes.floor_identified {
            hits.push(Indicator::FloorIdentified);
        }

        hits
    }

    pub fn classify(&self, raw_points: u32) -> PropertyStatus {
        if raw_points >= self.vacant_threshold {
            PropertyStatus::Vacant
        } else if raw_points >= self.review_threshold {
            PropertyStatus::UnderAnalysis
        } else {
            PropertyStatus::Occupied
        }
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Ecological beats social when both apply
pub fn trajectory(attributes: &ScoringAttributes, owner_kind: OwnerKind) -> Trajectory {
    if attributes.is_energy_sieve() {
        Trajectory::Ecological
    } else if matches!(owner_kind, OwnerKind::Public | OwnerKind::Company) {
        Trajectory::Social
    } else {
        Trajectory::Indeterminate
    }
}

// ============================================================================
// TESTS
// ============================================================================
