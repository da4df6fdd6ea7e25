// 🏗️ Building Reconstructor - Unit count and surface from noisy signals
//
// Unit count precedence:
//   1. Metered delivery points (grid operator)
//   2. Lots declared in the co-ownership registry
//   3. Transaction lots (statistical reconstruction)
//   4. Transaction count × fallback unit surface
//
// Only (2) is registry-confirmed; (3) and (4) are flagged as reconstructed.
// Building diagnostics count reports, not units: they only feed the
// fallback surface.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::aggregator::SignalBundle;
use crate::config::ReconstructionConfig;
use crate::model::{
    BuildingEnergyStats, BuildingEstimate, CoproRecord, EnergyRecord, EstimateSource,
    MeteredConsumption, TransactionRecord,
};

// ============================================================================
// TRANSACTION ESTIMATE
// ============================================================================

/// What the transaction history alone says about the building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionEstimate {
    /// Residential records kept after the surface filter
    pub sample_size: usize,

    /// max(distinct lots, highest plausible lot index, 1)
    pub unit_count: u32,

    /// Mean built surface of the sample, when plausible
    pub average_surface: Option<f64>,
}

// ============================================================================
// RECONSTRUCTOR
// ============================================================================

pub struct BuildingReconstructor {
    pub config: ReconstructionConfig,
}

impl BuildingReconstructor {
    pub fn new(config: ReconstructionConfig) -> Self {
        BuildingReconstructor { config }
    }

    /// Estimate for the building the bundle's address belongs to
    pub fn reconstruct(&self, bundle: &SignalBundle) -> BuildingEstimate {
        let from_transactions = self.estimate_from_transactions(&bundle.transactions);

        self.reconcile(
            bundle.metered.as_ref(),
            &bundle.copro,
            bundle.building_energy.as_ref(),
            bundle.energy.as_ref(),
            &from_transactions,
        )
    }

    /// Unit count and mean surface from the transaction sample
    pub fn estimate_from_transactions(&self, transactions: &[TransactionRecord]) -> TransactionEstimate {
        let sample: Vec<&TransactionRecord> = transactions
            .iter()
            .filter(|tx| tx.is_residential())
            .filter(|tx| {
                tx.built_surface
                    .map_or(false, |surface| surface > self.config.min_unit_surface)
            })
            .collect();

        if sample.is_empty() {
            return TransactionEstimate {
                sample_size: 0,
                unit_count: 1,
                average_surface: None,
            };
        }

        let distinct_lots = sample.iter().map(|tx| lot_key(tx)).collect::<HashSet<_>>().len() as u32;

        let highest_index = sample
            .iter()
            .filter_map(|tx| tx.numeric_lot_index())
            .filter(|index| *index < self.config.max_lot_index)
            .max()
            .unwrap_or(0);

        let total_surface: f64 = sample.iter().filter_map(|tx| tx.built_surface).sum();
        let mean = total_surface / sample.len() as f64;

        TransactionEstimate {
            sample_size: sample.len(),
            unit_count: distinct_lots.max(highest_index).max(1),
            average_surface: self.is_plausible(mean).then_some(mean),
        }
    }

    /// Apply the unit-count precedence and derive the total surface
    pub fn reconcile(
        &self,
        metered: Option<&MeteredConsumption>,
        copro: &CoproRecord,
        building_energy: Option<&BuildingEnergyStats>,
        energy: Option<&EnergyRecord>,
        from_transactions: &TransactionEstimate,
    ) -> BuildingEstimate {
        let fallback_surface = self.fallback_unit_surface(energy, building_energy);
        let average_unit_surface = from_transactions.average_surface.unwrap_or(fallback_surface);

        let metered_units = metered.map_or(0, |m| m.unit_count);

        let (unit_count, source) = if metered_units > 0 {
            (metered_units, EstimateSource::Metered)
        } else if copro.total_lots > 0 {
            (copro.total_lots, EstimateSource::Registry)
        } else if from_transactions.average_surface.is_some() {
            (from_transactions.unit_count, EstimateSource::Transactions)
        } else {
            return BuildingEstimate {
                unit_count: from_transactions.unit_count,
                surface: from_transactions.unit_count as f64 * fallback_surface,
                average_unit_surface: fallback_surface,
                source: EstimateSource::FallbackSurface,
            };
        };

        BuildingEstimate {
            unit_count,
            surface: unit_count as f64 * average_unit_surface,
            average_unit_surface,
            source,
        }
    }

    /// Unit diagnostic surface, then building diagnostic mean, then default
    fn fallback_unit_surface(
        &self,
        energy: Option<&EnergyRecord>,
        building_energy: Option<&BuildingEnergyStats>,
    ) -> f64 {
        energy
            .and_then(|e| e.surface_estimate)
            .filter(|surface| self.is_plausible(*surface))
            .or_else(|| {
                building_energy
                    .and_then(|stats| stats.mean_surface)
                    .filter(|surface| self.is_plausible(*surface))
            })
            .unwrap_or(self.config.default_unit_surface)
    }

    fn is_plausible(&self, surface: f64) -> bool {
        surface.is_finite()
            && surface >= self.config.plausible_surface_min
            && surface <= self.config.plausible_surface_max
    }
}

impl Default for BuildingReconstructor {
    fn default() -> Self {
        Self::new(ReconstructionConfig::default())
    }
}

/// Lot identity; surface and price stand in when no lot index was recorded
fn lot_key(tx: &TransactionRecord) -> String {
    match tx.lot_index.as_deref().map(str::trim) {
        Some(index) if !index.is_empty() => format!("lot:{}", index),
        _ => format!(
            "{:.1}-{:.0}",
            tx.built_surface.unwrap_or(0.0),
            tx.value.unwrap_or(0.0)
        ),
    }
}

// ============================================================================
// TESTS
// ============================================================================
