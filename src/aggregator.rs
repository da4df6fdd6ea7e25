// 🔀 Aggregator - Fan out to every source for one address, reconcile the answers
//
// Order of work:
//   1. Resolve the address once (degrade to the raw query on failure)
//   2. Independent lookups concurrently, each under its own timeout
//   3. Dependent lookups once their prerequisites are in:
//      - nearby-address fallback when the exact address has no metering data
//      - death-register check for individual owners
//      - real vs theoretical consumption comparison
//
// No lookup failure escapes: each degrades to its "no data" value.

use std::sync::Arc;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::consumption;
use crate::model::address::leading_number;
use crate::model::transaction::filter_for_street_number;
use crate::model::{
    AddressRecord, BuildingEnergyStats, BuildingRiskFlags, ConsumptionCheck, CoproRecord,
    DeathRecord, EnergyRecord, MeteredConsumption, OwnerRecord, TransactionRecord,
};
use crate::sources::{guarded, SourceKind, Sources};

/// House-number offsets tried when the exact address has no metering data.
/// Same-parity neighbours (same side of the street) come first.
pub const NEARBY_OFFSETS: [i64; 4] = [-2, 2, -1, 1];

// ============================================================================
// SIGNAL BUNDLE
// ============================================================================

/// Everything the sources said about one address, reconciled
#[derive(Debug, Clone, PartialEq)]
pub struct SignalBundle {
    pub address: AddressRecord,

    /// Records for the address's street number, newest first
    pub transactions: Vec<TransactionRecord>,

    pub owner: OwnerRecord,

    /// Positive death-register match for an individual owner
    pub death_record: Option<DeathRecord>,

    pub energy: Option<EnergyRecord>,
    pub building_energy: Option<BuildingEnergyStats>,

    /// Metering data of the address, or of the nearby address that stood in
    pub metered: Option<MeteredConsumption>,

    /// Set when `metered` comes from a neighbouring house number
    pub nearby_valid_address: Option<String>,

    pub consumption: ConsumptionCheck,
    pub risks: BuildingRiskFlags,
    pub copro: CoproRecord,
}

impl SignalBundle {
    pub fn owner_deceased(&self) -> bool {
        self.death_record.is_some()
    }

    pub fn last_transaction(&self) -> Option<&TransactionRecord> {
        self.transactions.first()
    }
}

/// Neighbouring addresses in the order they are tried.
///
/// "15 rue X" → "13 rue X", "17 rue X", "14 rue X", "16 rue X".
/// Numbers below 1 are skipped; an address without a leading number has
/// no neighbours.
pub fn nearby_candidates(street_line: &str) -> Vec<String> {
    let (first, rest) = match street_line.trim().split_once(char::is_whitespace) {
        Some(split) => split,
        None => return Vec::new(),
    };
    let number = match leading_number(first) {
        Some(number) => number as i64,
        None => return Vec::new(),
    };
    let rest = rest.trim_start();

    NEARBY_OFFSETS
        .iter()
        .map(|offset| number + offset)
        .filter(|candidate| *candidate >= 1)
        .map(|candidate| format!("{} {}", candidate, rest))
        .collect()
}

// ============================================================================
// AGGREGATOR
// ============================================================================

#[derive(Clone)]
pub struct Aggregator {
    sources: Sources,
    config: Arc<EngineConfig>,
}

impl Aggregator {
    pub fn new(sources: Sources, config: Arc<EngineConfig>) -> Self {
        Aggregator { sources, config }
    }

    /// Collect and reconcile every signal for a free-text address
    pub async fn aggregate(&self, query: &str) -> SignalBundle {
        let address = self.resolve(query).await;
        let street_line = address.street_line();

        let (transactions, owner, energy, building_energy, metered, city_baseline, risks, copro) = tokio::join!(
            self.fetch_transactions(&address),
            self.fetch_owner(&address.label),
            self.fetch_energy(&address),
            self.fetch_building_energy(&address),
            self.fetch_metered(&address.city, &street_line),
            self.fetch_city_baseline(&address.city),
            self.fetch_risks(&address),
            self.fetch_copro(&address.label),
        );

        let (metered_fallback, death_record) = tokio::join!(
            async {
                match metered {
                    Some(found) => (Some(found), None),
                    None => self.nearby_fallback(&address.city, &street_line).await,
                }
            },
            self.check_death_record(&owner, &address.city),
        );
        let (metered, nearby_valid_address) = metered_fallback;

        let consumption = consumption::compare(
            metered.as_ref(),
            energy.as_ref(),
            city_baseline,
            &self.config.consumption,
        );

        debug!(
            address = %address.label,
            transactions = transactions.len(),
            energy = energy.is_some(),
            metered = metered.is_some(),
            deceased = death_record.is_some(),
            "signals aggregated"
        );

        SignalBundle {
            address,
            transactions,
            owner,
            death_record,
            energy,
            building_energy,
            metered,
            nearby_valid_address,
            consumption,
            risks,
            copro,
        }
    }

    async fn resolve(&self, query: &str) -> AddressRecord {
        let resolver = &self.sources.resolver;
        let resolved = guarded(
            SourceKind::Resolver,
            self.config.policy(SourceKind::Resolver),
            move || resolver.resolve(query),
        )
        .await;

        resolved.unwrap_or_else(|| {
            info!(query, "address not resolved, continuing with the raw query");
            AddressRecord::unresolved(query)
        })
    }

    async fn fetch_transactions(&self, address: &AddressRecord) -> Vec<TransactionRecord> {
        let position = match address.coordinates {
            Some(position) => position,
            None => return Vec::new(),
        };
        let source = &self.sources.transactions;
        let radius = self.config.transaction_radius_m;

        let records = guarded(
            SourceKind::Transactions,
            self.config.policy(SourceKind::Transactions),
            move || source.transactions_near(position, radius),
        )
        .await;

        filter_for_street_number(records, address.street_number())
    }

    async fn fetch_owner(&self, address: &str) -> OwnerRecord {
        let source = &self.sources.owner;
        guarded(
            SourceKind::Owner,
            self.config.policy(SourceKind::Owner),
            move || source.owner_at(address),
        )
        .await
    }

    async fn fetch_energy(&self, address: &AddressRecord) -> Option<EnergyRecord> {
        let source = &self.sources.energy;
        let label = address.label.as_str();
        let ban_id = address.ban_id.as_deref();
        guarded(
            SourceKind::Energy,
            self.config.policy(SourceKind::Energy),
            move || source.diagnostic(label, ban_id),
        )
        .await
    }

    async fn fetch_building_energy(&self, address: &AddressRecord) -> Option<BuildingEnergyStats> {
        let ban_id = address.ban_id.as_deref()?;
        let source = &self.sources.energy;
        guarded(
            SourceKind::BuildingEnergy,
            self.config.policy(SourceKind::BuildingEnergy),
            move || source.building_stats(ban_id),
        )
        .await
    }

    async fn fetch_metered(&self, city: &str, address: &str) -> Option<MeteredConsumption> {
        let source = &self.sources.consumption;
        guarded(
            SourceKind::Consumption,
            self.config.policy(SourceKind::Consumption),
            move || source.metered(city, address),
        )
        .await
    }

    async fn fetch_city_baseline(&self, city: &str) -> Option<f64> {
        let source = &self.sources.consumption;
        guarded(
            SourceKind::CityBaseline,
            self.config.policy(SourceKind::CityBaseline),
            move || source.city_baseline(city),
        )
        .await
    }

    async fn fetch_risks(&self, address: &AddressRecord) -> BuildingRiskFlags {
        let position = match address.coordinates {
            Some(position) => position,
            None => return BuildingRiskFlags::default(),
        };
        let source = &self.sources.risks;
        guarded(
            SourceKind::Risks,
            self.config.policy(SourceKind::Risks),
            move || source.risk_flags(position),
        )
        .await
    }

    async fn fetch_copro(&self, address: &str) -> CoproRecord {
        let source = &self.sources.copro;
        guarded(
            SourceKind::Copro,
            self.config.policy(SourceKind::Copro),
            move || source.copro(address),
        )
        .await
    }

    /// Try neighbouring house numbers in priority order, first hit wins.
    /// Sequential on purpose: a later candidate must never beat an earlier one.
    async fn nearby_fallback(
        &self,
        city: &str,
        street_line: &str,
    ) -> (Option<MeteredConsumption>, Option<String>) {
        for candidate in nearby_candidates(street_line) {
            if let Some(found) = self.fetch_metered(city, &candidate).await {
                info!(
                    address = street_line,
                    substitute = %candidate,
                    "metering data taken from a nearby address"
                );
                return (Some(found), Some(candidate));
            }
        }
        (None, None)
    }

    /// Individual owners with a two-token name only; both name orders are
    /// tried because sources disagree on which token is the surname.
    async fn check_death_record(&self, owner: &OwnerRecord, city: &str) -> Option<DeathRecord> {
        let orderings = owner.name_orderings()?;
        let source = &self.sources.death_records;

        for (first_name, last_name) in orderings.iter() {
            let first = first_name.as_str();
            let last = last_name.as_str();
            let found = guarded(
                SourceKind::DeathRecords,
                self.config.policy(SourceKind::DeathRecords),
                move || source.find(first, last, city),
            )
            .await;

            if found.is_some() {
                return found;
            }
        }
        None
    }
}

// ============================================================================
// TESTS
// ============================================================================
