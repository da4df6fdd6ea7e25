// 🧪 Mock Sources - Deterministic in-memory adapters
// Scripted data per source, injectable failures and delays, and a log of
// the queries each source received (for ordering assertions).

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use super::{
    AddressResolver, ConsumptionSource, CoproSource, DeathRecordSource, EnergySource, OwnerSource,
    RiskSource, SourceError, SourceKind, SourceResult, Sources, TransactionSource,
};
use crate::model::{
    AddressRecord, BuildingEnergyStats, BuildingRiskFlags, Coordinates, CoproRecord, DeathRecord,
    EnergyRecord, MeteredConsumption, OwnerRecord, TransactionRecord,
};

/// Queries received by the mock, in call order
#[derive(Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<(SourceKind, String)>>>,
}

impl CallLog {
    fn record(&self, kind: SourceKind, query: String) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((kind, query));
    }

    /// Queries sent to one source
    pub fn queries(&self, kind: SourceKind) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, q)| q.clone())
            .collect()
    }
}

#[derive(Clone, Default)]
pub struct MockSources {
    address: Option<AddressRecord>,
    transactions: Vec<TransactionRecord>,
    owner: OwnerRecord,
    energy: Option<EnergyRecord>,
    building_energy: Option<BuildingEnergyStats>,
    metered: HashMap<String, MeteredConsumption>,
    city_baseline: Option<f64>,
    risks: BuildingRiskFlags,
    copro: CoproRecord,
    /// (first, last) pairs present in the death register
    deceased: HashSet<(String, String)>,
    failing: HashSet<SourceKind>,
    delays: HashMap<SourceKind, Duration>,
    log: CallLog,
}

impl MockSources {
    /// Every source answers "no data", the resolver finds nothing
    pub fn new() -> Self {
        MockSources::default()
    }

    pub fn with_address(mut self, address: AddressRecord) -> Self {
        self.address = Some(address);
        self
    }

    pub fn with_transactions(mut self, transactions: Vec<TransactionRecord>) -> Self {
        self.transactions = transactions;
        self
    }

    pub fn with_owner(mut self, owner: OwnerRecord) -> Self {
        self.owner = owner;
        self
    }

    pub fn with_energy(mut self, energy: EnergyRecord) -> Self {
        self.energy = Some(energy);
        self
    }

    pub fn with_building_energy(mut self, stats: BuildingEnergyStats) -> Self {
        self.building_energy = Some(stats);
        self
    }

    /// Metering data answered for exactly this address text
    pub fn with_metered(mut self, address: &str, metered: MeteredConsumption) -> Self {
        self.metered.insert(address.to_string(), metered);
        self
    }

    pub fn with_city_baseline(mut self, mwh: f64) -> Self {
        self.city_baseline = Some(mwh);
        self
    }

    pub fn with_risks(mut self, risks: BuildingRiskFlags) -> Self {
        self.risks = risks;
        self
    }

    pub fn with_copro(mut self, copro: CoproRecord) -> Self {
        self.copro = copro;
        self
    }

    pub fn with_death_record(mut self, first_name: &str, last_name: &str) -> Self {
        self.deceased
            .insert((first_name.to_string(), last_name.to_string()));
        self
    }

    /// This source returns an error on every call
    pub fn failing(mut self, kind: SourceKind) -> Self {
        self.failing.insert(kind);
        self
    }

    /// This source answers only after `delay`
    pub fn slow(mut self, kind: SourceKind, delay: Duration) -> Self {
        self.delays.insert(kind, delay);
        self
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    /// Plug the same mock into every slot
    pub fn into_sources(self) -> Sources {
        let shared = Arc::new(self);
        Sources {
            resolver: shared.clone(),
            transactions: shared.clone(),
            owner: shared.clone(),
            energy: shared.clone(),
            consumption: shared.clone(),
            risks: shared.clone(),
            copro: shared.clone(),
            death_records: shared,
        }
    }

    async fn enter(&self, kind: SourceKind, query: String) -> SourceResult<()> {
        self.log.record(kind, query);
        if let Some(delay) = self.delays.get(&kind) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(&kind) {
            return Err(SourceError::Network(format!("{} unavailable", kind.as_str())));
        }
        Ok(())
    }
}

#[async_trait]
impl AddressResolver for MockSources {
    async fn resolve(&self, query: &str) -> SourceResult<Option<AddressRecord>> {
        self.enter(SourceKind::Resolver, query.to_string()).await?;
        Ok(self.address.clone())
    }
}

#[async_trait]
impl TransactionSource for MockSources {
    async fn transactions_near(
        &self,
        position: Coordinates,
        radius_m: u32,
    ) -> SourceResult<Vec<TransactionRecord>> {
        let query = format!("{},{}@{}", position.lat, position.lon, radius_m);
        self.enter(SourceKind::Transactions, query).await?;
        Ok(self.transactions.clone())
    }
}

#[async_trait]
impl OwnerSource for MockSources {
    async fn owner_at(&self, address: &str) -> SourceResult<OwnerRecord> {
        self.enter(SourceKind::Owner, address.to_string()).await?;
        Ok(self.owner.clone())
    }
}

#[async_trait]
impl EnergySource for MockSources {
    async fn diagnostic(
        &self,
        address: &str,
        _ban_id: Option<&str>,
    ) -> SourceResult<Option<EnergyRecord>> {
        self.enter(SourceKind::Energy, address.to_string()).await?;
        Ok(self.energy.clone())
    }

    async fn building_stats(&self, ban_id: &str) -> SourceResult<Option<BuildingEnergyStats>> {
        self.enter(SourceKind::BuildingEnergy, ban_id.to_string()).await?;
        Ok(self.building_energy.clone())
    }
}

#[async_trait]
impl ConsumptionSource for MockSources {
    async fn metered(
        &self,
        _city: &str,
        address: &str,
    ) -> SourceResult<Option<MeteredConsumption>> {
        self.enter(SourceKind::Consumption, address.to_string()).await?;
        Ok(self.metered.get(address).cloned())
    }

    async fn city_baseline(&self, city: &str) -> SourceResult<Option<f64>> {
        self.enter(SourceKind::CityBaseline, city.to_string()).await?;
        Ok(self.city_baseline)
    }
}

#[async_trait]
impl RiskSource for MockSources {
    async fn risk_flags(&self, position: Coordinates) -> SourceResult<BuildingRiskFlags> {
        self.enter(SourceKind::Risks, format!("{},{}", position.lat, position.lon))
            .await?;
        Ok(self.risks)
    }
}

#[async_trait]
impl CoproSource for MockSources {
    async fn copro(&self, address: &str) -> SourceResult<CoproRecord> {
        self.enter(SourceKind::Copro, address.to_string()).await?;
        Ok(self.copro.clone())
    }
}

#[async_trait]
impl DeathRecordSource for MockSources {
    async fn find(
        &self,
        first_name: &str,
        last_name: &str,
        city: &str,
    ) -> SourceResult<Option<DeathRecord>> {
        self.enter(SourceKind::DeathRecords, format!("{} {}", first_name, last_name))
            .await?;
        let key = (first_name.to_string(), last_name.to_string());
        Ok(self.deceased.contains(&key).then(|| DeathRecord {
            last_name: last_name.to_string(),
            first_name: first_name.to_string(),
            death_date: None,
            death_city: Some(city.to_string()),
        }))
    }
}

// ============================================================================
// FIXTURE HELPERS
// ============================================================================

/// A resolved address with split number/street
pub fn resolved_address(housenumber: &str, street: &str, postcode: &str, city: &str) -> AddressRecord {
    AddressRecord {
        label: format!("{} {} {} {}", housenumber, street, postcode, city),
        city: city.to_string(),
        postal_code: postcode.to_string(),
        citycode: None,
        coordinates: Some(Coordinates::new(2.3522, 48.8566)),
        ban_id: Some(format!("{}_{}", postcode, housenumber)),
        housenumber: Some(housenumber.to_string()),
        street: Some(street.to_string()),
        resolved: true,
    }
}

/// Metering answer with a per-unit average
pub fn metered(address: &str, average_mwh: f64, unit_count: u32) -> MeteredConsumption {
    MeteredConsumption {
        address_label: address.to_uppercase(),
        total_mwh: Some(average_mwh * unit_count as f64),
        average_mwh: Some(average_mwh),
        unit_count,
        segment: Some("RES1".to_string()),
    }
}
