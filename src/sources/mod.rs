// 🔌 Source Adapters - One narrow, typed lookup per third-party dataset
//
// Adapters return `SourceResult`; the engine never sees those errors.
// Every call goes through `guarded`, which bounds it with a timeout and
// turns any failure into the adapter's neutral "no data" value.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::model::{
    AddressRecord, BuildingEnergyStats, BuildingRiskFlags, Coordinates, CoproRecord, DeathRecord,
    EnergyRecord, MeteredConsumption, OwnerRecord, TransactionRecord,
};

pub mod http;
pub mod mock;
pub mod neutral;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected HTTP status {0}")]
    Http(u16),

    #[error("malformed payload: {0}")]
    Parse(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SourceError::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            SourceError::Http(status.as_u16())
        } else {
            SourceError::Network(err.to_string())
        }
    }
}

pub type SourceResult<T> = Result<T, SourceError>;

// ============================================================================
// SOURCE KINDS & POLICY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Resolver,
    Transactions,
    Owner,
    Energy,
    BuildingEnergy,
    Consumption,
    CityBaseline,
    Risks,
    Copro,
    DeathRecords,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Resolver => "resolver",
            SourceKind::Transactions => "transactions",
            SourceKind::Owner => "owner",
            SourceKind::Energy => "energy",
            SourceKind::BuildingEnergy => "building_energy",
            SourceKind::Consumption => "consumption",
            SourceKind::CityBaseline => "city_baseline",
            SourceKind::Risks => "risks",
            SourceKind::Copro => "copro",
            SourceKind::DeathRecords => "death_records",
        }
    }
}

/// Timeout and retry budget for one adapter call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePolicy {
    pub timeout: Duration,
    pub retries: u32,
}

/// Run an adapter call under its policy.
///
/// A timeout is handled exactly like an error. After the last failed
/// attempt the neutral value (`T::default()`) is returned.
pub async fn guarded<T, F, Fut>(kind: SourceKind, policy: SourcePolicy, call: F) -> T
where
    T: Default,
    F: Fn() -> Fut,
    Fut: Future<Output = SourceResult<T>>,
{
    let attempts = policy.retries + 1;

    for attempt in 1..=attempts {
        let outcome = match tokio::time::timeout(policy.timeout, call()).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout(policy.timeout)),
        };

        match outcome {
            Ok(value) => {
                debug!(source = kind.as_str(), attempt, "source lookup succeeded");
                return value;
            }
            Err(err) => {
                warn!(
                    source = kind.as_str(),
                    attempt,
                    attempts,
                    error = %err,
                    "source lookup failed"
                );
            }
        }
    }

    T::default()
}

// ============================================================================
// ADAPTER TRAITS
// ============================================================================

#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Best canonical match for a free-text query
    async fn resolve(&self, query: &str) -> SourceResult<Option<AddressRecord>>;
}

#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Sales recorded within `radius_m` meters of a point
    async fn transactions_near(
        &self,
        position: Coordinates,
        radius_m: u32,
    ) -> SourceResult<Vec<TransactionRecord>>;
}

#[async_trait]
pub trait OwnerSource: Send + Sync {
    async fn owner_at(&self, address: &str) -> SourceResult<OwnerRecord>;
}

#[async_trait]
pub trait EnergySource: Send + Sync {
    /// Unit diagnostic, by canonical id when known, by address text otherwise
    async fn diagnostic(
        &self,
        address: &str,
        ban_id: Option<&str>,
    ) -> SourceResult<Option<EnergyRecord>>;

    /// Aggregate of every diagnostic filed for the building
    async fn building_stats(&self, ban_id: &str) -> SourceResult<Option<BuildingEnergyStats>>;
}

#[async_trait]
pub trait ConsumptionSource: Send + Sync {
    async fn metered(&self, city: &str, address: &str)
        -> SourceResult<Option<MeteredConsumption>>;

    /// Average yearly consumption per dwelling in the city, MWh
    async fn city_baseline(&self, city: &str) -> SourceResult<Option<f64>>;
}

#[async_trait]
pub trait RiskSource: Send + Sync {
    async fn risk_flags(&self, position: Coordinates) -> SourceResult<BuildingRiskFlags>;
}

#[async_trait]
pub trait CoproSource: Send + Sync {
    async fn copro(&self, address: &str) -> SourceResult<CoproRecord>;
}

#[async_trait]
pub trait DeathRecordSource: Send + Sync {
    async fn find(
        &self,
        first_name: &str,
        last_name: &str,
        city: &str,
    ) -> SourceResult<Option<DeathRecord>>;
}

// ============================================================================
// SOURCE BUNDLE
// ============================================================================

/// Every collaborator the aggregator fans out to
#[derive(Clone)]
pub struct Sources {
    pub resolver: Arc<dyn AddressResolver>,
    pub transactions: Arc<dyn TransactionSource>,
    pub owner: Arc<dyn OwnerSource>,
    pub energy: Arc<dyn EnergySource>,
    pub consumption: Arc<dyn ConsumptionSource>,
    pub risks: Arc<dyn RiskSource>,
    pub copro: Arc<dyn CoproSource>,
    pub death_records: Arc<dyn DeathRecordSource>,
}

impl Sources {
    /// Live open-data adapters at the configured endpoints
    pub fn http(config: &EngineConfig) -> Self {
        let client = http::shared_client();
        let endpoints = &config.endpoints;

        Sources {
            resolver: Arc::new(http::BanResolver::new(client.clone(), &endpoints.address_base)),
            transactions: Arc::new(http::DvfClient::new(client.clone(), &endpoints.transactions)),
            owner: Arc::new(http::CompanyRegistryClient::new(client.clone(), &endpoints.companies)),
            energy: Arc::new(http::DpeClient::new(client.clone(), &endpoints.energy_diagnostics)),
            consumption: Arc::new(http::EnedisClient::new(
                client.clone(),
                &endpoints.metered_consumption,
            )),
            risks: Arc::new(neutral::NoRiskRegistry),
            copro: Arc::new(neutral::PendingCoproRegistry),
            death_records: Arc::new(http::MatchIdClient::new(client, &endpoints.death_records)),
        }
    }
}
