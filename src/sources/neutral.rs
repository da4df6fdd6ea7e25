// Registries without a keyless national API.
// Peril/insalubrity orders are municipal datasets and the co-ownership
// registry needs credentials, so these adapters report "no data".

use async_trait::async_trait;
use tracing::debug;

use super::{CoproSource, RiskSource, SourceResult};
use crate::model::{BuildingRiskFlags, Coordinates, CoproRecord};

/// Never flags a building: no false positives without a real source
pub struct NoRiskRegistry;

#[async_trait]
impl RiskSource for NoRiskRegistry {
    async fn risk_flags(&self, position: Coordinates) -> SourceResult<BuildingRiskFlags> {
        debug!(lat = position.lat, lon = position.lon, "no risk registry configured");
        Ok(BuildingRiskFlags::default())
    }
}

/// Registry search left pending: no identifier, zero lots
pub struct PendingCoproRegistry;

#[async_trait]
impl CoproSource for PendingCoproRegistry {
    async fn copro(&self, address: &str) -> SourceResult<CoproRecord> {
        debug!(address, "no co-ownership registry configured");
        Ok(CoproRecord::default())
    }
}
