// ⚙️ Engine Configuration
// Loaded from an optional TOML file; every field has a default so a
// partial file (or no file at all) is valid.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::sources::{SourceKind, SourcePolicy};

/// Environment variable naming the TOML configuration file
pub const CONFIG_ENV_VAR: &str = "VACANCY_ENGINE_CONFIG";

// ============================================================================
// TIMEOUTS
// ============================================================================

/// Per-adapter timeouts in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceTimeouts {
    pub resolver_ms: u64,
    pub transactions_ms: u64,
    pub owner_ms: u64,
    pub energy_ms: u64,
    pub consumption_ms: u64,
    pub risks_ms: u64,
    pub copro_ms: u64,
    pub death_records_ms: u64,
}

impl Default for SourceTimeouts {
    fn default() -> Self {
        SourceTimeouts {
            resolver_ms: 5_000,
            transactions_ms: 2_000,
            owner_ms: 5_000,
            energy_ms: 5_000,
            consumption_ms: 5_000,
            risks_ms: 5_000,
            copro_ms: 5_000,
            death_records_ms: 5_000,
        }
    }
}

impl SourceTimeouts {
    /// Every adapter bounded by the same timeout
    pub fn uniform(millis: u64) -> Self {
        SourceTimeouts {
            resolver_ms: millis,
            transactions_ms: millis,
            owner_ms: millis,
            energy_ms: millis,
            consumption_ms: millis,
            risks_ms: millis,
            copro_ms: millis,
            death_records_ms: millis,
        }
    }

    pub fn for_source(&self, kind: SourceKind) -> Duration {
        let millis = match kind {
            SourceKind::Resolver => self.resolver_ms,
            SourceKind::Transactions => self.transactions_ms,
            SourceKind::Owner => self.owner_ms,
            SourceKind::Energy | SourceKind::BuildingEnergy => self.energy_ms,
            SourceKind::Consumption | SourceKind::CityBaseline => self.consumption_ms,
            SourceKind::Risks => self.risks_ms,
            SourceKind::Copro => self.copro_ms,
            SourceKind::DeathRecords => self.death_records_ms,
        };
        Duration::from_millis(millis)
    }
}

// ============================================================================
// ALGORITHM CONSTANTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionConfig {
    /// Records at or below this built surface are parking/storage lots, m²
    pub min_unit_surface: f64,

    /// Lot indices at or above this are block numbering, not unit numbering
    pub max_lot_index: u32,

    /// Unit surface used when neither transactions nor diagnostics help, m²
    pub default_unit_surface: f64,

    /// Plausible range for a mean unit surface, m²
    pub plausible_surface_min: f64,
    pub plausible_surface_max: f64,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        ReconstructionConfig {
            min_unit_surface: 9.0,
            max_lot_index: 500,
            default_unit_surface: 60.0,
            plausible_surface_min: 9.0,
            plausible_surface_max: 400.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsumptionConfig {
    /// Surface applied to the DPE consumption per m², m²
    pub reference_surface_m2: f64,

    /// Expected yearly consumption of a dwelling without DPE data, MWh
    pub city_baseline_mwh: f64,
}

impl Default for ConsumptionConfig {
    fn default() -> Self {
        ConsumptionConfig {
            reference_surface_m2: 60.0,
            city_baseline_mwh: 4.5,
        }
    }
}

// ============================================================================
// ENDPOINTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub address_base: String,
    pub transactions: String,
    pub companies: String,
    pub energy_diagnostics: String,
    pub metered_consumption: String,
    pub death_records: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            address_base: "https://api-adresse.data.gouv.fr".to_string(),
            transactions: "https://api.cquest.org".to_string(),
            companies: "https://recherche-entreprises.api.gouv.fr".to_string(),
            energy_diagnostics: "https://data.ademe.fr".to_string(),
            metered_consumption: "https://data.enedis.fr".to_string(),
            death_records: "https://deces.matchid.io".to_string(),
        }
    }
}

// ============================================================================
// ENGINE CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub timeouts: SourceTimeouts,

    /// Extra attempts after a failed or timed-out lookup
    pub retries: u32,

    /// Search radius for the transaction history, meters
    pub transaction_radius_m: u32,

    /// Reported confidence. Fixed for now: not derived from source coverage.
    pub confidence: f64,

    pub reconstruction: ReconstructionConfig,
    pub consumption: ConsumptionConfig,
    pub endpoints: Endpoints,

    /// Addresses analyzed by a location-only search
    pub seed_addresses: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            timeouts: SourceTimeouts::default(),
            retries: 0,
            transaction_radius_m: 50,
            confidence: 0.9,
            reconstruction: ReconstructionConfig::default(),
            consumption: ConsumptionConfig::default(),
            endpoints: Endpoints::default(),
            seed_addresses: default_seed_addresses(),
        }
    }
}

fn default_seed_addresses() -> Vec<String> {
    [
        "227 rue d'Alésia, 75014 Paris",
        "10 avenue de la République, 75011 Paris",
        "54 boulevard de Magenta, 75010 Paris",
        "15 rue de Vaugirard, 75006 Paris",
        "88 rue de la Pompe, 75016 Paris",
        "3 place des Terreaux, 69001 Lyon",
        "20 cours Vitton, 69006 Lyon",
        "14 rue de la République, 13001 Marseille",
        "5 avenue du Prado, 13006 Marseille",
        "12 rue Sainte-Catherine, 33000 Bordeaux",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl EngineConfig {
    /// Parse a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(raw).context("Failed to parse TOML")?;
        Ok(config)
    }

    /// Load the file named by `VACANCY_ENGINE_CONFIG`, defaults otherwise
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::load(Path::new(path.trim())),
            _ => Ok(Self::default()),
        }
    }

    /// Timeout and retry policy for one adapter
    pub fn policy(&self, kind: SourceKind) -> SourcePolicy {
        SourcePolicy {
            timeout: self.timeouts.for_source(kind),
            retries: self.retries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();

        assert_eq!(config.transaction_radius_m, 50);
        assert_eq!(config.confidence, 0.9);
        assert_eq!(config.retries, 0);
        assert_eq!(config.seed_addresses.len(), 10);
        assert_eq!(
            config.policy(SourceKind::Transactions).timeout,
            Duration::from_millis(2_000)
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml(
            r#"
            retries = 2
            transaction_radius_m = 20

            [timeouts]
            owner_ms = 8000

            [endpoints]
            transactions = "http://localhost:9000"
            "#,
        )
        .unwrap();

        assert_eq!(config.retries, 2);
        assert_eq!(config.transaction_radius_m, 20);
        assert_eq!(config.timeouts.owner_ms, 8_000);
        assert_eq!(config.timeouts.resolver_ms, 5_000);
        assert_eq!(config.endpoints.transactions, "http://localhost:9000");
        assert_eq!(config.endpoints.companies, Endpoints::default().companies);
        assert_eq!(config.reconstruction, ReconstructionConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(EngineConfig::from_toml("retries = \"many\"").is_err());
    }

    #[test]
    fn test_load_missing_file_names_the_path() {
        let err = EngineConfig::load(Path::new("/nonexistent/vacancy.toml")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/vacancy.toml"));
    }

    #[test]
    fn test_policy_shares_timeouts_between_related_sources() {
        let config = EngineConfig {
            timeouts: SourceTimeouts::uniform(250),
            retries: 1,
            ..EngineConfig::default()
        };

        let policy = config.policy(SourceKind::CityBaseline);
        assert_eq!(policy.timeout, Duration::from_millis(250));
        assert_eq!(policy.retries, 1);
    }
}
