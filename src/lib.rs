// Vacancy Engine - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod model;
pub mod config;
pub mod sources;        // Source adapters, timeouts, neutral values
pub mod consumption;    // Real vs theoretical consumption
pub mod aggregator;     // Concurrent fan-out + nearby fallback + death check
pub mod reconstruction; // Building unit count & surface
pub mod scoring;        // Weighted vacancy indicators
pub mod identifier;     // Reversible property identifier
pub mod assembler;      // Immutable Property record
pub mod store;          // Write-once in-memory property store
pub mod engine;         // analyze / get_by_identifier / search

// Re-export commonly used types
pub use model::{
    AddressRecord, AnalysisReport, BuildingDetails, BuildingEstimate, BuildingRiskFlags,
    ConsumptionCheck, EnergyClass, EnergyRecord, EstimateSource, OwnerKind, OwnerRecord,
    Property, PropertyStatus, PropertyType, ScoringAttributes, TransactionRecord, Trajectory,
};
pub use config::{EngineConfig, CONFIG_ENV_VAR};
pub use sources::{guarded, SourceError, SourceKind, SourcePolicy, Sources};
pub use aggregator::{nearby_candidates, Aggregator, SignalBundle};
pub use reconstruction::{BuildingReconstructor, TransactionEstimate};
pub use scoring::{Indicator, ScoreOutcome, ScoringEngine};
pub use assembler::PropertyAssembler;
pub use store::PropertyStore;
pub use engine::{PropertyFilters, VacancyEngine};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
