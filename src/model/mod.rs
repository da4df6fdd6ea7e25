// Data Model - every record exchanged between adapters, engine and callers
// Created fresh for each analysis; nothing here is persisted.

pub mod address;
pub mod building;
pub mod energy;
pub mod owner;
pub mod property;
pub mod transaction;

pub use address::{AddressRecord, Coordinates, UNKNOWN_CITY, UNKNOWN_POSTCODE};
pub use building::{BuildingDetails, BuildingEstimate, BuildingRiskFlags, CoproRecord, EstimateSource};
pub use energy::{BuildingEnergyStats, ConsumptionCheck, EnergyClass, EnergyRecord, MeteredConsumption};
pub use owner::{AdministrativeStatus, DeathRecord, OwnerKind, OwnerRecord};
pub use property::{
    AnalysisReport, OwnerLiveness, Property, PropertyStatus, PropertyType, ScoringAttributes,
    Trajectory,
};
pub use transaction::TransactionRecord;
