// 🧩 Property Assembler - Freeze one analysis into an immutable Property
//
// Inputs: aggregated signals, building estimate, scoring outcome.
// The identifier encodes the query exactly as the caller typed it,
// not the resolver's normalized label.

use chrono::{Datelike, NaiveDate};

use crate::aggregator::SignalBundle;
use crate::identifier;
use crate::model::{
    AdministrativeStatus, AnalysisReport, BuildingDetails, BuildingEstimate, OwnerKind,
    OwnerLiveness, OwnerRecord, Property, PropertyType, ScoringAttributes,
};
use crate::scoring::ScoreOutcome;

// ============================================================================
// SCORING ATTRIBUTES
// ============================================================================

/// Normalize the bundle into the inputs the scoring engine consumes.
///
/// `today` is the reference date for every "years since" figure.
pub fn scoring_attributes(bundle: &SignalBundle, today: NaiveDate) -> ScoringAttributes {
    ScoringAttributes {
        consumption_ratio: bundle.consumption.consumption_ratio,
        owner_status: owner_liveness(&bundle.owner, bundle.owner_deceased()),
        years_since_last_transaction: bundle
            .last_transaction()
            .and_then(|tx| tx.date)
            .map(|date| years_between(date.year(), today)),
        facade_unchanged_years: 0,
        is_sci_or_indivision: bundle.owner.is_sci_or_indivision,
        dpe_class: bundle.energy.as_ref().map(|e| e.dpe_class()),
        building_age: bundle
            .copro
            .construction_year
            .map_or(0, |year| years_between(year, today) as u32),
        has_vacant_lot_identified: false,
        floor_identified: false,
    }
}

fn years_between(year: i32, today: NaiveDate) -> i32 {
    (today.year() - year).max(0)
}

fn owner_liveness(owner: &OwnerRecord, deceased: bool) -> OwnerLiveness {
    if deceased {
        return OwnerLiveness::Deceased;
    }
    match owner.kind {
        // Alive only when a death-register check could actually run
        OwnerKind::Individual if owner.name_orderings().is_some() => OwnerLiveness::Alive,
        OwnerKind::Individual => OwnerLiveness::Unknown,
        OwnerKind::Company | OwnerKind::Public => match owner.status {
            Some(AdministrativeStatus::Active) => OwnerLiveness::Active,
            Some(AdministrativeStatus::Inactive) => OwnerLiveness::Inactive,
            Some(AdministrativeStatus::Liquidation) => OwnerLiveness::Liquidation,
            Some(AdministrativeStatus::Receivership) => OwnerLiveness::Receivership,
            None => OwnerLiveness::Unknown,
        },
    }
}

// ============================================================================
// ASSEMBLER
// ============================================================================

pub struct PropertyAssembler {
    /// Fixed confidence attached to every report (not computed per signal)
    pub confidence: f64,
}

impl PropertyAssembler {
    pub fn new(confidence: f64) -> Self {
        PropertyAssembler { confidence }
    }

    pub fn assemble(
        &self,
        query: &str,
        bundle: SignalBundle,
        estimate: &BuildingEstimate,
        attributes: ScoringAttributes,
        outcome: ScoreOutcome,
    ) -> AnalysisReport {
        let property_type = classify(&bundle, estimate);
        let area = unit_area(&bundle);
        let last_transaction_date = bundle.last_transaction().and_then(|tx| tx.date);
        let building = BuildingDetails::from_registry(&bundle.copro, bundle.risks);

        let property = Property {
            id: identifier::encode(query),
            address: bundle.address.label,
            city: bundle.address.city,
            zip_code: bundle.address.postal_code,
            property_type,
            area,
            vacancy_score: outcome.score,
            trajectory: outcome.trajectory,
            status: outcome.status,
            owner: bundle.owner,
            energy: bundle.energy,
            consumption: bundle.consumption,
            last_transaction_date,
            building_surface: estimate.surface,
            building_units: estimate.unit_count,
            building_estimate_source: estimate.source,
            building,
            scoring_attributes: attributes,
            insights: outcome.insights,
            nearby_valid_address: bundle.nearby_valid_address,
            confidence: self.confidence,
        };

        AnalysisReport {
            property,
            confidence: self.confidence,
        }
    }
}

/// Building > commercial > residential unit
pub fn classify(bundle: &SignalBundle, estimate: &BuildingEstimate) -> PropertyType {
    if estimate.unit_count > 1 {
        PropertyType::Building
    } else if bundle.last_transaction().map_or(false, |tx| tx.is_commercial()) {
        PropertyType::Commercial
    } else {
        PropertyType::ResidentialUnit
    }
}

/// Last sale's built surface, then the diagnostic's surface, else 0
fn unit_area(bundle: &SignalBundle) -> f64 {
    bundle
        .last_transaction()
        .and_then(|tx| tx.built_surface)
        .filter(|surface| *surface > 0.0)
        .or_else(|| bundle.energy.as_ref().and_then(|e| e.surface_estimate))
        .unwrap_or(0.0)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AddressRecord, BuildingEnergyStats, BuildingRiskFlags, ConsumptionCheck, CoproRecord,
        DeathRecord, EnergyClass, EnergyRecord, EstimateSource, PropertyStatus, TransactionRecord,
        Trajectory,
    };
    use crate::reconstruction::BuildingReconstructor;
    use crate::scoring::ScoringEngine;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    fn bundle() -> SignalBundle {
        SignalBundle {
            address: AddressRecord::unresolved("15 rue de Vaugirard"),
            transactions: Vec::new(),
            owner: OwnerRecord::default(),
            death_record: None,
            energy: None,
            building_energy: None,
            metered: None,
            nearby_valid_address: None,
            consumption: ConsumptionCheck {
                real_consumption: None,
                theoretical_consumption: 4.5,
                consumption_ratio: None,
                segment: None,
                unit_count: 0,
            },
            risks: BuildingRiskFlags::default(),
            copro: CoproRecord::default(),
        }
    }

    fn estimate(units: u32) -> BuildingEstimate {
        BuildingEstimate {
            unit_count: units,
            surface: units as f64 * 60.0,
            average_unit_surface: 60.0,
            source: EstimateSource::FallbackSurface,
        }
    }

    fn sale(date: &str, local_type: &str, surface: f64) -> TransactionRecord {
        TransactionRecord {
            mutation_id: "2019-123".to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
            value: Some(250_000.0),
            street_number: Some(15),
            street_name: None,
            local_type: Some(local_type.to_string()),
            built_surface: Some(surface),
            lot_index: None,
        }
    }

    #[test]
    fn test_attributes_from_empty_bundle() {
        let attributes = scoring_attributes(&bundle(), today());

        assert_eq!(attributes.consumption_ratio, None);
        assert_eq!(attributes.years_since_last_transaction, None);
        assert_eq!(attributes.owner_status, OwnerLiveness::Unknown);
        assert_eq!(attributes.building_age, 0);
        assert_eq!(attributes.facade_unchanged_years, 0);
        assert!(!attributes.floor_identified);
        assert!(!attributes.has_vacant_lot_identified);
    }

    #[test]
    fn test_attributes_years_and_age() {
        let mut signals = bundle();
        signals.transactions = vec![sale("2019-11-20", "Appartement", 42.0)];
        signals.copro.construction_year = Some(1930);
        signals.energy = Some(EnergyRecord::new(EnergyClass::G, None, None, None));

        let attributes = scoring_attributes(&signals, today());

        assert_eq!(attributes.years_since_last_transaction, Some(7));
        assert_eq!(attributes.building_age, 96);
        assert_eq!(attributes.dpe_class, Some(EnergyClass::G));
        assert!(attributes.is_energy_sieve());
    }

    #[test]
    fn test_owner_liveness_mapping() {
        let mut signals = bundle();
        signals.owner = OwnerRecord::individual("Jean MARTIN");
        assert_eq!(scoring_attributes(&signals, today()).owner_status, OwnerLiveness::Alive);

        signals.death_record = Some(DeathRecord {
            last_name: "MARTIN".to_string(),
            first_name: "Jean".to_string(),
            death_date: None,
            death_city: None,
        });
        assert_eq!(scoring_attributes(&signals, today()).owner_status, OwnerLiveness::Deceased);

        signals.death_record = None;
        signals.owner = OwnerRecord {
            kind: OwnerKind::Company,
            status: Some(AdministrativeStatus::Liquidation),
            ..OwnerRecord::individual("SCI DU PARC")
        };
        assert_eq!(
            scoring_attributes(&signals, today()).owner_status,
            OwnerLiveness::Liquidation
        );
    }

    #[test]
    fn test_type_precedence() {
        let mut signals = bundle();
        signals.transactions = vec![sale("2020-01-01", "Local industriel. commercial ou assimilé", 80.0)];

        assert_eq!(classify(&signals, &estimate(4)), PropertyType::Building);
        assert_eq!(classify(&signals, &estimate(1)), PropertyType::Commercial);

        signals.transactions = vec![sale("2020-01-01", "Appartement", 40.0)];
        assert_eq!(classify(&signals, &estimate(1)), PropertyType::ResidentialUnit);
        assert_eq!(classify(&bundle(), &estimate(1)), PropertyType::ResidentialUnit);
    }

    #[test]
    fn test_rediagnosed_house_is_residential_unit() {
        let mut signals = bundle();
        signals.transactions = vec![sale("2018-06-12", "Maison", 110.0)];
        signals.building_energy = Some(BuildingEnergyStats {
            record_count: 2,
            dominant_class: Some(EnergyClass::D),
            mean_surface: Some(108.0),
        });

        let estimate = BuildingReconstructor::default().reconstruct(&signals);

        assert_eq!(estimate.unit_count, 1);
        assert_eq!(estimate.source, EstimateSource::Transactions);
        assert_eq!(classify(&signals, &estimate), PropertyType::ResidentialUnit);
    }

    #[test]
    fn test_assemble_uses_raw_query_for_id() {
        let mut signals = bundle();
        signals.address = AddressRecord {
            label: "15 Rue de Vaugirard 75006 Paris".to_string(),
            city: "Paris".to_string(),
            postal_code: "75006".to_string(),
            resolved: true,
            ..AddressRecord::unresolved("15 rue de vaugirard paris")
        };
        signals.transactions = vec![sale("2021-06-01", "Appartement", 38.5)];
        signals.nearby_valid_address = Some("13 Rue de Vaugirard".to_string());

        let attributes = scoring_attributes(&signals, today());
        let outcome = ScoringEngine::new().score(&attributes, &signals.risks, signals.owner.kind);
        let report = PropertyAssembler::new(0.9).assemble(
            "15 rue de vaugirard paris",
            signals,
            &estimate(1),
            attributes,
            outcome,
        );
        let property = report.property;

        assert_eq!(property.id, identifier::encode("15 rue de vaugirard paris"));
        assert_eq!(property.address, "15 Rue de Vaugirard 75006 Paris");
        assert_eq!(property.zip_code, "75006");
        assert_eq!(property.area, 38.5);
        assert_eq!(property.last_transaction_date, NaiveDate::from_ymd_opt(2021, 6, 1));
        assert_eq!(property.nearby_valid_address.as_deref(), Some("13 Rue de Vaugirard"));
        assert_eq!(property.building.registry_label(), "PENDING-SEARCH");
        assert_eq!(property.status, PropertyStatus::Occupied);
        assert_eq!(property.trajectory, Trajectory::Indeterminate);
        assert_eq!(report.confidence, 0.9);
        assert_eq!(property.confidence, 0.9);
    }

    #[test]
    fn test_area_falls_back_to_diagnostic_surface() {
        let mut signals = bundle();
        assert_eq!(unit_area(&signals), 0.0);

        signals.energy = Some(EnergyRecord::new(EnergyClass::C, None, None, Some(64.0)));
        assert_eq!(unit_area(&signals), 64.0);
    }
}
