// 🎯 Vacancy Engine - Public entry points for the presentation layer
//
// analyze:            address → Aggregator → Reconstructor → Scoring → Assembler
// get_by_identifier:  store hit, else decode the id and re-analyze
// search:             analyze a query or the seed addresses of a location, then filter

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::aggregator::Aggregator;
use crate::assembler::{scoring_attributes, PropertyAssembler};
use crate::config::EngineConfig;
use crate::identifier;
use crate::model::{AnalysisReport, Property, PropertyType};
use crate::reconstruction::BuildingReconstructor;
use crate::scoring::ScoringEngine;
use crate::sources::Sources;
use crate::store::PropertyStore;

/// Free-text queries shorter than this are ignored by `search`
const MIN_QUERY_CHARS: usize = 4;

/// Decoded identifiers shorter than this are not worth re-analyzing
const MIN_RECOVERED_ADDRESS_CHARS: usize = 6;

// ============================================================================
// SEARCH FILTERS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyFilters {
    /// Specific address to analyze
    pub query: Option<String>,

    /// City or postcode matched against the seed addresses
    pub location: Option<String>,

    pub min_score: Option<u8>,
    pub property_type: Option<PropertyType>,

    /// Unit surface bounds, m²
    pub min_surface: Option<f64>,
    pub max_surface: Option<f64>,
}

impl PropertyFilters {
    pub fn matches(&self, property: &Property) -> bool {
        if let Some(min_score) = self.min_score {
            if property.vacancy_score < min_score {
                return false;
            }
        }
        if let Some(min_surface) = self.min_surface {
            if property.area < min_surface {
                return false;
            }
        }
        if let Some(max_surface) = self.max_surface {
            if property.area > max_surface {
                return false;
            }
        }
        if let Some(property_type) = self.property_type {
            if property.property_type != property_type {
                return false;
            }
        }
        true
    }
}

// ============================================================================
// ENGINE
// ============================================================================

#[derive(Clone)]
pub struct VacancyEngine {
    aggregator: Aggregator,
    reconstructor: Arc<BuildingReconstructor>,
    scoring: Arc<ScoringEngine>,
    assembler: Arc<PropertyAssembler>,
    store: PropertyStore,
    config: Arc<EngineConfig>,
    reference_date: Option<NaiveDate>,
}

impl VacancyEngine {
    pub fn new(sources: Sources, config: EngineConfig, store: PropertyStore) -> Self {
        let config = Arc::new(config);

        VacancyEngine {
            aggregator: Aggregator::new(sources, config.clone()),
            reconstructor: Arc::new(BuildingReconstructor::new(config.reconstruction.clone())),
            scoring: Arc::new(ScoringEngine::new()),
            assembler: Arc::new(PropertyAssembler::new(config.confidence)),
            store,
            config,
            reference_date: None,
        }
    }

    /// Live open-data sources with a fresh store
    pub fn with_http_sources(config: EngineConfig) -> Self {
        let sources = Sources::http(&config);
        Self::new(sources, config, PropertyStore::new())
    }

    /// Pin "today" (defaults to the local date at analysis time)
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn store(&self) -> &PropertyStore {
        &self.store
    }

    fn today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Best-effort analysis of one address; never fails
    pub async fn analyze(&self, query: &str) -> AnalysisReport {
        let bundle = self.aggregator.aggregate(query).await;

        let estimate = self.reconstructor.reconstruct(&bundle);
        let attributes = scoring_attributes(&bundle, self.today());
        let outcome = self
            .scoring
            .score(&attributes, &bundle.risks, bundle.owner.kind);

        let report = self
            .assembler
            .assemble(query, bundle, &estimate, attributes, outcome);

        info!(
            address = %report.property.address,
            score = report.property.vacancy_score,
            status = ?report.property.status,
            trajectory = ?report.property.trajectory,
            units = report.property.building_units,
            "analysis complete"
        );

        self.store.put(report.property.clone());
        report
    }

    /// Stored property, or a fresh analysis of the address the id encodes.
    /// Undecodable identifiers are "not found".
    pub async fn get_by_identifier(&self, id: &str) -> Option<Property> {
        if let Some(property) = self.store.get(id) {
            debug!(id, "property served from store");
            return Some(property);
        }

        let address = match identifier::decode(id) {
            Ok(address) => address,
            Err(err) => {
                warn!(id, error = %err, "identifier could not be decoded");
                return None;
            }
        };
        if address.trim().chars().count() < MIN_RECOVERED_ADDRESS_CHARS {
            debug!(id, "decoded address too short to analyze");
            return None;
        }

        info!(address = %address, "store miss, re-analyzing from identifier");
        Some(self.analyze(&address).await.property)
    }

    /// Addresses a search would analyze, in result order
    pub fn search_targets(&self, filters: &PropertyFilters) -> Vec<String> {
        if let Some(query) = filters.query.as_deref().map(str::trim) {
            if query.chars().count() >= MIN_QUERY_CHARS {
                return vec![query.to_string()];
            }
        }

        match filters.location.as_deref().map(str::trim) {
            Some(location) if !location.is_empty() => {
                let needle = location.to_lowercase();
                self.config
                    .seed_addresses
                    .iter()
                    .filter(|seed| seed.to_lowercase().contains(&needle))
                    .cloned()
                    .collect()
            }
            _ => Vec::new(),
        }
    }

    /// Analyze every target concurrently and keep the matching properties
    pub async fn search(&self, filters: &PropertyFilters) -> Vec<Property> {
        let targets = self.search_targets(filters);
        if targets.is_empty() {
            debug!("search without query or matching location");
            return Vec::new();
        }

        let mut tasks = JoinSet::new();
        for (position, address) in targets.into_iter().enumerate() {
            let engine = self.clone();
            tasks.spawn(async move { (position, engine.analyze(&address).await.property) });
        }

        let mut found = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(entry) => found.push(entry),
                Err(err) => warn!(error = %err, "search analysis task failed"),
            }
        }
        found.sort_by_key(|(position, _)| *position);

        found
            .into_iter()
            .map(|(_, property)| property)
            .filter(|property| filters.matches(property))
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
