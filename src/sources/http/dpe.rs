// Energy-performance diagnostics (ADEME DPE dataset)

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use super::{fetch_json, number, text, trim_base};
use crate::model::{BuildingEnergyStats, EnergyClass, EnergyRecord};
use crate::sources::{EnergySource, SourceResult};

const DATASET_PATH: &str = "/data-fair/api/v1/datasets/dpe03existant/lines";

const UNIT_FIELDS: &str =
    "etiquette_dpe,etiquette_ges,conso_5_usages_par_m2_ep,surface_habitable_logement";

const BUILDING_FIELDS: &str = "etiquette_dpe,surface_habitable_logement";

pub struct DpeClient {
    client: reqwest::Client,
    base_url: String,
}

impl DpeClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        DpeClient {
            client,
            base_url: trim_base(base_url),
        }
    }

    fn dataset_url(&self) -> String {
        format!("{}{}", self.base_url, DATASET_PATH)
    }
}

fn ban_filter(ban_id: &str) -> String {
    format!("identifiant_ban:\"{}\"", ban_id)
}

#[async_trait]
impl EnergySource for DpeClient {
    async fn diagnostic(
        &self,
        address: &str,
        ban_id: Option<&str>,
    ) -> SourceResult<Option<EnergyRecord>> {
        debug!(address, ban_id, "fetching energy diagnostic");
        let mut params = vec![
            ("size", "1".to_string()),
            ("select", UNIT_FIELDS.to_string()),
        ];
        match ban_id {
            Some(id) => params.push(("qs", ban_filter(id))),
            None => params.push(("q", address.to_string())),
        }

        let body = fetch_json(self.client.get(self.dataset_url()).query(&params)).await?;
        Ok(body["results"]
            .as_array()
            .and_then(|results| results.first())
            .and_then(parse_diagnostic))
    }

    async fn building_stats(&self, ban_id: &str) -> SourceResult<Option<BuildingEnergyStats>> {
        debug!(ban_id, "fetching building diagnostics");
        let params = [
            ("size", "100".to_string()),
            ("select", BUILDING_FIELDS.to_string()),
            ("qs", ban_filter(ban_id)),
        ];

        let body = fetch_json(self.client.get(self.dataset_url()).query(&params)).await?;
        let results = body["results"].as_array().cloned().unwrap_or_default();
        let total = body["total"].as_u64().map(|t| t as u32);
        Ok(aggregate(&results, total))
    }
}

/// A diagnostic without a readable class is no diagnostic
fn parse_diagnostic(line: &Value) -> Option<EnergyRecord> {
    let dpe_class = text(&line["etiquette_dpe"]).and_then(|c| EnergyClass::parse(&c))?;
    Some(EnergyRecord::new(
        dpe_class,
        text(&line["etiquette_ges"]).and_then(|c| EnergyClass::parse(&c)),
        number(&line["conso_5_usages_par_m2_ep"]),
        number(&line["surface_habitable_logement"]),
    ))
}

fn aggregate(results: &[Value], total: Option<u32>) -> Option<BuildingEnergyStats> {
    if results.is_empty() {
        return None;
    }

    let mut counts: HashMap<EnergyClass, u32> = HashMap::new();
    let mut surfaces = Vec::new();
    for line in results {
        if let Some(class) = text(&line["etiquette_dpe"]).and_then(|c| EnergyClass::parse(&c)) {
            *counts.entry(class).or_insert(0) += 1;
        }
        if let Some(surface) = number(&line["surface_habitable_logement"]).filter(|s| *s > 0.0) {
            surfaces.push(surface);
        }
    }

    // Ties resolve to the worse class
    let dominant_class = counts
        .into_iter()
        .max_by(|(class_a, n_a), (class_b, n_b)| n_a.cmp(n_b).then(class_a.cmp(class_b)))
        .map(|(class, _)| class);

    let mean_surface = if surfaces.is_empty() {
        None
    } else {
        Some(surfaces.iter().sum::<f64>() / surfaces.len() as f64)
    };

    Some(BuildingEnergyStats {
        record_count: total.unwrap_or(results.len() as u32),
        dominant_class,
        mean_surface,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn test_parse_diagnostic_requires_class() {
        assert!(parse_diagnostic(&json!({ "etiquette_dpe": "", "conso_5_usages_par_m2_ep": 120 })).is_none());

        let record = parse_diagnostic(&json!({
            "etiquette_dpe": "F",
            "etiquette_ges": "E",
            "conso_5_usages_par_m2_ep": 380.5,
            "surface_habitable_logement": 32
        }))
        .unwrap();
        assert_eq!(record.dpe_class(), EnergyClass::F);
        assert_eq!(record.ges_class, Some(EnergyClass::E));
        assert_eq!(record.estimated_consumption, Some(380.5));
        assert_eq!(record.surface_estimate, Some(32.0));
        assert!(record.is_energy_sieve());
    }

    #[test]
    fn test_aggregate_dominant_class_and_surface() {
        let results = vec![
            json!({ "etiquette_dpe": "D", "surface_habitable_logement": 40 }),
            json!({ "etiquette_dpe": "E", "surface_habitable_logement": 60 }),
            json!({ "etiquette_dpe": "D" }),
            json!({ "etiquette_dpe": "E" }),
        ];

        let stats = aggregate(&results, Some(12)).unwrap();
        assert_eq!(stats.record_count, 12);
        assert_eq!(stats.dominant_class, Some(EnergyClass::E));
        assert_eq!(stats.mean_surface, Some(50.0));

        assert!(aggregate(&[], None).is_none());
    }

    #[tokio::test]
    async fn test_diagnostic_by_ban_id() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(DATASET_PATH)
                    .query_param("qs", "identifiant_ban:\"75113_9876_00011\"")
                    .query_param("size", "1");
                then.status(200).json_body(json!({
                    "total": 1,
                    "results": [{ "etiquette_dpe": "G", "etiquette_ges": "G",
                                  "conso_5_usages_par_m2_ep": 450 }]
                }));
            })
            .await;

        let client = DpeClient::new(reqwest::Client::new(), &server.base_url());
        let record = client
            .diagnostic("11 Rue de la Vistule 75013 Paris", Some("75113_9876_00011"))
            .await
            .unwrap()
            .unwrap();

        mock.assert_async().await;
        assert_eq!(record.dpe_class(), EnergyClass::G);
        assert!(record.is_energy_sieve());
    }

    #[tokio::test]
    async fn test_diagnostic_by_address_text() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(DATASET_PATH)
                    .query_param("q", "11 Rue de la Vistule 75013 Paris");
                then.status(200).json_body(json!({ "total": 0, "results": [] }));
            })
            .await;

        let client = DpeClient::new(reqwest::Client::new(), &server.base_url());
        let record = client
            .diagnostic("11 Rue de la Vistule 75013 Paris", None)
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(record.is_none());
    }
}
