// Land-value transactions (DVF) by position and radius

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

use super::{fetch_json, number, text, trim_base};
use crate::model::{Coordinates, TransactionRecord};
use crate::sources::{SourceResult, TransactionSource};

pub struct DvfClient {
    client: reqwest::Client,
    base_url: String,
}

impl DvfClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        DvfClient {
            client,
            base_url: trim_base(base_url),
        }
    }
}

#[async_trait]
impl TransactionSource for DvfClient {
    async fn transactions_near(
        &self,
        position: Coordinates,
        radius_m: u32,
    ) -> SourceResult<Vec<TransactionRecord>> {
        debug!(lat = position.lat, lon = position.lon, radius_m, "searching transactions");
        let url = format!("{}/dvf", self.base_url);
        let body = fetch_json(self.client.get(url).query(&[
            ("lat", position.lat.to_string()),
            ("lon", position.lon.to_string()),
            ("dist", radius_m.to_string()),
        ]))
        .await?;

        let records = body["features"]
            .as_array()
            .map(|features| {
                features
                    .iter()
                    .map(|feature| parse_properties(&feature["properties"]))
                    .collect()
            })
            .unwrap_or_default();

        Ok(records)
    }
}

fn parse_properties(props: &Value) -> TransactionRecord {
    // The service has shipped the surface under two spellings
    let surface = number(&props["surface_relle_batiment"])
        .or_else(|| number(&props["surface_reelle_bati"]));

    TransactionRecord {
        mutation_id: text(&props["id_mutation"]).unwrap_or_default(),
        date: text(&props["date_mutation"])
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        value: number(&props["valeur_fonciere"]),
        street_number: number(&props["numero"]).map(|n| n as u32),
        street_name: text(&props["voie"]),
        local_type: text(&props["type_local"]),
        built_surface: surface,
        lot_index: text(&props["lot1_numero"]),
    }
}
