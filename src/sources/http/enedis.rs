// Annual residential consumption per address (Enedis open data)

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::{fetch_json, number, text, trim_base};
use crate::model::MeteredConsumption;
use crate::sources::{ConsumptionSource, SourceResult};

const RECORDS_PATH: &str =
    "/api/explore/v2.1/catalog/datasets/consommation-annuelle-residentielle-par-adresse/records";

const AVERAGE_FIELD: &str = "consommation_annuelle_moyenne_par_site_de_l_adresse_mwh";

pub struct EnedisClient {
    client: reqwest::Client,
    base_url: String,
}

impl EnedisClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        EnedisClient {
            client,
            base_url: trim_base(base_url),
        }
    }

    fn records_url(&self) -> String {
        format!("{}{}", self.base_url, RECORDS_PATH)
    }
}

/// Shape the dataset stores addresses in: no accents, no apostrophes,
/// upper case, single spaces.
pub fn normalize_for_metering(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text.nfd().filter(|c| !is_combining_mark(*c)) {
        match c {
            'œ' | 'Œ' => folded.push_str("OE"),
            'æ' | 'Æ' => folded.push_str("AE"),
            '\'' | '’' | '`' => folded.push(' '),
            other => folded.extend(other.to_uppercase()),
        }
    }
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// ODSQL string literal: double quotes escaped by doubling
fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[async_trait]
impl ConsumptionSource for EnedisClient {
    async fn metered(
        &self,
        city: &str,
        address: &str,
    ) -> SourceResult<Option<MeteredConsumption>> {
        let where_clause = format!(
            "nom_commune={} AND adresse LIKE {}",
            quoted(&normalize_for_metering(city)),
            quoted(&normalize_for_metering(address)),
        );
        debug!(%where_clause, "fetching metered consumption");

        let body = fetch_json(
            self.client
                .get(self.records_url())
                .query(&[("where", where_clause.as_str()), ("limit", "5")]),
        )
        .await?;

        Ok(body["results"]
            .as_array()
            .and_then(|results| results.first())
            .map(parse_record))
    }

    async fn city_baseline(&self, city: &str) -> SourceResult<Option<f64>> {
        let select = format!("avg({}) as baseline", AVERAGE_FIELD);
        let where_clause = format!("nom_commune={}", quoted(&normalize_for_metering(city)));
        debug!(%where_clause, "fetching city consumption baseline");

        let body = fetch_json(self.client.get(self.records_url()).query(&[
            ("select", select.as_str()),
            ("where", where_clause.as_str()),
        ]))
        .await?;

        Ok(body["results"]
            .as_array()
            .and_then(|results| results.first())
            .and_then(|row| number(&row["baseline"]))
            .filter(|baseline| *baseline > 0.0))
    }
}

fn parse_record(record: &Value) -> MeteredConsumption {
    MeteredConsumption {
        address_label: text(&record["adresse"]).unwrap_or_default(),
        total_mwh: number(&record["consommation_annuelle_totale_de_l_adresse_mwh"]),
        average_mwh: number(&record[AVERAGE_FIELD]),
        unit_count: number(&record["nombre_de_logements"])
            .map(|n| n.max(0.0) as u32)
            .unwrap_or(0),
        segment: text(&record["segment_de_client"]),
    }
}
