// National address base (BAN) geocoder

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{fetch_json, text, trim_base};
use crate::model::{AddressRecord, Coordinates, UNKNOWN_CITY, UNKNOWN_POSTCODE};
use crate::sources::{AddressResolver, SourceError, SourceResult};

pub struct BanResolver {
    client: reqwest::Client,
    base_url: String,
}

impl BanResolver {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        BanResolver {
            client,
            base_url: trim_base(base_url),
        }
    }
}

#[async_trait]
impl AddressResolver for BanResolver {
    async fn resolve(&self, query: &str) -> SourceResult<Option<AddressRecord>> {
        debug!(query, "resolving address");
        let url = format!("{}/search/", self.base_url);
        let body = fetch_json(self.client.get(url).query(&[("q", query), ("limit", "1")])).await?;

        let feature = match body["features"].as_array().and_then(|f| f.first()) {
            Some(feature) => feature,
            None => return Ok(None),
        };
        parse_feature(feature).map(Some)
    }
}

fn parse_feature(feature: &Value) -> SourceResult<AddressRecord> {
    let props = &feature["properties"];
    let label = text(&props["label"])
        .ok_or_else(|| SourceError::Parse("address feature without label".to_string()))?;

    let coordinates = feature["geometry"]["coordinates"]
        .as_array()
        .and_then(|c| match (c.first()?.as_f64(), c.get(1)?.as_f64()) {
            (Some(lon), Some(lat)) => Some(Coordinates::new(lon, lat)),
            _ => None,
        });

    Ok(AddressRecord {
        label,
        city: text(&props["city"]).unwrap_or_else(|| UNKNOWN_CITY.to_string()),
        postal_code: text(&props["postcode"]).unwrap_or_else(|| UNKNOWN_POSTCODE.to_string()),
        citycode: text(&props["citycode"]),
        coordinates,
        ban_id: text(&props["id"]),
        housenumber: text(&props["housenumber"]),
        street: text(&props["street"]),
        resolved: true,
    })
}
