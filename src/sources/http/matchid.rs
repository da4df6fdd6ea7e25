// Death records (matchID search over the national death register)

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

use super::{fetch_json, text, trim_base};
use crate::model::DeathRecord;
use crate::sources::{DeathRecordSource, SourceResult};

pub struct MatchIdClient {
    client: reqwest::Client,
    base_url: String,
}

impl MatchIdClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        MatchIdClient {
            client,
            base_url: trim_base(base_url),
        }
    }
}

#[async_trait]
impl DeathRecordSource for MatchIdClient {
    async fn find(
        &self,
        first_name: &str,
        last_name: &str,
        city: &str,
    ) -> SourceResult<Option<DeathRecord>> {
        debug!(first_name, last_name, city, "checking death register");
        let url = format!("{}/deces/api/v1/search", self.base_url);
        let body = fetch_json(self.client.get(url).query(&[
            ("firstName", first_name),
            ("lastName", last_name),
            ("deathCity", city),
            ("size", "1"),
        ]))
        .await?;

        Ok(body["response"]["persons"]
            .as_array()
            .and_then(|persons| persons.first())
            .map(parse_person))
    }
}

fn parse_person(person: &Value) -> DeathRecord {
    let first_name = match &person["name"]["first"] {
        Value::Array(names) => names.iter().filter_map(text).collect::<Vec<_>>().join(" "),
        other => text(other).unwrap_or_default(),
    };

    let death_city = match &person["death"]["location"]["city"] {
        Value::Array(cities) => cities.first().and_then(text),
        other => text(other),
    };

    DeathRecord {
        last_name: text(&person["name"]["last"]).unwrap_or_default(),
        first_name,
        death_date: text(&person["death"]["date"])
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y%m%d").ok()),
        death_city,
    }
}
