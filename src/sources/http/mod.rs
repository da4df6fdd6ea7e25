//! Open-data HTTP adapters.
//!
//! Async reqwest clients, one per dataset. Timeouts are not set on the
//! client: each call is bounded by `sources::guarded` with the per-source
//! policy from the engine configuration.

use serde_json::Value;

use super::{SourceError, SourceResult};

mod ban;
mod companies;
mod dpe;
mod dvf;
mod enedis;
mod matchid;

pub use ban::BanResolver;
pub use companies::CompanyRegistryClient;
pub use dpe::DpeClient;
pub use dvf::DvfClient;
pub use enedis::{normalize_for_metering, EnedisClient};
pub use matchid::MatchIdClient;

/// One connection pool shared by every adapter
pub fn shared_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(format!("vacancy-engine/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

fn trim_base(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Send a request and decode its JSON body, rejecting non-2xx statuses
async fn fetch_json(request: reqwest::RequestBuilder) -> SourceResult<Value> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Http(status.as_u16()));
    }
    Ok(response.json::<Value>().await?)
}

/// Number that some datasets send as a string
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    }
}

/// Non-empty text, also accepting numbers
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_accepts_strings() {
        assert_eq!(number(&json!(42.5)), Some(42.5));
        assert_eq!(number(&json!("42,5")), Some(42.5));
        assert_eq!(number(&json!("n/a")), None);
        assert_eq!(number(&Value::Null), None);
    }

    #[test]
    fn test_text() {
        assert_eq!(text(&json!(" 12 ")), Some("12".to_string()));
        assert_eq!(text(&json!(12)), Some("12".to_string()));
        assert_eq!(text(&json!("")), None);
    }

    #[test]
    fn test_trim_base() {
        assert_eq!(trim_base("http://localhost:8080/"), "http://localhost:8080");
    }
}
