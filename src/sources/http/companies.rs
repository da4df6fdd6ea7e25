// Company registry search (recherche-entreprises) as the owner lookup

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{fetch_json, text, trim_base};
use crate::model::owner::looks_like_sci;
use crate::model::{AdministrativeStatus, OwnerKind, OwnerRecord};
use crate::sources::{OwnerSource, SourceResult};

pub struct CompanyRegistryClient {
    client: reqwest::Client,
    base_url: String,
}

impl CompanyRegistryClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        CompanyRegistryClient {
            client,
            base_url: trim_base(base_url),
        }
    }
}

#[async_trait]
impl OwnerSource for CompanyRegistryClient {
    async fn owner_at(&self, address: &str) -> SourceResult<OwnerRecord> {
        debug!(address, "searching registered owner");
        let url = format!("{}/search", self.base_url);
        let body = fetch_json(self.client.get(url).query(&[("q", address), ("limit", "5")])).await?;

        let results = body["results"].as_array().cloned().unwrap_or_default();
        Ok(select_owner(&results))
    }
}

/// Prefer an SCI among the ranked results, else the best-ranked company.
/// No company at the address means a private individual.
fn select_owner(results: &[Value]) -> OwnerRecord {
    let is_sci = |r: &&Value| {
        let name = text(&r["nom_complet"]).unwrap_or_default();
        looks_like_sci(&name, text(&r["nature_juridique"]).as_deref())
    };

    let chosen = match results.iter().find(is_sci).or_else(|| results.first()) {
        Some(chosen) => chosen,
        None => return OwnerRecord::private_individual(),
    };

    let name = text(&chosen["nom_complet"]).unwrap_or_default();
    let legal_nature = text(&chosen["nature_juridique"]);

    // 7xxx legal natures are public-law entities
    let kind = match legal_nature.as_deref() {
        Some(code) if code.starts_with('7') => OwnerKind::Public,
        _ => OwnerKind::Company,
    };

    OwnerRecord {
        kind,
        is_sci_or_indivision: looks_like_sci(&name, legal_nature.as_deref()),
        name,
        registry_id: text(&chosen["siren"]),
        activity_code: text(&chosen["activite_principale"]),
        status: text(&chosen["etat_administratif"])
            .and_then(|state| AdministrativeStatus::from_registry(&state)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn test_select_owner_prefers_sci() {
        let results = vec![
            json!({ "siren": "111", "nom_complet": "BOULANGERIE DU PARC", "nature_juridique": "5499",
                    "activite_principale": "10.71C", "etat_administratif": "A" }),
            json!({ "siren": "222", "nom_complet": "SCI ALESIA", "nature_juridique": "6540",
                    "activite_principale": "68.20B", "etat_administratif": "C" }),
        ];

        let owner = select_owner(&results);
        assert_eq!(owner.kind, OwnerKind::Company);
        assert_eq!(owner.name, "SCI ALESIA");
        assert_eq!(owner.registry_id.as_deref(), Some("222"));
        assert_eq!(owner.status, Some(AdministrativeStatus::Inactive));
        assert!(owner.is_sci_or_indivision);
    }

    #[test]
    fn test_select_owner_public_entity() {
        let results = vec![json!({ "siren": "217500016", "nom_complet": "VILLE DE PARIS",
                                   "nature_juridique": "7210", "etat_administratif": "A" })];

        let owner = select_owner(&results);
        assert_eq!(owner.kind, OwnerKind::Public);
        assert_eq!(owner.status, Some(AdministrativeStatus::Active));
        assert!(!owner.is_sci_or_indivision);
    }

    #[test]
    fn test_select_owner_without_results() {
        let owner = select_owner(&[]);
        assert_eq!(owner, OwnerRecord::private_individual());
    }

    #[tokio::test]
    async fn test_owner_at_queries_registry() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/search")
                    .query_param("q", "10 avenue de la République 75011 Paris")
                    .query_param("limit", "5");
                then.status(200).json_body(json!({
                    "results": [{ "siren": "333", "nom_complet": "SCI REPUBLIQUE",
                                  "nature_juridique": "6540", "etat_administratif": "A" }],
                    "total_results": 1
                }));
            })
            .await;

        let client = CompanyRegistryClient::new(reqwest::Client::new(), &server.base_url());
        let owner = client
            .owner_at("10 avenue de la République 75011 Paris")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(owner.name, "SCI REPUBLIQUE");
        assert!(owner.is_sci_or_indivision);
    }
}
