// 👤 Owner Model - Who holds the property
// Individuals, companies (SCI included) and public bodies.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Display name when no company is registered at the address
pub const PRIVATE_OWNER_NAME: &str = "Propriétaire Privé (Non-Commercial)";

/// Display name when the owner lookup produced nothing usable
pub const UNKNOWN_OWNER_NAME: &str = "Inconnu";

// ============================================================================
// OWNER KIND & STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OwnerKind {
    Individual,
    Company,
    Public,
}

impl OwnerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerKind::Individual => "Individual",
            OwnerKind::Company => "Company",
            OwnerKind::Public => "Public",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdministrativeStatus {
    Active,
    Inactive,
    Liquidation,
    Receivership,
}

impl AdministrativeStatus {
    /// Map a company-registry state to a status.
    ///
    /// Accepts the registry's one-letter codes ("A" active, "C"/"F" ceased)
    /// as well as free-text states mentioning liquidation or receivership.
    pub fn from_registry(state: &str) -> Option<Self> {
        let lower = state.trim().to_lowercase();
        if lower.is_empty() {
            return None;
        }
        if lower.contains("liquidation") {
            return Some(AdministrativeStatus::Liquidation);
        }
        if lower.contains("redressement") || lower.contains("receivership") {
            return Some(AdministrativeStatus::Receivership);
        }
        match lower.as_str() {
            "a" | "active" | "actif" => Some(AdministrativeStatus::Active),
            _ => Some(AdministrativeStatus::Inactive),
        }
    }
}

// ============================================================================
// OWNER RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerRecord {
    pub kind: OwnerKind,

    pub name: String,

    /// Company registry identifier (SIREN)
    pub registry_id: Option<String>,

    /// Main activity code (NAF), e.g. "6820B"
    pub activity_code: Option<String>,

    pub status: Option<AdministrativeStatus>,

    /// SCI or indivision: jointly-held real estate structure
    pub is_sci_or_indivision: bool,
}

impl OwnerRecord {
    /// No company registered at the address: most likely a private person
    pub fn private_individual() -> Self {
        OwnerRecord {
            name: PRIVATE_OWNER_NAME.to_string(),
            ..OwnerRecord::default()
        }
    }

    pub fn individual(name: &str) -> Self {
        OwnerRecord {
            name: name.trim().to_string(),
            ..OwnerRecord::default()
        }
    }

    /// The two plausible (first, last) orderings of an individual's name.
    ///
    /// Only defined for individuals whose name has exactly two tokens;
    /// source data is inconsistent about which token is the surname.
    pub fn name_orderings(&self) -> Option<[(String, String); 2]> {
        if self.kind != OwnerKind::Individual {
            return None;
        }
        let tokens: Vec<&str> = self.name.split_whitespace().collect();
        match tokens.as_slice() {
            [a, b] => Some([
                (a.to_string(), b.to_string()),
                (b.to_string(), a.to_string()),
            ]),
            _ => None,
        }
    }
}

impl Default for OwnerRecord {
    fn default() -> Self {
        OwnerRecord {
            kind: OwnerKind::Individual,
            name: UNKNOWN_OWNER_NAME.to_string(),
            registry_id: None,
            activity_code: None,
            status: None,
            is_sci_or_indivision: false,
        }
    }
}

/// Heuristic SCI detection: name mentions "SCI" or the legal-nature code
/// belongs to the 65xx civil-company family.
pub fn looks_like_sci(name: &str, legal_nature: Option<&str>) -> bool {
    let named = name
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| token.eq_ignore_ascii_case("sci"));
    named || legal_nature.map_or(false, |code| code.starts_with("65"))
}

// ============================================================================
// DEATH RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeathRecord {
    pub last_name: String,
    pub first_name: String,
    pub death_date: Option<NaiveDate>,
    pub death_city: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_orderings_two_tokens() {
        let owner = OwnerRecord::individual("Jean MARTIN");
        let orderings = owner.name_orderings().unwrap();

        assert_eq!(orderings[0], ("Jean".to_string(), "MARTIN".to_string()));
        assert_eq!(orderings[1], ("MARTIN".to_string(), "Jean".to_string()));
    }

    #[test]
    fn test_name_orderings_rejects_other_shapes() {
        assert!(OwnerRecord::individual("MARTIN").name_orderings().is_none());
        assert!(OwnerRecord::private_individual().name_orderings().is_none());

        let company = OwnerRecord {
            kind: OwnerKind::Company,
            ..OwnerRecord::individual("SCI ALESIA")
        };
        assert!(company.name_orderings().is_none());
    }

    #[test]
    fn test_administrative_status_mapping() {
        assert_eq!(AdministrativeStatus::from_registry("A"), Some(AdministrativeStatus::Active));
        assert_eq!(AdministrativeStatus::from_registry("C"), Some(AdministrativeStatus::Inactive));
        assert_eq!(
            AdministrativeStatus::from_registry("Liquidation judiciaire"),
            Some(AdministrativeStatus::Liquidation)
        );
        assert_eq!(
            AdministrativeStatus::from_registry("Redressement judiciaire"),
            Some(AdministrativeStatus::Receivership)
        );
        assert_eq!(AdministrativeStatus::from_registry(""), None);
    }

    #[test]
    fn test_looks_like_sci() {
        assert!(looks_like_sci("SCI DU PARC", None));
        assert!(looks_like_sci("Société civile", Some("6540")));
        assert!(!looks_like_sci("SCIERIE MODERNE", Some("5710")));
    }
}
