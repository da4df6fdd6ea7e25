// 📍 Address Model - Canonical identity of an analyzed address
// One AddressRecord per analysis; either resolved by the geocoder or
// synthesized from the raw query when resolution fails.

use serde::{Deserialize, Serialize};

/// City label used when the resolver could not place the address
pub const UNKNOWN_CITY: &str = "Inconnu";

/// Postal code used when the resolver could not place the address
pub const UNKNOWN_POSTCODE: &str = "00000";

/// WGS84 position (longitude first, as the national address base returns it)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinates {
    pub fn new(lon: f64, lat: f64) -> Self {
        Coordinates { lon, lat }
    }
}

// ============================================================================
// ADDRESS RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressRecord {
    /// Normalized label ("10 Rue de Vaugirard 75006 Paris")
    pub label: String,

    pub city: String,

    pub postal_code: String,

    /// Administrative (INSEE) code of the municipality
    pub citycode: Option<String>,

    pub coordinates: Option<Coordinates>,

    /// Opaque per-address identifier from the resolver (BAN interop key)
    pub ban_id: Option<String>,

    /// House number as printed ("10", "10bis")
    pub housenumber: Option<String>,

    pub street: Option<String>,

    /// False when this record was synthesized from the raw query
    pub resolved: bool,
}

impl AddressRecord {
    /// Degraded record for a query the resolver could not place.
    /// The raw query stands in as the label, the city is the "unknown" sentinel.
    pub fn unresolved(raw_query: &str) -> Self {
        AddressRecord {
            label: raw_query.trim().to_string(),
            city: UNKNOWN_CITY.to_string(),
            postal_code: UNKNOWN_POSTCODE.to_string(),
            citycode: None,
            coordinates: None,
            ban_id: None,
            housenumber: None,
            street: None,
            resolved: false,
        }
    }

    /// "<number> <street>" when the resolver split them, the label otherwise
    pub fn street_line(&self) -> String {
        match (&self.housenumber, &self.street) {
            (Some(number), Some(street)) => format!("{} {}", number, street),
            _ => self.label.clone(),
        }
    }

    /// Numeric part of the house number ("12bis" → 12)
    pub fn street_number(&self) -> Option<u32> {
        self.housenumber
            .as_deref()
            .and_then(leading_number)
            .or_else(|| leading_number(self.label.split_whitespace().next()?))
    }
}

/// Parse the leading digits of a token ("12", "12bis", "12-14" → 12)
pub fn leading_number(token: &str) -> Option<u32> {
    let digits: String = token.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_uses_raw_query_and_sentinels() {
        let record = AddressRecord::unresolved("  12 rue Imaginaire  ");

        assert_eq!(record.label, "12 rue Imaginaire");
        assert_eq!(record.city, UNKNOWN_CITY);
        assert_eq!(record.postal_code, UNKNOWN_POSTCODE);
        assert!(record.coordinates.is_none());
        assert!(!record.resolved);
    }

    #[test]
    fn test_street_line_prefers_split_fields() {
        let mut record = AddressRecord::unresolved("10 Rue de Vaugirard 75006 Paris");
        assert_eq!(record.street_line(), "10 Rue de Vaugirard 75006 Paris");

        record.housenumber = Some("10".to_string());
        record.street = Some("Rue de Vaugirard".to_string());
        assert_eq!(record.street_line(), "10 Rue de Vaugirard");
    }

    #[test]
    fn test_street_number() {
        let mut record = AddressRecord::unresolved("227 rue d'Alésia, 75014 Paris");
        assert_eq!(record.street_number(), Some(227));

        record.housenumber = Some("14bis".to_string());
        assert_eq!(record.street_number(), Some(14));

        let no_number = AddressRecord::unresolved("place des Terreaux");
        assert_eq!(no_number.street_number(), None);
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("12"), Some(12));
        assert_eq!(leading_number("12-14"), Some(12));
        assert_eq!(leading_number("bis"), None);
        assert_eq!(leading_number(""), None);
    }
}
