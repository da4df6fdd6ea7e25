// 🧾 Transaction Model - Property sales from the land-value registry (DVF)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Mutation identifier (one sale may span several records)
    pub mutation_id: String,

    pub date: Option<NaiveDate>,

    /// Declared sale price in euros
    pub value: Option<f64>,

    pub street_number: Option<u32>,

    pub street_name: Option<String>,

    /// "Appartement", "Maison", "Dépendance", "Local industriel. commercial ou assimilé"
    pub local_type: Option<String>,

    /// Built surface in m²
    pub built_surface: Option<f64>,

    /// Registered lot index within a co-ownership, when present
    pub lot_index: Option<String>,
}

impl TransactionRecord {
    fn local_type_lower(&self) -> String {
        self.local_type.as_deref().unwrap_or("").to_lowercase()
    }

    /// Housing types only (flats and houses)
    pub fn is_residential(&self) -> bool {
        let kind = self.local_type_lower();
        kind.contains("appartement") || kind.contains("maison")
    }

    /// Shop, office or other commercial premises
    pub fn is_commercial(&self) -> bool {
        let kind = self.local_type_lower();
        kind.contains("commercial") || kind.contains("local") || kind.contains("bureau")
    }

    /// Lot index when it is purely numeric
    pub fn numeric_lot_index(&self) -> Option<u32> {
        self.lot_index.as_deref()?.trim().parse().ok()
    }
}

/// Keep the records of one street number (all of them when the number is
/// unknown) and order them newest first. Undated records go last.
pub fn filter_for_street_number(
    records: Vec<TransactionRecord>,
    street_number: Option<u32>,
) -> Vec<TransactionRecord> {
    let mut kept: Vec<TransactionRecord> = match street_number {
        Some(number) => records
            .into_iter()
            .filter(|tx| tx.street_number == Some(number))
            .collect(),
        None => records,
    };

    kept.sort_by(|a, b| b.date.cmp(&a.date));
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, date: Option<&str>, number: u32, local_type: &str) -> TransactionRecord {
        TransactionRecord {
            mutation_id: id.to_string(),
            date: date.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
            value: Some(250_000.0),
            street_number: Some(number),
            street_name: Some("RUE DE VAUGIRARD".to_string()),
            local_type: Some(local_type.to_string()),
            built_surface: Some(45.0),
            lot_index: None,
        }
    }

    #[test]
    fn test_type_vocabulary() {
        assert!(record("1", None, 10, "Appartement").is_residential());
        assert!(record("1", None, 10, "Maison").is_residential());
        assert!(!record("1", None, 10, "Dépendance").is_residential());

        let shop = record("1", None, 10, "Local industriel. commercial ou assimilé");
        assert!(shop.is_commercial());
        assert!(!shop.is_residential());
    }

    #[test]
    fn test_numeric_lot_index() {
        let mut tx = record("1", None, 10, "Appartement");
        tx.lot_index = Some(" 42 ".to_string());
        assert_eq!(tx.numeric_lot_index(), Some(42));

        tx.lot_index = Some("A12".to_string());
        assert_eq!(tx.numeric_lot_index(), None);
    }

    #[test]
    fn test_filter_keeps_street_number_newest_first() {
        let records = vec![
            record("old", Some("2012-03-01"), 10, "Appartement"),
            record("neighbour", Some("2023-01-01"), 12, "Appartement"),
            record("undated", None, 10, "Appartement"),
            record("new", Some("2020-06-15"), 10, "Appartement"),
        ];

        let kept = filter_for_street_number(records, Some(10));
        let ids: Vec<&str> = kept.iter().map(|tx| tx.mutation_id.as_str()).collect();

        assert_eq!(ids, vec!["new", "old", "undated"]);
    }

    #[test]
    fn test_filter_without_number_keeps_everything() {
        let records = vec![
            record("a", Some("2012-03-01"), 10, "Appartement"),
            record("b", Some("2023-01-01"), 12, "Appartement"),
        ];

        let kept = filter_for_street_number(records, None);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].mutation_id, "b");
    }
}
