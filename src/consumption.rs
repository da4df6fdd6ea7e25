// 🔋 Consumption Comparison - Metered vs theoretical yearly consumption
//
// Theoretical consumption comes from the unit's DPE (kWh/m²/year times a
// reference surface) when available, otherwise from the city baseline.

use crate::config::ConsumptionConfig;
use crate::model::{ConsumptionCheck, EnergyRecord, MeteredConsumption};

/// Expected yearly consumption of the unit, MWh
pub fn theoretical_consumption(
    energy: Option<&EnergyRecord>,
    city_baseline_mwh: Option<f64>,
    config: &ConsumptionConfig,
) -> f64 {
    let from_dpe = energy
        .and_then(|e| e.estimated_consumption)
        .filter(|kwh_per_m2| *kwh_per_m2 > 0.0)
        .map(|kwh_per_m2| kwh_per_m2 * config.reference_surface_m2 / 1000.0);

    from_dpe
        .or(city_baseline_mwh.filter(|b| *b > 0.0))
        .unwrap_or(config.city_baseline_mwh)
}

/// Compare metered consumption (if any) against the theoretical figure
pub fn compare(
    metered: Option<&MeteredConsumption>,
    energy: Option<&EnergyRecord>,
    city_baseline_mwh: Option<f64>,
    config: &ConsumptionConfig,
) -> ConsumptionCheck {
    let theoretical = theoretical_consumption(energy, city_baseline_mwh, config);
    let real = metered.and_then(|m| m.per_unit_mwh());

    let ratio = match real {
        Some(real) if theoretical > 0.0 => Some(real / theoretical),
        _ => None,
    };

    ConsumptionCheck {
        real_consumption: real,
        theoretical_consumption: theoretical,
        consumption_ratio: ratio,
        segment: metered.and_then(|m| m.segment.clone()),
        unit_count: metered.map_or(0, |m| m.unit_count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EnergyClass;

    fn metered(average: f64, units: u32) -> MeteredConsumption {
        MeteredConsumption {
            address_label: "15 RUE DE VAUGIRARD".to_string(),
            total_mwh: None,
            average_mwh: Some(average),
            unit_count: units,
            segment: Some("RES1".to_string()),
        }
    }

    #[test]
    fn test_theoretical_from_dpe() {
        let config = ConsumptionConfig::default();
        let energy = EnergyRecord::new(EnergyClass::D, None, Some(200.0), None);

        // 200 kWh/m² × 60 m² = 12 MWh
        let theoretical = theoretical_consumption(Some(&energy), Some(4.0), &config);
        assert!((theoretical - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_theoretical_falls_back_to_baselines() {
        let config = ConsumptionConfig::default();
        let no_consumption = EnergyRecord::new(EnergyClass::D, None, None, None);

        assert_eq!(theoretical_consumption(Some(&no_consumption), Some(4.0), &config), 4.0);
        assert_eq!(theoretical_consumption(None, None, &config), 4.5);
        assert_eq!(theoretical_consumption(None, Some(0.0), &config), 4.5);
    }

    #[test]
    fn test_compare_ratio() {
        let config = ConsumptionConfig::default();
        let check = compare(Some(&metered(0.9, 12)), None, None, &config);

        assert_eq!(check.real_consumption, Some(0.9));
        assert_eq!(check.theoretical_consumption, 4.5);
        assert!((check.consumption_ratio.unwrap() - 0.2).abs() < 1e-9);
        assert_eq!(check.unit_count, 12);
        assert_eq!(check.segment.as_deref(), Some("RES1"));
    }

    #[test]
    fn test_compare_without_metering() {
        let check = compare(None, None, None, &ConsumptionConfig::default());

        assert_eq!(check.real_consumption, None);
        assert_eq!(check.consumption_ratio, None);
        assert_eq!(check.unit_count, 0);
        assert_eq!(check.theoretical_consumption, 4.5);
    }
}
