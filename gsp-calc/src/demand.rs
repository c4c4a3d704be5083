//! Water-demand reducer: folds planting rows into monthly demand.
//!
//! Units: coefficients are m³/ha per month and areas are hectares, so
//! `area × coefficient / 100000` gives net demand in hm³. Farm and gross
//! demand inflate net demand by the two efficiency percentages in turn.

use crate::error::CalcError;
use crate::row::PlantingRow;
use gsp_utils::months::{season_sum, MONTHS};
use log::debug;
use serde::Serialize;

/// Divisor turning `ha × m³/ha` into the hm³ figures shown in the table.
pub const NET_DEMAND_DIVISOR: f64 = 100_000.0;

pub const DEFAULT_FARM_EFFICIENCY: f64 = 61.0;
pub const DEFAULT_TRANSMISSION_EFFICIENCY: f64 = 95.0;

/// Farm and transmission efficiency percentages, both in (0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Efficiencies {
    farm: f64,
    transmission: f64,
}

impl Efficiencies {
    pub fn new(farm: f64, transmission: f64) -> Result<Self, CalcError> {
        check_efficiency("farm", farm)?;
        check_efficiency("transmission", transmission)?;
        Ok(Efficiencies { farm, transmission })
    }

    pub fn farm(&self) -> f64 {
        self.farm
    }

    pub fn transmission(&self) -> f64 {
        self.transmission
    }
}

impl Default for Efficiencies {
    fn default() -> Self {
        Efficiencies {
            farm: DEFAULT_FARM_EFFICIENCY,
            transmission: DEFAULT_TRANSMISSION_EFFICIENCY,
        }
    }
}

fn check_efficiency(name: &'static str, value: f64) -> Result<(), CalcError> {
    if value.is_finite() && value > 0.0 && value <= 100.0 {
        Ok(())
    } else {
        Err(CalcError::InvalidEfficiency { name, value })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CalculationResult {
    /// Σ coefficient × share / 100, per month
    pub weighted_totals: [f64; MONTHS],
    /// Net demand, hm³
    pub net: [f64; MONTHS],
    /// Demand at the farm gate, hm³
    pub farm: [f64; MONTHS],
    /// Demand at the storage outlet, hm³
    pub gross: [f64; MONTHS],
    /// Σ area of qualifying rows, ha
    pub total_area: f64,
    /// Σ share of qualifying rows; 100 up to rounding
    pub total_share: f64,
}

impl CalculationResult {
    pub fn annual_weighted(&self) -> f64 {
        self.weighted_totals.iter().sum()
    }

    pub fn annual_net(&self) -> f64 {
        self.net.iter().sum()
    }

    pub fn annual_farm(&self) -> f64 {
        self.farm.iter().sum()
    }

    pub fn annual_gross(&self) -> f64 {
        self.gross.iter().sum()
    }

    pub fn season_weighted(&self) -> f64 {
        season_sum(&self.weighted_totals)
    }

    pub fn season_net(&self) -> f64 {
        season_sum(&self.net)
    }

    pub fn season_farm(&self) -> f64 {
        season_sum(&self.farm)
    }

    pub fn season_gross(&self) -> f64 {
        season_sum(&self.gross)
    }
}

/// Fold rows with assigned shares into monthly and annual demand.
///
/// Rows without a crop or without a positive area are skipped.
pub fn reduce_demand(rows: &[PlantingRow], efficiencies: Efficiencies) -> CalculationResult {
    let mut result = CalculationResult::default();

    for row in rows.iter().filter(|r| r.qualifies()) {
        let area = row.area_or_zero();
        result.total_area += area;
        result.total_share += row.share_percent;
        for (m, coefficient) in row.coefficients.iter().enumerate() {
            result.weighted_totals[m] += coefficient * row.share_percent / 100.0;
            result.net[m] += area * coefficient / NET_DEMAND_DIVISOR;
        }
    }

    for m in 0..MONTHS {
        result.farm[m] = result.net[m] * 100.0 / efficiencies.farm();
        result.gross[m] = result.farm[m] * 100.0 / efficiencies.transmission();
    }

    debug!(
        "Reduced {} rows: {:.2} ha, gross {:.6} hm³",
        rows.len(),
        result.total_area,
        result.annual_gross()
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocate::allocate_shares;
    use gsp_utils::numbers::approx_eq;

    fn row(id: u64, area: f64, coefficients: [f64; MONTHS]) -> PlantingRow {
        PlantingRow {
            crop: Some(id as i64),
            area: Some(area),
            coefficients,
            ..PlantingRow::new(id)
        }
    }

    #[test]
    fn test_single_row_april() {
        let mut coefficients = [0.0; MONTHS];
        coefficients[3] = 50.0;
        let mut rows = vec![row(1, 10.0, coefficients)];
        allocate_shares(&mut rows);

        let result = reduce_demand(&rows, Efficiencies::new(80.0, 85.0).unwrap());
        assert!(approx_eq(result.net[3], 0.005, 1e-12));
        assert!(approx_eq(result.farm[3], 0.00625, 1e-12));
        assert!(approx_eq(result.gross[3], 0.007353, 1e-6));
        assert_eq!(result.weighted_totals[3], 50.0);
        assert_eq!(result.total_area, 10.0);
        assert_eq!(result.total_share, 100.0);
        assert_eq!(result.net[0], 0.0);
    }

    #[test]
    fn test_gross_is_serial_inflation_of_net() {
        let mut a = [0.0; MONTHS];
        let mut b = [0.0; MONTHS];
        for m in 0..MONTHS {
            a[m] = (m as f64) * 13.7;
            b[m] = 200.0 - (m as f64) * 4.1;
        }
        let mut rows = vec![row(1, 120.0, a), row(2, 37.5, b)];
        allocate_shares(&mut rows);
        let efficiencies = Efficiencies::new(61.0, 95.0).unwrap();
        let result = reduce_demand(&rows, efficiencies);

        for m in 0..MONTHS {
            let expected = result.net[m] * (100.0 / 61.0) * (100.0 / 95.0);
            assert!(approx_eq(result.gross[m], expected, 1e-12), "month {m}");
        }
        assert!(approx_eq(
            result.annual_gross(),
            result.gross.iter().sum::<f64>(),
            1e-12
        ));
    }

    #[test]
    fn test_non_qualifying_rows_do_not_contribute() {
        let coefficients = [10.0; MONTHS];
        let mut rows = vec![row(1, 10.0, coefficients), PlantingRow::new(2)];
        rows[1].area = Some(500.0);
        rows[1].coefficients = [1000.0; MONTHS];
        allocate_shares(&mut rows);
        let result = reduce_demand(&rows, Efficiencies::default());
        assert_eq!(result.total_area, 10.0);
        assert!(approx_eq(result.annual_net(), 12.0 * 10.0 * 10.0 / 100_000.0, 1e-12));
    }

    #[test]
    fn test_invalid_efficiencies_rejected() {
        for bad in [0.0, -5.0, 100.5, f64::NAN, f64::INFINITY] {
            let err = Efficiencies::new(bad, 95.0).unwrap_err();
            match err {
                CalcError::InvalidEfficiency { name, .. } => assert_eq!(name, "farm"),
                other => panic!("unexpected error: {other:?}"),
            }
            assert!(Efficiencies::new(61.0, bad).is_err());
        }
        let err = Efficiencies::new(61.0, 0.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "transmission efficiency must be greater than 0 and at most 100, got 0"
        );
        assert!(Efficiencies::new(100.0, 100.0).is_ok());
    }

    #[test]
    fn test_empty_table_is_all_zero() {
        let result = reduce_demand(&[], Efficiencies::default());
        assert_eq!(result, CalculationResult::default());
        assert!(result.annual_gross().is_finite());
    }
}
