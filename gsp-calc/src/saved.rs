//! Converting between a [`PlantingTable`] and the backend's saved annual
//! calculations.

use crate::demand::Efficiencies;
use crate::error::CalcError;
use crate::row::PlantingRow;
use crate::table::PlantingTable;
use gsp_api::resources::{AnnualConsumption, CalculationPayload, CalculationRowPayload, Id};
use gsp_utils::months::MONTHS;
use gsp_utils::numbers::round_to;
use log::{info, warn};

/// Validate a table and build the bulk save body.
///
/// Only qualifying rows are sent. Every check runs before any request is
/// made, so a failed validation never leaves a partial save behind.
pub fn build_save_payload(
    irrigation_system: Option<Id>,
    year: Option<i32>,
    table: &PlantingTable,
) -> Result<CalculationPayload, CalcError> {
    let irrigation_system = irrigation_system.ok_or(CalcError::MissingSystem)?;
    let year = year.ok_or(CalcError::MissingYear)?;
    let efficiencies = table.efficiencies();

    let rows: Vec<CalculationRowPayload> = table
        .qualifying_rows()
        .filter_map(|row| {
            Some(CalculationRowPayload {
                crop: row.crop?,
                area: row.area_or_zero(),
                share_percent: row.share_percent,
                water_consumption: row.water_consumption(),
            })
        })
        .collect();
    if rows.is_empty() {
        return Err(CalcError::NoValidRows);
    }

    Ok(CalculationPayload {
        irrigation_system,
        year,
        farm_efficiency: efficiencies.farm(),
        transmission_efficiency: efficiencies.transmission(),
        rows,
    })
}

/// Rebuild a read-only table from saved calculations for one system.
///
/// Records belonging to other systems are ignored. Rows from every matching
/// record are concatenated; efficiencies come from the first one. Areas are
/// rounded to two decimals and shares are recomputed. Returns `None` when
/// nothing was saved for the system.
pub fn table_from_saved(
    records: &[AnnualConsumption],
    irrigation_system: Id,
) -> Result<Option<PlantingTable>, CalcError> {
    let matching: Vec<&AnnualConsumption> = records
        .iter()
        .filter(|r| r.irrigation_system == irrigation_system)
        .collect();
    let Some(first) = matching.first() else {
        return Ok(None);
    };
    if matching.len() > 1 {
        warn!(
            "{} saved calculations for system {} in {}; merging their rows",
            matching.len(),
            irrigation_system,
            first.year
        );
    }
    let efficiencies = Efficiencies::new(first.farm_efficiency, first.transmission_efficiency)?;

    let mut rows = Vec::new();
    for detail in matching.iter().flat_map(|r| r.crops.iter()) {
        let id = rows.len() as u64 + 1;
        rows.push(PlantingRow {
            crop: Some(detail.crop),
            crop_name: detail.crop_name.clone(),
            area: Some(round_to(detail.area, 2)),
            coefficients: detail
                .monthly
                .map(|m| m.to_array())
                .unwrap_or([0.0; MONTHS]),
            ..PlantingRow::new(id)
        });
    }
    info!(
        "Loaded {} rows for system {} / {}",
        rows.len(),
        irrigation_system,
        first.year
    );
    Ok(Some(PlantingTable::read_only(rows, efficiencies)))
}
