use crate::allocate::allocate_shares;
use crate::demand::{reduce_demand, CalculationResult, Efficiencies};
use crate::error::CalcError;
use crate::row::{PlantingRow, RowId};
use gsp_api::resources::CropMonthlyProfile;
use gsp_utils::months::MONTHS;

/// The editable calculation table.
///
/// Every edit re-runs the allocator and the reducer, so [`result`] always
/// matches the rows. A new table starts with one blank row and can never
/// drop below one row. Tables rebuilt from a saved calculation are read-only.
///
/// [`result`]: PlantingTable::result
#[derive(Debug, Clone)]
pub struct PlantingTable {
    rows: Vec<PlantingRow>,
    next_id: RowId,
    efficiencies: Efficiencies,
    result: CalculationResult,
    read_only: bool,
}

impl Default for PlantingTable {
    fn default() -> Self {
        PlantingTable::new(Efficiencies::default())
    }
}

impl PlantingTable {
    pub fn new(efficiencies: Efficiencies) -> Self {
        let mut table = PlantingTable {
            rows: vec![PlantingRow::new(1)],
            next_id: 2,
            efficiencies,
            result: CalculationResult::default(),
            read_only: false,
        };
        table.recompute();
        table
    }

    /// A read-only table over already built rows.
    pub fn read_only(rows: Vec<PlantingRow>, efficiencies: Efficiencies) -> Self {
        let next_id = rows.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let mut table = PlantingTable {
            rows,
            next_id,
            efficiencies,
            result: CalculationResult::default(),
            read_only: true,
        };
        table.recompute();
        table
    }

    pub fn rows(&self) -> &[PlantingRow] {
        &self.rows
    }

    pub fn row(&self, id: RowId) -> Option<&PlantingRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub fn qualifying_rows(&self) -> impl Iterator<Item = &PlantingRow> {
        self.rows.iter().filter(|r| r.qualifies())
    }

    pub fn efficiencies(&self) -> Efficiencies {
        self.efficiencies
    }

    pub fn result(&self) -> &CalculationResult {
        &self.result
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn add_row(&mut self) -> Result<RowId, CalcError> {
        self.ensure_editable()?;
        let id = self.next_id;
        self.next_id += 1;
        self.rows.push(PlantingRow::new(id));
        self.recompute();
        Ok(id)
    }

    pub fn remove_row(&mut self, id: RowId) -> Result<(), CalcError> {
        self.ensure_editable()?;
        let index = self.index_of(id)?;
        if self.rows.len() <= 1 {
            return Err(CalcError::LastRow);
        }
        self.rows.remove(index);
        self.recompute();
        Ok(())
    }

    pub fn select_crop(&mut self, id: RowId, crop: &CropMonthlyProfile) -> Result<(), CalcError> {
        self.edit(id, |row| {
            row.set_crop(crop);
            Ok(())
        })
    }

    /// Set or blank a row's planted area.
    pub fn set_area(&mut self, id: RowId, area: Option<f64>) -> Result<(), CalcError> {
        if let Some(value) = area {
            if !value.is_finite() || value < 0.0 {
                return Err(CalcError::InvalidArea(value));
            }
        }
        self.edit(id, |row| {
            row.area = area;
            Ok(())
        })
    }

    /// Override a row's monthly coefficients.
    pub fn set_coefficients(
        &mut self,
        id: RowId,
        coefficients: [f64; MONTHS],
    ) -> Result<(), CalcError> {
        if let Some((month, value)) = coefficients
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite())
        {
            return Err(CalcError::InvalidCoefficient {
                month: month + 1,
                value: *value,
            });
        }
        self.edit(id, |row| {
            row.coefficients = coefficients;
            Ok(())
        })
    }

    pub fn set_efficiencies(&mut self, efficiencies: Efficiencies) -> Result<(), CalcError> {
        self.ensure_editable()?;
        self.efficiencies = efficiencies;
        self.recompute();
        Ok(())
    }

    fn edit<F>(&mut self, id: RowId, change: F) -> Result<(), CalcError>
    where
        F: FnOnce(&mut PlantingRow) -> Result<(), CalcError>,
    {
        self.ensure_editable()?;
        let index = self.index_of(id)?;
        change(&mut self.rows[index])?;
        self.recompute();
        Ok(())
    }

    fn ensure_editable(&self) -> Result<(), CalcError> {
        if self.read_only {
            Err(CalcError::ReadOnly)
        } else {
            Ok(())
        }
    }

    fn index_of(&self, id: RowId) -> Result<usize, CalcError> {
        self.rows
            .iter()
            .position(|r| r.id == id)
            .ok_or(CalcError::NoSuchRow(id))
    }

    fn recompute(&mut self) {
        allocate_shares(&mut self.rows);
        self.result = reduce_demand(&self.rows, self.efficiencies);
    }
}
