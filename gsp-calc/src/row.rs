use gsp_api::resources::{CropMonthlyProfile, Id};
use gsp_utils::months::{season_sum, MONTHS};

/// Identifies a row within one table. Stable across removals.
pub type RowId = u64;

/// One line of the calculation table: a crop planted over an area.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantingRow {
    pub id: RowId,
    pub crop: Option<Id>,
    pub crop_name: Option<String>,
    /// Planted area in hectares; `None` while the field is blank
    pub area: Option<f64>,
    /// Share of the qualifying planted area, one decimal
    pub share_percent: f64,
    /// Unit water use per month (m³/ha), January first
    pub coefficients: [f64; MONTHS],
}

impl PlantingRow {
    pub fn new(id: RowId) -> Self {
        PlantingRow {
            id,
            crop: None,
            crop_name: None,
            area: None,
            share_percent: 0.0,
            coefficients: [0.0; MONTHS],
        }
    }

    /// Copy a crop's id, name and monthly coefficients into the row.
    pub fn set_crop(&mut self, crop: &CropMonthlyProfile) {
        self.crop = Some(crop.id);
        self.crop_name = Some(crop.name.clone());
        self.coefficients = crop.monthly_coefficients();
    }

    pub fn area_or_zero(&self) -> f64 {
        self.area.unwrap_or(0.0)
    }

    /// A row takes part in the calculation once it has a crop and a positive area.
    pub fn qualifies(&self) -> bool {
        self.crop.is_some() && self.area_or_zero() > 0.0
    }

    pub fn coefficient_sum(&self) -> f64 {
        self.coefficients.iter().sum()
    }

    /// Sum of the April through October coefficients.
    pub fn season_coefficient_sum(&self) -> f64 {
        season_sum(&self.coefficients)
    }

    /// Yearly consumption in m³: area × sum of the monthly coefficients.
    pub fn water_consumption(&self) -> f64 {
        self.area_or_zero() * self.coefficient_sum()
    }
}
