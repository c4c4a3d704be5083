//! Cell layout of the calculation template.
//!
//! Header cells sit on row 2. Each planting row takes a pair of sheet rows
//! starting at row 6: the upper row holds the crop, area, share and the
//! April..October coefficients, the lower row the same coefficients weighted
//! by the share. Totals follow on rows 38 to 45.

use crate::ExportError;
use gsp_api::resources::{Id, IrrigationSystem};
use gsp_calc::{PlantingRow, PlantingTable};
use gsp_utils::files::sanitize_file_stem;
use gsp_utils::months::{season_sum, IRRIGATION_SEASON};
use gsp_utils::numbers::round_to;
use std::fmt;

pub const FIRST_ROW: u32 = 6;
pub const MAX_ROWS: usize = 16;
pub const TOTALS_ROW: u32 = 38;
pub const NET_ROW: u32 = 39;
pub const FARM_ROW: u32 = 41;
pub const GROSS_ROW: u32 = 43;
pub const GRAND_TOTAL_RANGE: &str = "D44:K45";

/// Columns D..J, one per month of the irrigation season.
pub const SEASON_COLUMNS: [char; 7] = ['D', 'E', 'F', 'G', 'H', 'I', 'J'];
/// Column holding the season sum next to the monthly columns.
pub const SUM_COLUMN: char = 'K';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub column: char,
    pub row: u32,
}

impl CellRef {
    pub fn new(column: char, row: u32) -> Self {
        CellRef { column, row }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

/// Everything to write into the template's first worksheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetPlan {
    pub cells: Vec<(CellRef, CellValue)>,
    pub merges: Vec<String>,
    pub file_name: String,
}

impl SheetPlan {
    fn text(&mut self, column: char, row: u32, value: impl Into<String>) {
        self.cells
            .push((CellRef::new(column, row), CellValue::Text(value.into())));
    }

    fn number(&mut self, column: char, row: u32, value: f64) {
        self.cells
            .push((CellRef::new(column, row), CellValue::Number(value)));
    }

    /// Value planned for a cell such as `"D38"`. The last write wins.
    pub fn get(&self, cell: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .rev()
            .find(|(r, _)| r.to_string() == cell)
            .map(|(_, v)| v)
    }
}

pub struct ExportInput<'a> {
    pub irrigation_name: String,
    pub institution: String,
    pub year: i32,
    pub table: &'a PlantingTable,
}

/// Name of an irrigation system for the sheet header, or its id when the
/// system is not in the list.
pub fn irrigation_name(systems: &[IrrigationSystem], id: Id) -> String {
    systems
        .iter()
        .find(|s| s.id == id)
        .map(|s| s.name.clone())
        .unwrap_or_else(|| id.to_string())
}

/// Output file name: `{irrigation name}_{year}.xlsx`.
pub fn file_name(irrigation_name: &str, year: i32) -> String {
    format!("{}_{}.xlsx", sanitize_file_stem(irrigation_name), year)
}

fn crop_label(row: &PlantingRow) -> String {
    match (&row.crop_name, row.crop) {
        (Some(name), _) => name.clone(),
        (None, Some(id)) => id.to_string(),
        (None, None) => String::new(),
    }
}

/// Decide every cell write for a calculation.
///
/// Fails before producing anything when the table has more rows than the
/// template has room for.
pub fn plan_export(input: &ExportInput<'_>) -> Result<SheetPlan, ExportError> {
    let rows = input.table.rows();
    if rows.len() > MAX_ROWS {
        return Err(ExportError::TooManyRows {
            rows: rows.len(),
            max: MAX_ROWS,
        });
    }
    let efficiencies = input.table.efficiencies();
    let result = input.table.result();

    let mut plan = SheetPlan {
        file_name: file_name(&input.irrigation_name, input.year),
        ..SheetPlan::default()
    };

    plan.text('B', 2, input.irrigation_name.as_str());
    plan.text('G', 2, input.institution.as_str());
    plan.number('K', 2, f64::from(input.year));
    plan.number('C', FARM_ROW, efficiencies.farm());
    plan.number('C', GROSS_ROW, efficiencies.transmission());

    for (i, row) in rows.iter().enumerate() {
        let upper = FIRST_ROW + 2 * i as u32;
        let lower = upper + 1;
        let share = row.share_percent;

        plan.text('A', upper, crop_label(row));
        match row.area {
            Some(area) => plan.number('B', upper, area),
            None => plan.text('B', upper, ""),
        }
        plan.number('C', upper, share);
        plan.text('C', lower, "u-r");

        for (column, &month) in SEASON_COLUMNS.iter().zip(IRRIGATION_SEASON.iter()) {
            let coefficient = row.coefficients[month];
            plan.number(*column, upper, coefficient);
            plan.number(*column, lower, round_to(coefficient * share / 100.0, 2));
        }
        let season = row.season_coefficient_sum();
        plan.number(SUM_COLUMN, upper, round_to(season, 2));
        plan.number(SUM_COLUMN, lower, round_to(season * share / 100.0, 2));
    }

    plan.number('B', TOTALS_ROW, round_to(result.total_area, 2));
    plan.number('C', TOTALS_ROW, round_to(result.total_share, 2));

    let monthly_rows: [(u32, &[f64; 12], u32); 4] = [
        (TOTALS_ROW, &result.weighted_totals, 2),
        (NET_ROW, &result.net, 3),
        (FARM_ROW, &result.farm, 3),
        (GROSS_ROW, &result.gross, 3),
    ];
    for (sheet_row, values, decimals) in monthly_rows {
        for (column, &month) in SEASON_COLUMNS.iter().zip(IRRIGATION_SEASON.iter()) {
            plan.number(*column, sheet_row, round_to(values[month], decimals));
        }
        plan.number(SUM_COLUMN, sheet_row, round_to(season_sum(values), decimals));
    }

    plan.merges.push(GRAND_TOTAL_RANGE.to_string());
    plan.number('D', 44, round_to(result.annual_gross(), 3));

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gsp_api::resources::{CropMonthlyProfile, MonthlyCoefficients};
    use gsp_calc::Efficiencies;

    fn crop(id: i64, name: &str) -> CropMonthlyProfile {
        let values = [1.0, 2.0, 3.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0, 11.0, 12.0];
        CropMonthlyProfile {
            id,
            name: name.to_string(),
            category_names: vec![],
            start_date: None,
            end_date: None,
            coefficients: MonthlyCoefficients::from_array(values),
        }
    }

    fn table(areas: &[f64]) -> PlantingTable {
        let mut table = PlantingTable::new(Efficiencies::new(80.0, 85.0).unwrap());
        let mut ids = vec![table.rows()[0].id];
        for _ in 1..areas.len() {
            ids.push(table.add_row().unwrap());
        }
        for (i, (id, area)) in ids.iter().zip(areas).enumerate() {
            table
                .select_crop(*id, &crop(i as i64 + 1, &format!("Ürün {}", i + 1)))
                .unwrap();
            table.set_area(*id, Some(*area)).unwrap();
        }
        table
    }

    fn input(table: &PlantingTable) -> ExportInput<'_> {
        ExportInput {
            irrigation_name: String::from("Bafra Sulaması"),
            institution: String::from("DSİ 7. Bölge"),
            year: 2024,
            table,
        }
    }

    fn number(plan: &SheetPlan, cell: &str) -> f64 {
        match plan.get(cell) {
            Some(CellValue::Number(n)) => *n,
            other => panic!("{cell}: expected a number, got {other:?}"),
        }
    }

    /// Cells the template reserves for a calculation with `rows` planting rows.
    fn allowed(cell: &CellRef, rows: usize) -> bool {
        let header = matches!((cell.column, cell.row), ('B', 2) | ('G', 2) | ('K', 2));
        let efficiency = cell.column == 'C' && (cell.row == FARM_ROW || cell.row == GROSS_ROW);
        let last_row = FIRST_ROW + 2 * rows as u32 - 1;
        let body = rows > 0 && ('A'..='K').contains(&cell.column) && (FIRST_ROW..=last_row).contains(&cell.row);
        let totals = cell.row == TOTALS_ROW && ('B'..='K').contains(&cell.column);
        let demand = [NET_ROW, FARM_ROW, GROSS_ROW].contains(&cell.row)
            && ('D'..='K').contains(&cell.column);
        let grand_total = cell.column == 'D' && cell.row == 44;
        header || efficiency || body || totals || demand || grand_total
    }

    #[test]
    fn test_header_and_file_name() {
        let t = table(&[10.0]);
        let plan = plan_export(&input(&t)).unwrap();
        assert_eq!(plan.get("B2"), Some(&CellValue::Text(String::from("Bafra Sulaması"))));
        assert_eq!(plan.get("G2"), Some(&CellValue::Text(String::from("DSİ 7. Bölge"))));
        assert_eq!(number(&plan, "K2"), 2024.0);
        assert_eq!(number(&plan, "C41"), 80.0);
        assert_eq!(number(&plan, "C43"), 85.0);
        assert_eq!(plan.file_name, "Bafra Sulaması_2024.xlsx");
        assert_eq!(plan.merges, vec![String::from("D44:K45")]);
    }

    #[test]
    fn test_row_pairs_use_season_months() {
        let t = table(&[30.0, 10.0]);
        let plan = plan_export(&input(&t)).unwrap();

        assert_eq!(plan.get("A6"), Some(&CellValue::Text(String::from("Ürün 1"))));
        assert_eq!(number(&plan, "B6"), 30.0);
        assert_eq!(number(&plan, "C6"), 75.0);
        assert_eq!(plan.get("C7"), Some(&CellValue::Text(String::from("u-r"))));
        assert_eq!(number(&plan, "D6"), 40.0);
        assert_eq!(number(&plan, "J6"), 100.0);
        assert_eq!(number(&plan, "D7"), 30.0);
        assert_eq!(number(&plan, "K6"), 490.0);
        assert_eq!(number(&plan, "K7"), 367.5);

        assert_eq!(plan.get("A8"), Some(&CellValue::Text(String::from("Ürün 2"))));
        assert_eq!(number(&plan, "C8"), 25.0);
        assert!(plan.get("A10").is_none());
    }

    #[test]
    fn test_totals_rows() {
        let t = table(&[30.0, 10.0]);
        let plan = plan_export(&input(&t)).unwrap();
        let result = t.result();

        assert_eq!(number(&plan, "B38"), 40.0);
        assert_eq!(number(&plan, "C38"), 100.0);
        // April is month index 3, not 0
        assert_eq!(number(&plan, "D38"), 40.0);
        assert_eq!(number(&plan, "K38"), 490.0);
        assert_eq!(number(&plan, "D39"), round_to(result.net[3], 3));
        assert_eq!(number(&plan, "K39"), round_to(result.season_net(), 3));
        assert_eq!(number(&plan, "J41"), round_to(result.farm[9], 3));
        assert_eq!(number(&plan, "K43"), round_to(result.season_gross(), 3));
        assert_eq!(number(&plan, "D44"), round_to(result.annual_gross(), 3));
    }

    #[test]
    fn test_writes_stay_inside_template_ranges() {
        for count in [1usize, 2, 5, MAX_ROWS] {
            let areas: Vec<f64> = (1..=count).map(|a| a as f64 * 2.5).collect();
            let t = table(&areas);
            let plan = plan_export(&input(&t)).unwrap();
            for (cell, _) in &plan.cells {
                assert!(allowed(cell, count), "{count} rows wrote {cell}");
            }
            let crop_cells = plan
                .cells
                .iter()
                .filter(|(c, _)| c.column == 'A')
                .count();
            assert_eq!(crop_cells, count);
        }
    }

    #[test]
    fn test_too_many_rows_is_an_error() {
        let areas = vec![1.0; MAX_ROWS + 1];
        let t = table(&areas);
        match plan_export(&input(&t)) {
            Err(ExportError::TooManyRows { rows, max }) => {
                assert_eq!(rows, 17);
                assert_eq!(max, 16);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_blank_row_is_exported_empty() {
        let mut t = PlantingTable::default();
        let id = t.add_row().unwrap();
        t.select_crop(id, &crop(5, "Şeker Pancarı")).unwrap();
        t.set_area(id, Some(12.0)).unwrap();
        let plan = plan_export(&input(&t)).unwrap();
        assert_eq!(plan.get("A6"), Some(&CellValue::Text(String::new())));
        assert_eq!(plan.get("B6"), Some(&CellValue::Text(String::new())));
        assert_eq!(number(&plan, "C6"), 0.0);
        assert_eq!(plan.get("A8"), Some(&CellValue::Text(String::from("Şeker Pancarı"))));
    }

    #[test]
    fn test_irrigation_name_falls_back_to_id() {
        let systems = vec![IrrigationSystem {
            id: 2,
            name: String::from("Çarşamba"),
            region_name: None,
            description: None,
        }];
        assert_eq!(irrigation_name(&systems, 2), "Çarşamba");
        assert_eq!(irrigation_name(&systems, 9), "9");
        assert_eq!(file_name("A/B", 2025), "A_B_2025.xlsx");
    }
}
