use crate::plan::{CellValue, SheetPlan};
use crate::ExportError;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Apply a plan to a copy of the template and save it in `out_dir`.
///
/// The template itself is never modified. Returns the path of the new file.
pub fn write_workbook(
    plan: &SheetPlan,
    template: &Path,
    out_dir: &Path,
) -> Result<PathBuf, ExportError> {
    let mut book =
        umya_spreadsheet::reader::xlsx::read(template).map_err(|e| ExportError::Template {
            path: template.to_path_buf(),
            message: e.to_string(),
        })?;
    let sheet = book
        .get_sheet_mut(&0)
        .ok_or_else(|| ExportError::NoWorksheet(template.to_path_buf()))?;

    for (cell, value) in &plan.cells {
        let coordinate = cell.to_string();
        let target = sheet.get_cell_mut(coordinate.as_str());
        match value {
            CellValue::Text(text) => {
                target.set_value_string(text.clone());
            }
            CellValue::Number(number) => {
                target.set_value_number(*number);
            }
        }
    }
    for range in &plan.merges {
        sheet.add_merge_cells(range.as_str());
    }

    fs::create_dir_all(out_dir).map_err(|source| ExportError::OutputDir {
        path: out_dir.to_path_buf(),
        source,
    })?;
    let path = out_dir.join(&plan.file_name);
    umya_spreadsheet::writer::xlsx::write(&book, &path).map_err(|e| ExportError::Write {
        path: path.clone(),
        message: e.to_string(),
    })?;
    info!("Wrote {} cells to {}", plan.cells.len(), path.display());
    Ok(path)
}
