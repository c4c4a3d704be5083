//! Plain-text rendering of a calculation for the terminal.

use gsp_calc::PlantingTable;
use gsp_utils::months::{IRRIGATION_SEASON, MONTHS, MONTH_SHORT};
use std::fmt::{self, Write};

fn season_line(
    out: &mut String,
    label: &str,
    values: &[f64; MONTHS],
    season: f64,
    annual: f64,
    decimals: usize,
) -> fmt::Result {
    write!(out, "{label:<24}")?;
    for &m in IRRIGATION_SEASON.iter() {
        write!(out, "{:>10.*}", decimals, values[m])?;
    }
    writeln!(out, "{:>12.*}{:>12.*}", decimals, season, decimals, annual)
}

fn write_report(out: &mut String, title: &str, table: &PlantingTable) -> fmt::Result {
    let result = table.result();
    let efficiencies = table.efficiencies();

    writeln!(out, "{title}")?;
    writeln!(out, "{:<24}{:>10}{:>8}", "Ürün", "Alan (ha)", "Oran %")?;
    for row in table.qualifying_rows() {
        writeln!(
            out,
            "{:<24}{:>10.2}{:>8.1}",
            row.crop_name.clone().unwrap_or_default(),
            row.area_or_zero(),
            row.share_percent
        )?;
    }
    writeln!(
        out,
        "{:<24}{:>10.2}{:>8.1}",
        "Toplam", result.total_area, result.total_share
    )?;
    writeln!(out)?;

    write!(out, "{:<24}", "")?;
    for &m in IRRIGATION_SEASON.iter() {
        write!(out, "{:>10}", MONTH_SHORT[m])?;
    }
    writeln!(out, "{:>12}{:>12}", "Nis-Eki", "Yıllık")?;

    season_line(
        out,
        "Ağırlıklı (m³/ha)",
        &result.weighted_totals,
        result.season_weighted(),
        result.annual_weighted(),
        1,
    )?;
    season_line(out, "Net (hm³)", &result.net, result.season_net(), result.annual_net(), 3)?;
    let farm_label = format!("Çiftlik %{} (hm³)", efficiencies.farm());
    season_line(out, &farm_label, &result.farm, result.season_farm(), result.annual_farm(), 3)?;
    let gross_label = format!("Brüt %{} (hm³)", efficiencies.transmission());
    season_line(
        out,
        &gross_label,
        &result.gross,
        result.season_gross(),
        result.annual_gross(),
        3,
    )
}

/// Render the rows and the demand totals as a fixed-width table.
pub fn render(title: &str, table: &PlantingTable) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    if let Err(e) = write_report(&mut out, title, table) {
        log::error!("Failed to render report: {}", e);
    }
    out
}
