//! `calculate` and `query-calculation`.

use crate::report;
use anyhow::Context;
use clap::Args;
use gsp_api::client::ApiClient;
use gsp_api::resources::{CropMonthlyProfile, Id};
use gsp_calc::demand::{DEFAULT_FARM_EFFICIENCY, DEFAULT_TRANSMISSION_EFFICIENCY};
use gsp_calc::saved::{build_save_payload, table_from_saved};
use gsp_calc::{Efficiencies, PlantingTable};
use gsp_export::plan::{irrigation_name, plan_export, ExportInput};
use gsp_export::workbook::write_workbook;
use log::info;
use std::path::PathBuf;
use std::str::FromStr;

/// A `crop=area` pair from the command line. The crop is an id or a name.
#[derive(Debug, Clone, PartialEq)]
pub struct RowSpec {
    pub crop: String,
    pub area: f64,
}

impl FromStr for RowSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (crop, area) = s
            .rsplit_once('=')
            .ok_or_else(|| format!("expected crop=area, got {s:?}"))?;
        let crop = crop.trim();
        if crop.is_empty() {
            return Err(format!("missing crop in {s:?}"));
        }
        let area: f64 = area
            .trim()
            .replace(',', ".")
            .parse()
            .map_err(|_| format!("invalid area in {s:?}"))?;
        if !area.is_finite() || area < 0.0 {
            return Err(format!("area must be zero or positive in {s:?}"));
        }
        Ok(RowSpec {
            crop: crop.to_string(),
            area,
        })
    }
}

/// Output options shared by both commands.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Spreadsheet template to fill; no workbook is written without it
    #[arg(long)]
    pub template: Option<PathBuf>,

    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Institution name for the sheet header
    #[arg(long)]
    pub institution: Option<String>,
}

#[derive(Args, Debug)]
pub struct CalculateArgs {
    /// Irrigation system id
    #[arg(long)]
    pub system: Id,

    #[arg(long)]
    pub year: i32,

    /// Farm efficiency in percent
    #[arg(long, default_value_t = DEFAULT_FARM_EFFICIENCY)]
    pub farm_eff: f64,

    /// Transmission efficiency in percent
    #[arg(long, default_value_t = DEFAULT_TRANSMISSION_EFFICIENCY)]
    pub transmission_eff: f64,

    /// Planting row as crop=area (hectares); repeat for each row
    #[arg(long = "row", required = true)]
    pub rows: Vec<RowSpec>,

    /// Save the calculation to the backend
    #[arg(long)]
    pub save: bool,

    #[command(flatten)]
    pub export: ExportArgs,
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Irrigation system id
    #[arg(long)]
    pub system: Id,

    #[arg(long)]
    pub year: i32,

    #[command(flatten)]
    pub export: ExportArgs,
}

fn resolve_crop<'a>(
    crops: &'a [CropMonthlyProfile],
    key: &str,
) -> anyhow::Result<&'a CropMonthlyProfile> {
    let by_id = key
        .parse::<Id>()
        .ok()
        .and_then(|id| CropMonthlyProfile::find(crops, id));
    let lowered = key.to_lowercase();
    by_id
        .or_else(|| crops.iter().find(|c| c.name.to_lowercase() == lowered))
        .with_context(|| format!("Unknown crop: {key}"))
}

/// Fill a fresh table with one row per `crop=area` pair.
pub fn build_table(
    crops: &[CropMonthlyProfile],
    specs: &[RowSpec],
    efficiencies: Efficiencies,
) -> anyhow::Result<PlantingTable> {
    let mut table = PlantingTable::new(efficiencies);
    for (i, spec) in specs.iter().enumerate() {
        let crop = resolve_crop(crops, &spec.crop)?;
        let id = match i {
            0 => table.rows()[0].id,
            _ => table.add_row()?,
        };
        table.select_crop(id, crop)?;
        table.set_area(id, Some(spec.area))?;
    }
    Ok(table)
}

fn export(
    args: &ExportArgs,
    name: String,
    year: i32,
    table: &PlantingTable,
) -> anyhow::Result<()> {
    let Some(template) = &args.template else {
        return Ok(());
    };
    let institution = args.institution.clone().unwrap_or_else(|| name.clone());
    let plan = plan_export(&ExportInput {
        irrigation_name: name,
        institution,
        year,
        table,
    })?;
    let path = write_workbook(&plan, template, &args.out_dir)?;
    println!("Wrote {}", path.display());
    Ok(())
}

pub async fn run_calculate(client: &ApiClient, args: &CalculateArgs) -> anyhow::Result<()> {
    let efficiencies = Efficiencies::new(args.farm_eff, args.transmission_eff)?;
    let crops = client
        .products(Some(args.system), None)
        .await
        .context("Failed to fetch crops")?;
    let table = build_table(&crops, &args.rows, efficiencies)?;
    let systems = client.irrigation_systems().await?;
    let name = irrigation_name(&systems, args.system);

    print!("{}", report::render(&format!("{} {}", name, args.year), &table));

    if args.save {
        let payload = build_save_payload(Some(args.system), Some(args.year), &table)?;
        let saved = client.save_calculation(&payload).await?;
        println!(
            "{}",
            saved
                .message
                .unwrap_or_else(|| format!("Saved {} rows", saved.saved_rows))
        );
    }

    export(&args.export, name, args.year, &table)
}

pub async fn run_query(client: &ApiClient, args: &QueryArgs) -> anyhow::Result<()> {
    let records = client
        .annual_consumption(Some(args.year), Some(args.system))
        .await?;
    let Some(table) = table_from_saved(&records, args.system)? else {
        anyhow::bail!(
            "No saved calculation for system {} in {}",
            args.system,
            args.year
        );
    };
    info!("Loaded {} rows", table.rows().len());

    let name = match records.iter().find_map(|r| r.irrigation_name.clone()) {
        Some(name) => name,
        None => irrigation_name(&client.irrigation_systems().await?, args.system),
    };
    print!("{}", report::render(&format!("{} {}", name, args.year), &table));
    export(&args.export, name, args.year, &table)
}
