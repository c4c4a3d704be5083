//! `dashboard`: monthly network, storage and planned consumption volumes.

use crate::list::{write_csv, Table};
use clap::Args;
use gsp_api::client::ApiClient;
use gsp_api::dashboard::{DashboardScope, MonthlyDashboard};
use gsp_api::resources::Id;
use log::info;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct DashboardArgs {
    /// Defaults to the backend's current year
    #[arg(long)]
    pub year: Option<i32>,

    /// Irrigation system id
    #[arg(long, conflicts_with = "storage")]
    pub system: Option<Id>,

    /// Storage facility id
    #[arg(long)]
    pub storage: Option<Id>,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

impl DashboardArgs {
    pub fn scope(&self) -> DashboardScope {
        match (self.storage, self.system) {
            (Some(id), _) => DashboardScope::StorageFacility(id),
            (None, Some(id)) => DashboardScope::IrrigationSystem(id),
            (None, None) => DashboardScope::All,
        }
    }
}

/// One row per month plus a closing "Toplam" row.
pub fn dashboard_table(dashboard: &MonthlyDashboard) -> Table {
    let mut table = Table::new(&[
        "month",
        "name",
        "network_m3",
        "storage_m3",
        "consumption_m3",
        "network_records",
        "storage_records",
        "consumption_records",
    ]);
    for m in &dashboard.months {
        table.push(vec![
            m.month.to_string(),
            m.month_name.clone(),
            format!("{:.2}", m.network),
            format!("{:.2}", m.storage),
            format!("{:.2}", m.consumption),
            m.network_records.to_string(),
            m.storage_records.to_string(),
            m.consumption_records.to_string(),
        ]);
    }
    let totals = &dashboard.totals;
    table.push(vec![
        String::new(),
        String::from("Toplam"),
        format!("{:.2}", totals.network),
        format!("{:.2}", totals.storage),
        format!("{:.2}", totals.consumption),
        totals.network_records.to_string(),
        totals.storage_records.to_string(),
        totals.consumption_records.to_string(),
    ]);
    table
}

pub async fn run_dashboard(client: &ApiClient, args: &DashboardArgs) -> anyhow::Result<()> {
    let dashboard = client.monthly_water_usage(args.year, args.scope()).await?;
    let totals = &dashboard.totals;
    info!(
        "{}: current storage {:.0} m³ against {:.0} m³ still needed ({}, %{:.1})",
        totals.year,
        totals.current_storage,
        totals.remaining_demand,
        totals.sufficiency,
        totals.sufficiency_percent
    );
    let table = dashboard_table(&dashboard);
    match &args.out {
        Some(path) => write_csv(&table, std::fs::File::create(path)?),
        None => write_csv(&table, std::io::stdout().lock()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use gsp_api::dashboard::{DashboardTotals, MonthlyUsage};

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        args: DashboardArgs,
    }

    #[test]
    fn test_scope_from_flags() {
        let cli = Cli::try_parse_from(["dashboard", "--year", "2024", "--storage", "5"]).unwrap();
        assert_eq!(cli.args.year, Some(2024));
        assert_eq!(cli.args.scope(), DashboardScope::StorageFacility(5));

        let cli = Cli::try_parse_from(["dashboard", "--system", "2"]).unwrap();
        assert_eq!(cli.args.scope(), DashboardScope::IrrigationSystem(2));

        let cli = Cli::try_parse_from(["dashboard"]).unwrap();
        assert_eq!(cli.args.scope(), DashboardScope::All);

        assert!(Cli::try_parse_from(["dashboard", "--system", "2", "--storage", "5"]).is_err());
    }

    #[test]
    fn test_dashboard_csv() {
        let dashboard = MonthlyDashboard {
            months: vec![MonthlyUsage {
                month_name: String::from("Temmuz"),
                month: 7,
                network: 1250.5,
                storage: 900000.0,
                consumption: 41000.0,
                network_records: 3,
                storage_records: 1,
                consumption_records: 2,
            }],
            totals: DashboardTotals {
                year: 2024,
                irrigation_system: Some(2),
                storage_facility: None,
                network: 1250.5,
                storage: 900000.0,
                consumption: 41000.0,
                network_records: 3,
                storage_records: 1,
                consumption_records: 2,
                current_storage: 900000.0,
                remaining_demand: 41000.0,
                sufficiency: String::from("Yeterli"),
                sufficiency_percent: 2195.1,
                current_month: 7,
            },
        };
        let mut out = Vec::new();
        write_csv(&dashboard_table(&dashboard), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "7,Temmuz,1250.50,900000.00,41000.00,3,1,2");
        assert_eq!(lines[2], ",Toplam,1250.50,900000.00,41000.00,3,1,2");
    }
}
