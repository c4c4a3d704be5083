//! `list <resource>`: print a backend collection as CSV.

use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use gsp_api::client::{ApiClient, MachineFilter, RecordFilter, WorkOrderFilter};
use gsp_api::machine::{MachineKind, MachineStatus, WorkStatus};
use gsp_api::resources::Id;
use gsp_utils::dates::format_date;
use gsp_utils::months::MONTH_SHORT;
use gsp_utils::numbers::round_to;
use log::info;
use std::io::Write;
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum Resource {
    Systems,
    StorageFacilities,
    Channels,
    NetworkWater,
    StorageWater,
    Products,
    Categories,
    Consumption,
    Machines,
    Locations,
    WorkOrders,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[arg(value_enum)]
    pub resource: Resource,

    /// Irrigation system id
    #[arg(long)]
    pub system: Option<Id>,

    /// Storage facility id
    #[arg(long)]
    pub storage: Option<Id>,

    /// Channel id
    #[arg(long)]
    pub channel: Option<Id>,

    /// Machine id
    #[arg(long)]
    pub machine: Option<Id>,

    /// Exact date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// First date of a range (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last date of a range (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    #[arg(long)]
    pub year: Option<i32>,

    /// Product category id
    #[arg(long)]
    pub category: Option<Id>,

    /// Machine type (traktor, ekskavator, ...)
    #[arg(long)]
    pub kind: Option<MachineKind>,

    /// Machine status (aktif, pasif, bakim, ariza)
    #[arg(long)]
    pub status: Option<MachineStatus>,

    /// Work order status (planlandi, devam_ediyor, ...)
    #[arg(long)]
    pub work_status: Option<WorkStatus>,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Header plus rows, ready for CSV output.
#[derive(Debug, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub(crate) fn new(headers: &[&str]) -> Self {
        Table {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

pub fn write_csv<W: Write>(table: &Table, writer: W) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub async fn fetch_table(client: &ApiClient, args: &ListArgs) -> anyhow::Result<Table> {
    let records = RecordFilter {
        channel: args.channel,
        storage_facility: args.storage,
        date: args.date,
        from: args.from,
        to: args.to,
    };

    let table = match args.resource {
        Resource::Systems => {
            let mut table = Table::new(&["id", "name", "region"]);
            for s in client.irrigation_systems().await? {
                table.push(vec![s.id.to_string(), s.name, opt(&s.region_name)]);
            }
            table
        }
        Resource::StorageFacilities => {
            let mut table = Table::new(&[
                "id",
                "name",
                "system",
                "crest_elevation",
                "max_water_elevation",
                "min_water_elevation",
                "max_volume",
                "min_volume",
            ]);
            for f in client.storage_facilities(args.system).await? {
                table.push(vec![
                    f.id.to_string(),
                    f.name,
                    opt(&f.irrigation_system),
                    opt(&f.crest_elevation),
                    opt(&f.max_water_elevation),
                    opt(&f.min_water_elevation),
                    opt(&f.max_volume),
                    opt(&f.min_volume),
                ]);
            }
            table
        }
        Resource::Channels => {
            let mut table = Table::new(&["id", "name", "storage_facility", "code"]);
            for c in client.channels(args.storage).await? {
                table.push(vec![
                    c.id.to_string(),
                    c.name,
                    opt(&c.storage_facility),
                    opt(&c.code),
                ]);
            }
            table
        }
        Resource::NetworkWater => {
            let mut table =
                Table::new(&["id", "channel", "date", "start", "end", "height_m", "volume_m3"]);
            for r in client.daily_network_water(&records).await? {
                table.push(vec![
                    opt(&r.id),
                    r.channel.to_string(),
                    format_date(&r.date),
                    r.start.format("%H:%M").to_string(),
                    r.end.format("%H:%M").to_string(),
                    opt(&r.height),
                    r.volume.to_string(),
                ]);
            }
            table
        }
        Resource::StorageWater => {
            let mut table =
                Table::new(&["id", "storage_facility", "date", "elevation_m", "volume_m3"]);
            for r in client.daily_storage_water(&records).await? {
                table.push(vec![
                    opt(&r.id),
                    r.storage_facility.to_string(),
                    format_date(&r.date),
                    r.elevation.to_string(),
                    r.volume.to_string(),
                ]);
            }
            table
        }
        Resource::Products => {
            let mut headers = vec!["id", "name", "categories"];
            headers.extend(MONTH_SHORT.iter());
            let mut table = Table::new(&headers);
            for p in client.products(args.system, args.category).await? {
                let mut row = vec![p.id.to_string(), p.name.clone(), p.category_names.join("; ")];
                row.extend(p.monthly_coefficients().iter().map(|v| v.to_string()));
                table.push(row);
            }
            table
        }
        Resource::Categories => {
            let mut table = Table::new(&["id", "name", "description"]);
            for c in client.product_categories().await? {
                table.push(vec![c.id.to_string(), c.name, opt(&c.description)]);
            }
            table
        }
        Resource::Consumption => {
            let mut table = Table::new(&[
                "record",
                "year",
                "system",
                "farm_efficiency",
                "transmission_efficiency",
                "crop",
                "area_ha",
                "share_percent",
                "water_consumption_m3",
            ]);
            for record in client.annual_consumption(args.year, args.system).await? {
                for detail in &record.crops {
                    table.push(vec![
                        record.id.to_string(),
                        record.year.to_string(),
                        record
                            .irrigation_name
                            .clone()
                            .unwrap_or_else(|| record.irrigation_system.to_string()),
                        record.farm_efficiency.to_string(),
                        record.transmission_efficiency.to_string(),
                        detail
                            .crop_name
                            .clone()
                            .unwrap_or_else(|| detail.crop.to_string()),
                        detail.area.to_string(),
                        opt(&detail.share_percent),
                        opt(&detail.water_consumption.map(|v| round_to(v, 2))),
                    ]);
                }
            }
            table
        }
        Resource::Machines => {
            let filter = MachineFilter {
                irrigation_system: args.system,
                kind: args.kind,
                status: args.status,
            };
            let mut table = Table::new(&[
                "id",
                "union_no",
                "name",
                "kind",
                "plate",
                "status",
                "system",
                "latitude",
                "longitude",
            ]);
            for m in client.machines(&filter).await? {
                let (lat, lon) = match &m.last_location {
                    Some(l) => (l.latitude.to_string(), l.longitude.to_string()),
                    None => (String::new(), String::new()),
                };
                table.push(vec![
                    opt(&m.id),
                    m.union_no,
                    m.name,
                    m.kind.label().to_string(),
                    opt(&m.plate),
                    m.status.label().to_string(),
                    opt(&m.irrigation_system),
                    lat,
                    lon,
                ]);
            }
            table
        }
        Resource::Locations => {
            let mut table = Table::new(&["id", "machine", "latitude", "longitude", "recorded_at"]);
            for l in client.machine_locations(args.machine).await? {
                table.push(vec![
                    opt(&l.id),
                    l.machine.to_string(),
                    l.latitude.to_string(),
                    l.longitude.to_string(),
                    opt(&l.recorded_at),
                ]);
            }
            table
        }
        Resource::WorkOrders => {
            let filter = WorkOrderFilter {
                machine: args.machine,
                kind: None,
                status: args.work_status,
            };
            let mut table = Table::new(&[
                "id", "machine", "kind", "title", "site", "status", "started_at", "finished_at",
            ]);
            for w in client.work_orders(&filter).await? {
                table.push(vec![
                    opt(&w.id),
                    w.machine.to_string(),
                    w.kind.label().to_string(),
                    w.title,
                    opt(&w.site),
                    w.status.label().to_string(),
                    opt(&w.started_at),
                    opt(&w.finished_at),
                ]);
            }
            table
        }
    };
    Ok(table)
}

pub async fn run_list(client: &ApiClient, args: &ListArgs) -> anyhow::Result<()> {
    let table = fetch_table(client, args).await?;
    info!("{:?}: {} rows", args.resource, table.rows.len());
    match &args.out {
        Some(path) => write_csv(&table, std::fs::File::create(path)?),
        None => write_csv(&table, std::io::stdout().lock()),
    }
}
