//! Daily network and storage water records.

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use gsp_api::client::ApiClient;
use gsp_api::resources::{DailyNetworkWater, DailyStorageWater, Id};
use gsp_utils::dates::at_time;
use log::info;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum RecordKind {
    /// Network (channel) water
    Network,
    /// Storage facility water
    Storage,
}

#[derive(Args, Debug)]
pub struct NetworkWaterArgs {
    #[arg(long)]
    pub channel: Id,

    /// Date of the release (YYYY-MM-DD)
    #[arg(long)]
    pub date: NaiveDate,

    /// Start time (HH:MM)
    #[arg(long)]
    pub start: String,

    /// End time (HH:MM)
    #[arg(long)]
    pub end: String,

    /// Water height in metres; the volume is looked up when not given
    #[arg(long)]
    pub height: Option<f64>,

    /// Volume in m³
    #[arg(long)]
    pub volume: Option<f64>,
}

#[derive(Args, Debug)]
pub struct StorageWaterArgs {
    #[arg(long)]
    pub storage: Id,

    #[arg(long)]
    pub date: NaiveDate,

    /// Water surface elevation in metres
    #[arg(long)]
    pub elevation: f64,

    /// Volume in m³; looked up from the elevation when not given
    #[arg(long)]
    pub volume: Option<f64>,
}

/// Build the record to send, checking the time window.
pub fn network_record(args: &NetworkWaterArgs, volume: f64) -> anyhow::Result<DailyNetworkWater> {
    let start = at_time(&args.date, &args.start)
        .with_context(|| format!("Invalid start time: {}", args.start))?;
    let end = at_time(&args.date, &args.end)
        .with_context(|| format!("Invalid end time: {}", args.end))?;
    if end <= start {
        anyhow::bail!("End time {} is not after start time {}", args.end, args.start);
    }
    Ok(DailyNetworkWater {
        id: None,
        channel: args.channel,
        date: args.date,
        start,
        end,
        height: args.height,
        volume,
    })
}

pub async fn run_network_water(client: &ApiClient, args: &NetworkWaterArgs) -> anyhow::Result<()> {
    let volume = match (args.volume, args.height) {
        (Some(volume), _) => volume,
        (None, Some(height)) => client
            .channel_volume(args.channel, height)
            .await
            .with_context(|| format!("No volume for height {height} m on channel {}", args.channel))?,
        (None, None) => anyhow::bail!("Either --height or --volume is required"),
    };
    let record = network_record(args, volume)?;
    let created = client.create_daily_network_water(&record).await?;
    println!(
        "Saved record {}: {} m³",
        created.id.map(|id| id.to_string()).unwrap_or_default(),
        created.volume
    );
    Ok(())
}

pub async fn run_storage_water(client: &ApiClient, args: &StorageWaterArgs) -> anyhow::Result<()> {
    let volume = match args.volume {
        Some(volume) => volume,
        None => client
            .storage_volume(args.storage, args.elevation)
            .await
            .with_context(|| {
                format!(
                    "No volume for elevation {} m on storage facility {}",
                    args.elevation, args.storage
                )
            })?,
    };
    let record = DailyStorageWater {
        id: None,
        storage_facility: args.storage,
        date: args.date,
        elevation: args.elevation,
        volume,
    };
    let created = client.create_daily_storage_water(&record).await?;
    println!(
        "Saved record {}: {} m³",
        created.id.map(|id| id.to_string()).unwrap_or_default(),
        created.volume
    );
    Ok(())
}

pub async fn run_delete(client: &ApiClient, kind: RecordKind, id: Id) -> anyhow::Result<()> {
    match kind {
        RecordKind::Network => client.delete_daily_network_water(id).await?,
        RecordKind::Storage => client.delete_daily_storage_water(id).await?,
    }
    info!("Deleted {:?} record {}", kind, id);
    println!("Deleted record {id}");
    Ok(())
}
