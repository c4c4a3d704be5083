//! `lookup-volume`: interactive height/elevation to volume conversion.
//!
//! Each stdin line is one edit of the input field. Lines feed a
//! [`DebouncedLookup`], so fast typing produces one request for the last
//! value. An empty line clears the field.

use clap::{Args, ValueEnum};
use gsp_api::client::ApiClient;
use gsp_api::lookup::{DebouncedLookup, LookupOutcome, VolumeTarget, DEBOUNCE_DELAY};
use gsp_api::resources::Id;
use log::warn;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum TargetKind {
    /// Channel; input is a water height in metres
    Channel,
    /// Storage facility; input is a water surface elevation in metres
    Storage,
}

#[derive(Args, Debug)]
pub struct LookupArgs {
    #[arg(value_enum)]
    pub kind: TargetKind,

    /// Channel or storage facility id
    #[arg(long)]
    pub id: Id,
}

impl LookupArgs {
    pub fn target(&self) -> VolumeTarget {
        match self.kind {
            TargetKind::Channel => VolumeTarget::Channel(self.id),
            TargetKind::Storage => VolumeTarget::Storage(self.id),
        }
    }
}

/// `Ok(None)` for an empty line. Decimal commas are accepted.
pub fn parse_input(line: &str) -> Result<Option<f64>, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value: f64 = trimmed
        .replace(',', ".")
        .parse()
        .map_err(|_| format!("not a number: {trimmed}"))?;
    if !value.is_finite() {
        return Err(format!("not a number: {trimmed}"));
    }
    Ok(Some(value))
}

fn format_outcome(outcome: &LookupOutcome) -> String {
    match &outcome.volume {
        Ok(volume) => format!("{} -> {:.2} m³", outcome.value, volume),
        Err(e) => format!("{} -> error: {}", outcome.value, e),
    }
}

pub async fn run_lookup(
    client: Arc<ApiClient>,
    args: &LookupArgs,
    timeout: Duration,
) -> anyhow::Result<()> {
    let lookup = DebouncedLookup::new(client, args.target());
    let mut rx = lookup.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending: Option<f64> = None;
    let mut printed: Option<u64> = None;

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => match parse_input(&line) {
                    Ok(Some(value)) => {
                        pending = Some(value);
                        lookup.input(value);
                    }
                    Ok(None) => {
                        pending = None;
                        lookup.clear();
                    }
                    Err(e) => warn!("Ignoring input: {}", e),
                },
                None => break,
            },
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = rx.borrow_and_update().clone();
                if let Some(outcome) = current {
                    println!("{}", format_outcome(&outcome));
                    printed = Some(outcome.sequence);
                    if pending == Some(outcome.value) {
                        pending = None;
                    }
                }
            }
        }
    }

    // Stdin closed: wait for the answer to the last value typed.
    let Some(value) = pending else {
        return Ok(());
    };
    let wait = async {
        loop {
            let current = rx.borrow_and_update().clone();
            if let Some(outcome) = current {
                if outcome.value == value && Some(outcome.sequence) != printed {
                    return Some(outcome);
                }
            }
            if rx.changed().await.is_err() {
                return None;
            }
        }
    };
    match tokio::time::timeout(timeout + DEBOUNCE_DELAY, wait).await {
        Ok(Some(outcome)) => {
            println!("{}", format_outcome(&outcome));
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(_) => anyhow::bail!("Timed out waiting for the volume of {value}"),
    }
}
