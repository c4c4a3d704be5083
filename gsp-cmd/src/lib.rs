//! Command implementations for the GSP CLI.
//!
//! Each subcommand talks to the irrigation backend through
//! [`gsp_api::client::ApiClient`], using the session persisted by `login`.

use anyhow::Context;
use clap::{Args, Subcommand};
use gsp_api::client::ApiClient;
use gsp_api::endpoints::DEFAULT_BASE_URL;
use gsp_api::resources::Id;
use gsp_api::session::LocalSession;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub mod auth;
pub mod calculate;
pub mod dashboard;
pub mod list;
pub mod lookup;
pub mod machine;
pub mod records;
pub mod report;

/// Connection settings shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Backend base URL
    #[arg(long, global = true, env = "GSP_API_URL", default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Session file (default: $HOME/.gsp/session.json)
    #[arg(long, global = true, env = "GSP_SESSION_FILE")]
    pub session_file: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    pub timeout_secs: u64,
}

impl Settings {
    pub fn session_path(&self) -> PathBuf {
        match &self.session_file {
            Some(path) => path.clone(),
            None => std::env::var_os("HOME")
                .map(PathBuf::from)
                .unwrap_or_default()
                .join(".gsp")
                .join("session.json"),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Open the session file and build a client around it.
    pub fn connect(&self) -> anyhow::Result<ApiClient> {
        let path = self.session_path();
        let session = LocalSession::open(&path)
            .with_context(|| format!("Failed to open session file {}", path.display()))?;
        Ok(ApiClient::new(
            &self.api_url,
            Arc::new(session),
            self.timeout(),
        )?)
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Log in and store the session
    Login {
        #[arg(short, long)]
        username: String,

        /// Password (read from stdin when omitted)
        #[arg(short, long, env = "GSP_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Log out and forget the stored session
    Logout,

    /// Check the stored session and show the signed-in user
    Whoami,

    /// Print the signed-in user's recent login attempts as CSV
    LoginHistory,

    /// Change the signed-in user's password
    ChangePassword {
        #[arg(long)]
        old: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },

    /// Print a backend collection as CSV
    List(list::ListArgs),

    /// Record water released into the network through a channel
    RecordNetworkWater(records::NetworkWaterArgs),

    /// Record the daily level and volume of a storage facility
    RecordStorageWater(records::StorageWaterArgs),

    /// Delete a daily water record
    DeleteRecord {
        #[arg(value_enum)]
        kind: records::RecordKind,
        id: Id,
    },

    /// Run a water-demand calculation, optionally saving and exporting it
    Calculate(calculate::CalculateArgs),

    /// Load a saved calculation, recompute it and optionally export it
    QueryCalculation(calculate::QueryArgs),

    /// Print monthly network, storage and consumption volumes as CSV
    Dashboard(dashboard::DashboardArgs),

    /// Read heights or elevations from stdin and print the looked-up volume
    LookupVolume(lookup::LookupArgs),

    /// Machine tracking
    #[command(subcommand)]
    Machine(machine::MachineCommand),
}

pub async fn run(command: Command, settings: &Settings) -> anyhow::Result<()> {
    let client = settings.connect()?;
    match command {
        Command::Login { username, password } => {
            auth::run_login(&client, &username, password).await
        }
        Command::Logout => auth::run_logout(&client).await,
        Command::Whoami => auth::run_whoami(&client).await,
        Command::LoginHistory => auth::run_login_history(&client).await,
        Command::ChangePassword { old, new, confirm } => {
            auth::run_change_password(&client, &old, &new, &confirm).await
        }
        Command::List(args) => list::run_list(&client, &args).await,
        Command::RecordNetworkWater(args) => records::run_network_water(&client, &args).await,
        Command::RecordStorageWater(args) => records::run_storage_water(&client, &args).await,
        Command::DeleteRecord { kind, id } => records::run_delete(&client, kind, id).await,
        Command::Calculate(args) => calculate::run_calculate(&client, &args).await,
        Command::QueryCalculation(args) => calculate::run_query(&client, &args).await,
        Command::Dashboard(args) => dashboard::run_dashboard(&client, &args).await,
        Command::LookupVolume(args) => {
            lookup::run_lookup(Arc::new(client), &args, settings.timeout()).await
        }
        Command::Machine(command) => machine::run(&client, command).await,
    }
}
