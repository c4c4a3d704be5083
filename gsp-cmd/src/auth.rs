//! login / logout / whoami / login-history / change-password

use crate::list::{write_csv, Table};
use anyhow::Context;
use gsp_api::auth::LoginRecord;
use gsp_api::client::ApiClient;
use gsp_api::error::ApiError;
use gsp_utils::dates::format_timestamp;
use log::info;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run_login(
    client: &ApiClient,
    username: &str,
    password: Option<String>,
) -> anyhow::Result<()> {
    let password = match password {
        Some(p) => p,
        None => read_password_line().await?,
    };
    let user = client.login(username, &password).await?;
    println!("Logged in as {} ({})", user.display_name(), user.username);
    Ok(())
}

async fn read_password_line() -> anyhow::Result<String> {
    eprint!("Password: ");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let line = lines
        .next_line()
        .await
        .context("Failed to read password from stdin")?;
    Ok(line.unwrap_or_default().trim_end_matches(|c: char| c == '\r' || c == '\n').to_string())
}

pub async fn run_logout(client: &ApiClient) -> anyhow::Result<()> {
    client.logout().await?;
    println!("Logged out");
    Ok(())
}

pub async fn run_whoami(client: &ApiClient) -> anyhow::Result<()> {
    match client.restore_session(true).await {
        Ok(Some(user)) => {
            println!("{} ({})", user.display_name(), user.username);
            if !user.email.is_empty() {
                println!("email: {}", user.email);
            }
            if user.is_superuser {
                println!("role: administrator");
            }
            Ok(())
        }
        Ok(None) | Err(ApiError::Unauthorized) => {
            info!("No valid session");
            anyhow::bail!("Not logged in. Run `gsp-cli login` first.")
        }
        Err(e) => Err(e.into()),
    }
}

fn history_table(history: &[LoginRecord]) -> Table {
    let mut table = Table::new(&["at", "ip_address", "successful", "error", "user_agent"]);
    for record in history {
        table.push(vec![
            format_timestamp(&record.at),
            record.ip_address.clone().unwrap_or_default(),
            record.successful.to_string(),
            record.error_message.clone().unwrap_or_default(),
            record.user_agent.clone().unwrap_or_default(),
        ]);
    }
    table
}

pub async fn run_login_history(client: &ApiClient) -> anyhow::Result<()> {
    let history = match client.login_history().await {
        Ok(history) => history,
        Err(ApiError::Unauthorized) => {
            anyhow::bail!("Not logged in. Run `gsp-cli login` first.")
        }
        Err(e) => return Err(e.into()),
    };
    info!("{} login attempts", history.len());
    write_csv(&history_table(&history), std::io::stdout().lock())
}

pub async fn run_change_password(
    client: &ApiClient,
    old: &str,
    new: &str,
    confirm: &str,
) -> anyhow::Result<()> {
    let response = client.change_password(old, new, confirm).await?;
    println!(
        "{}",
        response
            .message
            .unwrap_or_else(|| String::from("Password changed"))
    );
    Ok(())
}
