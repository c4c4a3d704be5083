use crate::list::{write_csv, Table};
use clap::Subcommand;
use gsp_api::client::ApiClient;
use gsp_api::machine::{
    Machine, MachineKind, MachineLocation, MachineMap, MachineStatus, MachineWorkOrder, WorkKind,
    WorkStatus,
};
use gsp_api::resources::Id;
use log::info;

#[derive(Subcommand, Debug)]
pub enum MachineCommand {
    /// Register a machine
    Add {
        /// Union-wide machine number
        #[arg(long)]
        union_no: String,
        #[arg(long)]
        name: String,
        /// traktor, ekskavator, buldozer, yukleyici or diger
        #[arg(long)]
        kind: MachineKind,
        #[arg(long)]
        plate: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long, default_value = "aktif")]
        status: MachineStatus,
        /// Irrigation system id
        #[arg(long)]
        system: Option<Id>,
    },

    /// Change a machine's status
    SetStatus {
        id: Id,
        status: MachineStatus,
    },

    /// Delete a machine
    Remove { id: Id },

    /// Record a position report
    Locate {
        id: Id,
        #[arg(long, allow_negative_numbers = true)]
        latitude: f64,
        #[arg(long, allow_negative_numbers = true)]
        longitude: f64,
    },

    /// Create a planned work order
    AddWork {
        /// Machine id
        machine: Id,
        #[arg(long)]
        kind: WorkKind,
        #[arg(long)]
        title: String,
        #[arg(long)]
        site: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },

    /// Mark a work order as started
    StartWork { id: Id },

    /// Mark a work order as completed
    CompleteWork { id: Id },

    /// Print every machine's current position and active job as CSV
    Map,
}

/// Flatten the map payload into CSV rows.
pub fn map_table(map: &MachineMap) -> Table {
    let mut table = Table::new(&[
        "id",
        "union_no",
        "name",
        "kind",
        "status",
        "latitude",
        "longitude",
        "has_location",
        "active_work",
        "site",
    ]);
    for m in &map.machines {
        let (work, site) = match &m.active_work {
            Some(w) => (w.title.clone(), w.site.clone().unwrap_or_default()),
            None => (String::new(), String::new()),
        };
        table.push(vec![
            m.id.to_string(),
            m.union_no.clone(),
            m.name.clone(),
            m.kind.label().to_string(),
            m.status.label().to_string(),
            m.latitude.to_string(),
            m.longitude.to_string(),
            m.has_location.to_string(),
            work,
            site,
        ]);
    }
    table
}

pub async fn run(client: &ApiClient, command: MachineCommand) -> anyhow::Result<()> {
    match command {
        MachineCommand::Add {
            union_no,
            name,
            kind,
            plate,
            model,
            year,
            status,
            system,
        } => {
            let machine = Machine {
                id: None,
                union_no,
                name,
                kind,
                plate,
                model,
                year,
                status,
                irrigation_system: system,
                description: None,
                last_location: None,
            };
            let created = client.create_machine(&machine).await?;
            println!(
                "Created machine {} ({})",
                created.id.map(|id| id.to_string()).unwrap_or_default(),
                created.union_no
            );
        }
        MachineCommand::SetStatus { id, status } => {
            let mut machine = client.machine(id).await?;
            machine.status = status;
            let updated = client.update_machine(id, &machine).await?;
            info!("Machine {} is now {}", id, updated.status);
            println!("{}: {}", updated.name, updated.status.label());
        }
        MachineCommand::Remove { id } => {
            client.delete_machine(id).await?;
            println!("Deleted machine {id}");
        }
        MachineCommand::Locate {
            id,
            latitude,
            longitude,
        } => {
            let location = MachineLocation {
                id: None,
                machine: id,
                latitude,
                longitude,
                recorded_at: None,
            };
            let saved = client.record_machine_location(&location).await?;
            println!("Machine {} at {}, {}", saved.machine, saved.latitude, saved.longitude);
        }
        MachineCommand::AddWork {
            machine,
            kind,
            title,
            site,
            description,
        } => {
            let order = MachineWorkOrder {
                id: None,
                machine,
                kind,
                title,
                description,
                site,
                started_at: None,
                finished_at: None,
                status: WorkStatus::Planned,
                latitude: None,
                longitude: None,
            };
            let created = client.create_work_order(&order).await?;
            println!(
                "Created work order {}: {}",
                created.id.map(|id| id.to_string()).unwrap_or_default(),
                created.title
            );
        }
        MachineCommand::StartWork { id } => {
            let response = client.start_work(id).await?;
            println!(
                "{}",
                response
                    .message
                    .unwrap_or_else(|| format!("Work order {id} started"))
            );
        }
        MachineCommand::CompleteWork { id } => {
            let response = client.complete_work(id).await?;
            println!(
                "{}",
                response
                    .message
                    .unwrap_or_else(|| format!("Work order {id} completed"))
            );
        }
        MachineCommand::Map => {
            let map = client.machine_map().await?;
            write_csv(&map_table(&map), std::io::stdout().lock())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_table() {
        let body = r#"{"makinalar": [
            {"id": 1, "birlik_no": "B-1", "isim": "T1", "makina_tipi": "traktor",
             "durum": "aktif", "enlem": 41.2867, "boylam": 36.33, "konum_var": false,
             "aktif_is": {"id": 8, "is_tipi": "kazma", "baslik": "Kanal temizliği", "calistigi_yer": "K3"}},
            {"id": 2, "birlik_no": "B-2", "isim": "E1", "makina_tipi": "ekskavator",
             "durum": "ariza", "enlem": "41.5", "boylam": "35.9", "konum_var": true}
        ]}"#;
        let map: MachineMap = serde_json::from_str(body).unwrap();
        let table = map_table(&map);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][3], "Traktör");
        assert_eq!(table.rows[0][7], "false");
        assert_eq!(table.rows[0][8], "Kanal temizliği");
        assert_eq!(table.rows[0][9], "K3");
        assert_eq!(table.rows[1][4], "Arızalı");
        assert_eq!(table.rows[1][8], "");
    }
}
