//! Machine and equipment tracking resources.
//!
//! Machines belong (optionally) to an irrigation system, report positions as
//! a stream of location records, and carry work orders that move through
//! planned → in progress → completed.

use crate::resources::Id;
use crate::wire::{decimal, option_decimal, option_timestamp};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fallback map position (Samsun city centre) for machines with no location yet.
pub const DEFAULT_LATITUDE: f64 = 41.2867;
pub const DEFAULT_LONGITUDE: f64 = 36.3300;

/// Error returned when parsing one of the machine enums from a CLI string.
#[derive(Debug, PartialEq, Clone)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown value: {}", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal / $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Value as sent on the wire.
            pub fn as_wire(&self) -> &'static str {
                match self { $($name::$variant => $wire),+ }
            }

            /// Human-readable Turkish label.
            pub fn label(&self) -> &'static str {
                match self { $($name::$variant => $label),+ }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_wire())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let lowered = s.trim().to_lowercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_wire() == lowered)
                    .ok_or_else(|| UnknownVariant(s.to_string()))
            }
        }
    };
}

wire_enum!(
    /// Machine type
    MachineKind {
        Tractor => "traktor" / "Traktör",
        Excavator => "ekskavator" / "Ekskavatör",
        Bulldozer => "buldozer" / "Buldozer",
        Loader => "yukleyici" / "Yükleyici",
        Other => "diger" / "Diğer",
    }
);

wire_enum!(
    MachineStatus {
        Active => "aktif" / "Aktif",
        Passive => "pasif" / "Pasif",
        Maintenance => "bakim" / "Bakımda",
        Broken => "ariza" / "Arızalı",
    }
);

wire_enum!(
    /// Kind of job a work order describes
    WorkKind {
        Irrigation => "sulama" / "Sulama",
        Maintenance => "bakim" / "Bakım",
        Repair => "tamir" / "Tamir",
        Transport => "tasima" / "Taşıma",
        Digging => "kazma" / "Kazma",
        Other => "diger" / "Diğer",
    }
);

wire_enum!(
    WorkStatus {
        Planned => "planlandi" / "Planlandı",
        InProgress => "devam_ediyor" / "Devam Ediyor",
        Completed => "tamamlandi" / "Tamamlandı",
        Cancelled => "iptal" / "İptal",
    }
);

impl Default for MachineStatus {
    fn default() -> Self {
        MachineStatus::Active
    }
}

impl Default for WorkStatus {
    fn default() -> Self {
        WorkStatus::Planned
    }
}

/// Most recent position reported for a machine.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct LastLocation {
    #[serde(rename = "enlem", with = "decimal")]
    pub latitude: f64,
    #[serde(rename = "boylam", with = "decimal")]
    pub longitude: f64,
    #[serde(rename = "kayit_zamani", default, with = "option_timestamp")]
    pub recorded_at: Option<NaiveDateTime>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Machine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    /// Union-wide unique machine number
    #[serde(rename = "birlik_no")]
    pub union_no: String,
    #[serde(rename = "isim")]
    pub name: String,
    #[serde(rename = "makina_tipi")]
    pub kind: MachineKind,
    #[serde(rename = "plaka", default)]
    pub plate: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(rename = "yil", default)]
    pub year: Option<i32>,
    #[serde(rename = "durum", default)]
    pub status: MachineStatus,
    #[serde(rename = "sulama", default)]
    pub irrigation_system: Option<Id>,
    #[serde(rename = "aciklama", default)]
    pub description: Option<String>,
    #[serde(rename = "son_konum", default, skip_serializing)]
    pub last_location: Option<LastLocation>,
}

/// A single position report.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct MachineLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    #[serde(rename = "makina")]
    pub machine: Id,
    #[serde(rename = "enlem", with = "decimal")]
    pub latitude: f64,
    #[serde(rename = "boylam", with = "decimal")]
    pub longitude: f64,
    #[serde(rename = "kayit_zamani", default, with = "option_timestamp", skip_serializing)]
    pub recorded_at: Option<NaiveDateTime>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct MachineWorkOrder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    #[serde(rename = "makina")]
    pub machine: Id,
    #[serde(rename = "is_tipi")]
    pub kind: WorkKind,
    #[serde(rename = "baslik")]
    pub title: String,
    #[serde(rename = "aciklama", default)]
    pub description: Option<String>,
    #[serde(rename = "calistigi_yer", default)]
    pub site: Option<String>,
    #[serde(rename = "baslangic_zamani", default, with = "option_timestamp")]
    pub started_at: Option<NaiveDateTime>,
    #[serde(rename = "bitis_zamani", default, with = "option_timestamp")]
    pub finished_at: Option<NaiveDateTime>,
    #[serde(rename = "durum", default)]
    pub status: WorkStatus,
    #[serde(rename = "enlem", default, with = "option_decimal")]
    pub latitude: Option<f64>,
    #[serde(rename = "boylam", default, with = "option_decimal")]
    pub longitude: Option<f64>,
}

/// The active job shown next to a machine on the map.
#[derive(Debug, PartialEq, Clone, Deserialize)]
pub struct ActiveWork {
    pub id: Id,
    #[serde(rename = "is_tipi")]
    pub kind: WorkKind,
    #[serde(rename = "baslik")]
    pub title: String,
    #[serde(rename = "calistigi_yer", default)]
    pub site: Option<String>,
}

/// One entry of `makinalar/harita_verileri/`.
#[derive(Debug, PartialEq, Clone, Deserialize)]
pub struct MachineMapEntry {
    pub id: Id,
    #[serde(rename = "birlik_no")]
    pub union_no: String,
    #[serde(rename = "isim")]
    pub name: String,
    #[serde(rename = "makina_tipi")]
    pub kind: MachineKind,
    #[serde(rename = "durum")]
    pub status: MachineStatus,
    #[serde(rename = "enlem", with = "decimal")]
    pub latitude: f64,
    #[serde(rename = "boylam", with = "decimal")]
    pub longitude: f64,
    /// False when the position is the default fallback, not a real report
    #[serde(rename = "konum_var", default)]
    pub has_location: bool,
    #[serde(rename = "aktif_is", default)]
    pub active_work: Option<ActiveWork>,
}

#[derive(Debug, PartialEq, Clone, Deserialize)]
pub struct MachineMap {
    #[serde(rename = "makinalar", default)]
    pub machines: Vec<MachineMapEntry>,
}

/// Check a coordinate pair entered by hand before sending it anywhere.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), String> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(format!("latitude out of range: {latitude}"));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(format!("longitude out of range: {longitude}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_machine_with_string_coordinates() {
        let body = r#"{
            "id": 4, "birlik_no": "B-17", "isim": "Paletli", "makina_tipi": "ekskavator",
            "plaka": null, "model": "PC200", "yil": 2019, "durum": "bakim", "sulama": 2,
            "sulama_isim": "Bafra", "makina_tipi_display": "Ekskavatör",
            "son_konum": {"enlem": "41.566100", "boylam": "35.906700", "kayit_zamani": "2024-06-01T10:15:00+03:00"},
            "aktif_is": null
        }"#;
        let machine: Machine = serde_json::from_str(body).unwrap();
        assert_eq!(machine.kind, MachineKind::Excavator);
        assert_eq!(machine.status, MachineStatus::Maintenance);
        let location = machine.last_location.unwrap();
        assert_eq!(location.latitude, 41.5661);
        assert!(location.recorded_at.is_some());
    }

    #[test]
    fn test_new_machine_serializes_without_read_only_fields() {
        let machine = Machine {
            id: None,
            union_no: String::from("B-18"),
            name: String::from("Traktör 1"),
            kind: MachineKind::Tractor,
            plate: Some(String::from("55 ABC 123")),
            model: None,
            year: None,
            status: MachineStatus::default(),
            irrigation_system: Some(2),
            description: None,
            last_location: None,
        };
        let json = serde_json::to_value(&machine).unwrap();
        assert!(json.get("id").is_none());
        assert!(json.get("son_konum").is_none());
        assert_eq!(json["makina_tipi"], "traktor");
        assert_eq!(json["durum"], "aktif");
    }

    #[test]
    fn test_enum_from_str() {
        assert_eq!("Traktor".parse::<MachineKind>().unwrap(), MachineKind::Tractor);
        assert_eq!("devam_ediyor".parse::<WorkStatus>().unwrap(), WorkStatus::InProgress);
        assert!("uçak".parse::<MachineKind>().is_err());
        assert_eq!(WorkKind::Transport.label(), "Taşıma");
    }

    #[test]
    fn test_map_entry_defaults() {
        let body = r#"{"makinalar": [{
            "id": 1, "birlik_no": "B-1", "isim": "T1", "makina_tipi": "traktor",
            "durum": "aktif", "enlem": 41.2867, "boylam": 36.33, "konum_var": false,
            "aktif_is": {"id": 8, "is_tipi": "kazma", "baslik": "Kanal temizliği", "calistigi_yer": null}
        }], "success": true}"#;
        let map: MachineMap = serde_json::from_str(body).unwrap();
        assert_eq!(map.machines.len(), 1);
        assert!(!map.machines[0].has_location);
        assert_eq!(map.machines[0].active_work.as_ref().unwrap().kind, WorkKind::Digging);
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(DEFAULT_LATITUDE, DEFAULT_LONGITUDE).is_ok());
        assert!(validate_coordinates(91.0, 0.0).is_err());
        assert!(validate_coordinates(0.0, f64::NAN).is_err());
    }
}
