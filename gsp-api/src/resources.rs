use crate::wire::timestamp;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Primary key of a backend record.
pub type Id = i64;

/// An irrigation system ("sulama"), the unit every plan and record belongs to.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct IrrigationSystem {
    pub id: Id,
    #[serde(rename = "isim")]
    pub name: String,
    #[serde(rename = "bolge_isim", default)]
    pub region_name: Option<String>,
    #[serde(rename = "aciklama", default)]
    pub description: Option<String>,
}

impl IrrigationSystem {
    /// Name shown in selection lists: "name (region)".
    pub fn label(&self) -> String {
        match &self.region_name {
            Some(region) if !region.is_empty() => format!("{} ({})", self.name, region),
            _ => self.name.clone(),
        }
    }
}

/// A storage facility (dam or pond) feeding one irrigation system.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct StorageFacility {
    pub id: Id,
    #[serde(rename = "isim")]
    pub name: String,
    #[serde(rename = "sulama", default)]
    pub irrigation_system: Option<Id>,
    /// Crest elevation in metres
    #[serde(rename = "kret_kotu", default)]
    pub crest_elevation: Option<f64>,
    #[serde(rename = "maksimum_su_kot", default)]
    pub max_water_elevation: Option<f64>,
    #[serde(rename = "minimum_su_kot", default)]
    pub min_water_elevation: Option<f64>,
    /// Volume at maximum water elevation, m³
    #[serde(rename = "maksimum_hacim", default)]
    pub max_volume: Option<f64>,
    #[serde(rename = "minimum_hacim", default)]
    pub min_volume: Option<f64>,
}

/// A distribution channel leaving a storage facility.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: Id,
    #[serde(rename = "isim")]
    pub name: String,
    #[serde(rename = "depolama_tesisi", default)]
    pub storage_facility: Option<Id>,
    #[serde(rename = "kanal_kodu", default)]
    pub code: Option<String>,
}

/// Water released into the network through one channel during a time window.
///
/// When `height` is set the backend derives `volume` from the channel's
/// height-to-volume table on save.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct DailyNetworkWater {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    #[serde(rename = "kanal")]
    pub channel: Id,
    #[serde(rename = "tarih")]
    pub date: NaiveDate,
    #[serde(rename = "baslangic_saati", with = "timestamp")]
    pub start: NaiveDateTime,
    #[serde(rename = "bitis_saati", with = "timestamp")]
    pub end: NaiveDateTime,
    /// Water height in metres
    #[serde(rename = "yukseklik", default)]
    pub height: Option<f64>,
    /// Volume in m³
    #[serde(rename = "su_miktari")]
    pub volume: f64,
}

/// Daily water level and stored volume of a storage facility.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct DailyStorageWater {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    #[serde(rename = "depolama_tesisi")]
    pub storage_facility: Id,
    #[serde(rename = "tarih")]
    pub date: NaiveDate,
    /// Water surface elevation in metres
    #[serde(rename = "kot")]
    pub elevation: f64,
    /// Volume in m³
    #[serde(rename = "su_miktari")]
    pub volume: f64,
}

/// Twelve monthly unit water-use coefficients (m³/ha), January first.
///
/// The backend allows each month to be null; a null month contributes 0.
#[derive(Debug, PartialEq, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MonthlyCoefficients {
    #[serde(rename = "ocak", default)]
    pub january: Option<f64>,
    #[serde(rename = "subat", default)]
    pub february: Option<f64>,
    #[serde(rename = "mart", default)]
    pub march: Option<f64>,
    #[serde(rename = "nisan", default)]
    pub april: Option<f64>,
    #[serde(rename = "mayis", default)]
    pub may: Option<f64>,
    #[serde(rename = "haziran", default)]
    pub june: Option<f64>,
    #[serde(rename = "temmuz", default)]
    pub july: Option<f64>,
    #[serde(rename = "agustos", default)]
    pub august: Option<f64>,
    #[serde(rename = "eylul", default)]
    pub september: Option<f64>,
    #[serde(rename = "ekim", default)]
    pub october: Option<f64>,
    #[serde(rename = "kasim", default)]
    pub november: Option<f64>,
    #[serde(rename = "aralik", default)]
    pub december: Option<f64>,
}

impl MonthlyCoefficients {
    pub fn to_array(&self) -> [f64; 12] {
        [
            self.january,
            self.february,
            self.march,
            self.april,
            self.may,
            self.june,
            self.july,
            self.august,
            self.september,
            self.october,
            self.november,
            self.december,
        ]
        .map(|v| v.unwrap_or(0.0))
    }

    pub fn from_array(values: [f64; 12]) -> Self {
        let [january, february, march, april, may, june, july, august, september, october, november, december] =
            values.map(Some);
        MonthlyCoefficients {
            january,
            february,
            march,
            april,
            may,
            june,
            july,
            august,
            september,
            october,
            november,
            december,
        }
    }
}

/// A crop ("ürün") with its monthly water-use profile.
///
/// Reference data: fetched from the backend, never mutated here.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct CropMonthlyProfile {
    pub id: Id,
    #[serde(rename = "isim")]
    pub name: String,
    #[serde(rename = "kategori_isimleri", default)]
    pub category_names: Vec<String>,
    #[serde(rename = "baslangic_tarihi", default)]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "bitis_tarihi", default)]
    pub end_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub coefficients: MonthlyCoefficients,
}

impl CropMonthlyProfile {
    pub fn monthly_coefficients(&self) -> [f64; 12] {
        self.coefficients.to_array()
    }

    /// Find a crop by id in a fetched product list.
    pub fn find(crops: &[CropMonthlyProfile], id: Id) -> Option<&CropMonthlyProfile> {
        crops.iter().find(|c| c.id == id)
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ProductCategory {
    pub id: Id,
    #[serde(rename = "isim")]
    pub name: String,
    #[serde(rename = "aciklama", default)]
    pub description: Option<String>,
}

/// One crop line of a saved annual calculation.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct AnnualCropDetail {
    #[serde(default)]
    pub id: Option<Id>,
    #[serde(rename = "urun")]
    pub crop: Id,
    #[serde(rename = "urun_isim", default)]
    pub crop_name: Option<String>,
    /// Planted area in hectares
    #[serde(rename = "alan")]
    pub area: f64,
    #[serde(rename = "ekim_orani", default)]
    pub share_percent: Option<f64>,
    /// Water consumption in m³
    #[serde(rename = "su_tuketimi", default)]
    pub water_consumption: Option<f64>,
    #[serde(rename = "aylik_ur_degerleri", default)]
    pub monthly: Option<MonthlyCoefficients>,
}

/// A saved annual water-demand calculation for one irrigation system.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct AnnualConsumption {
    pub id: Id,
    #[serde(rename = "yil")]
    pub year: i32,
    #[serde(rename = "sulama")]
    pub irrigation_system: Id,
    #[serde(rename = "sulama_isim", default)]
    pub irrigation_name: Option<String>,
    #[serde(rename = "ciftlik_randi")]
    pub farm_efficiency: f64,
    #[serde(rename = "iletim_randi")]
    pub transmission_efficiency: f64,
    #[serde(rename = "urun_detaylari", default)]
    pub crops: Vec<AnnualCropDetail>,
}

/// One row of the bulk save payload.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct CalculationRowPayload {
    #[serde(rename = "urun")]
    pub crop: Id,
    #[serde(rename = "ekim_alani")]
    pub area: f64,
    #[serde(rename = "ekim_orani")]
    pub share_percent: f64,
    #[serde(rename = "su_tuketimi")]
    pub water_consumption: f64,
}

/// Body of `yillik-tuketim/bulk_create/`. The backend replaces any existing
/// calculation for the same system and year.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct CalculationPayload {
    #[serde(rename = "sulama")]
    pub irrigation_system: Id,
    #[serde(rename = "yil")]
    pub year: i32,
    #[serde(rename = "ciftlik_randi")]
    pub farm_efficiency: f64,
    #[serde(rename = "iletim_randi")]
    pub transmission_efficiency: f64,
    #[serde(rename = "table_data")]
    pub rows: Vec<CalculationRowPayload>,
}

#[derive(Debug, PartialEq, Clone, Deserialize)]
pub struct SaveCalculationResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "ana_kayit_id", default)]
    pub record_id: Option<Id>,
    #[serde(rename = "urun_detay_sayisi", default)]
    pub saved_rows: usize,
}

/// Result of a height/elevation to volume table lookup.
#[derive(Debug, PartialEq, Clone, Deserialize)]
pub struct VolumeLookup {
    #[serde(rename = "su_hacmi", alias = "su_miktari", default)]
    pub volume: f64,
    #[serde(default)]
    pub success: bool,
}
