//! Monthly water usage dashboard: network intake, stored water and planned
//! consumption side by side for one year.

use crate::resources::Id;
use serde::{Deserialize, Serialize};

/// Which records the dashboard aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardScope {
    #[default]
    All,
    IrrigationSystem(Id),
    /// Narrows network and storage records to one facility. Consumption
    /// still covers the facility's whole irrigation system.
    StorageFacility(Id),
}

impl DashboardScope {
    /// The single query parameter for this scope. The backend prefers
    /// `depolama_tesisi` over `sulama`, so only one is ever sent.
    pub fn param(&self) -> Option<(&'static str, Id)> {
        match *self {
            DashboardScope::All => None,
            DashboardScope::IrrigationSystem(id) => Some(("sulama", id)),
            DashboardScope::StorageFacility(id) => Some(("depolama_tesisi", id)),
        }
    }
}

/// One month of the dashboard. Volumes are in m³.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct MonthlyUsage {
    /// Turkish month name
    #[serde(rename = "ay")]
    pub month_name: String,
    /// 1-based month number
    #[serde(rename = "ay_no")]
    pub month: u32,
    /// Total taken into the network
    #[serde(rename = "sebeke_su", default)]
    pub network: f64,
    /// Stored water on the month's last recorded day
    #[serde(rename = "depolama_su", default)]
    pub storage: f64,
    /// Planned consumption from saved calculations
    #[serde(rename = "tuketim_su", default)]
    pub consumption: f64,
    #[serde(rename = "sebeke_kayit_sayisi", default)]
    pub network_records: u64,
    #[serde(rename = "depolama_kayit_sayisi", default)]
    pub storage_records: u64,
    #[serde(rename = "tuketim_kayit_sayisi", default)]
    pub consumption_records: u64,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct DashboardTotals {
    #[serde(rename = "yil")]
    pub year: i32,
    #[serde(rename = "sulama_id", default)]
    pub irrigation_system: Option<Id>,
    #[serde(rename = "depolama_tesisi_id", default)]
    pub storage_facility: Option<Id>,
    #[serde(rename = "toplam_sebeke_su", default)]
    pub network: f64,
    #[serde(rename = "toplam_depolama_su", default)]
    pub storage: f64,
    #[serde(rename = "toplam_tuketim_su", default)]
    pub consumption: f64,
    #[serde(rename = "toplam_sebeke_kayit", default)]
    pub network_records: u64,
    #[serde(rename = "toplam_depolama_kayit", default)]
    pub storage_records: u64,
    #[serde(rename = "toplam_tuketim_kayit", default)]
    pub consumption_records: u64,
    /// Stored water in the current month
    #[serde(rename = "guncel_depo_miktari", default)]
    pub current_storage: f64,
    /// Planned consumption for the months after the current one
    #[serde(rename = "gelecek_ihtiyac", default)]
    pub remaining_demand: f64,
    /// "Yeterli" or "Yetersiz"
    #[serde(rename = "yeterlilik_durumu", default)]
    pub sufficiency: String,
    /// Current storage as a percentage of the remaining demand
    #[serde(rename = "yeterlilik_orani", default)]
    pub sufficiency_percent: f64,
    #[serde(rename = "guncel_ay", default)]
    pub current_month: u32,
}

impl DashboardTotals {
    pub fn is_sufficient(&self) -> bool {
        self.sufficiency == "Yeterli"
    }
}

/// Body of `dashboard/aylik_su_kullanimi/`.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct MonthlyDashboard {
    #[serde(rename = "aylik_veriler", default)]
    pub months: Vec<MonthlyUsage>,
    #[serde(rename = "istatistikler")]
    pub totals: DashboardTotals,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_sends_one_param() {
        assert_eq!(DashboardScope::All.param(), None);
        assert_eq!(
            DashboardScope::IrrigationSystem(2).param(),
            Some(("sulama", 2))
        );
        assert_eq!(
            DashboardScope::StorageFacility(5).param(),
            Some(("depolama_tesisi", 5))
        );
    }

    #[test]
    fn test_dashboard_body() {
        let body = r#"{
            "aylik_veriler": [
                {"ay": "Ocak", "ay_no": 1, "sebeke_su": 0, "depolama_su": 0, "tuketim_su": 0,
                 "sebeke_kayit_sayisi": 0, "depolama_kayit_sayisi": 0, "tuketim_kayit_sayisi": 0},
                {"ay": "Temmuz", "ay_no": 7, "sebeke_su": 125000.5, "depolama_su": 1830000.0,
                 "tuketim_su": 410000.0, "sebeke_kayit_sayisi": 31, "depolama_kayit_sayisi": 4,
                 "tuketim_kayit_sayisi": 3}
            ],
            "istatistikler": {
                "toplam_sebeke_su": 125000.5, "toplam_depolama_su": 1830000.0,
                "toplam_tuketim_su": 410000.0, "toplam_sebeke_kayit": 31,
                "toplam_depolama_kayit": 4, "toplam_tuketim_kayit": 3, "yil": 2024,
                "sulama_id": 2, "depolama_tesisi_id": null,
                "guncel_depo_miktari": 0, "gelecek_ihtiyac": 410000.0,
                "yeterlilik_durumu": "Yetersiz", "yeterlilik_orani": 0.0, "guncel_ay": 6
            },
            "success": true
        }"#;
        let dashboard: MonthlyDashboard = serde_json::from_str(body).unwrap();
        assert_eq!(dashboard.months.len(), 2);
        assert_eq!(dashboard.months[1].month_name, "Temmuz");
        assert_eq!(dashboard.months[1].network_records, 31);
        assert_eq!(dashboard.totals.year, 2024);
        assert_eq!(dashboard.totals.irrigation_system, Some(2));
        assert_eq!(dashboard.totals.storage_facility, None);
        assert!(!dashboard.totals.is_sufficient());
    }
}
