//! Backend paths, relative to the configured base URL.

use crate::resources::Id;

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8001";

pub const LOGIN: &str = "/api/auth/login/";
pub const LOGOUT: &str = "/api/auth/logout/";
pub const CHECK_AUTH: &str = "/api/auth/check-auth/";
pub const PROFILE: &str = "/api/auth/profile/";
pub const CHANGE_PASSWORD: &str = "/api/auth/change-password/";
pub const LOGIN_HISTORY: &str = "/api/auth/login-history/";

pub const IRRIGATION_SYSTEMS: &str = "/api/sulama/sulamalar/";
pub const STORAGE_FACILITIES: &str = "/api/sulama/depolama-tesisleri/";
pub const CHANNELS: &str = "/api/sulama/kanallar/";
pub const DAILY_NETWORK_WATER: &str = "/api/sulama/gunluk-sebeke-su/";
pub const DAILY_STORAGE_WATER: &str = "/api/sulama/gunluk-depolama-su/";
pub const PRODUCTS: &str = "/api/sulama/urunler/";
pub const PRODUCT_CATEGORIES: &str = "/api/sulama/urun-kategorileri/";
pub const ANNUAL_CONSUMPTION: &str = "/api/sulama/yillik-tuketim/";
pub const MACHINES: &str = "/api/sulama/makinalar/";
pub const MACHINE_LOCATIONS: &str = "/api/sulama/makina-konumlar/";
pub const MACHINE_WORK_ORDERS: &str = "/api/sulama/makina-isler/";
pub const DASHBOARD: &str = "/api/sulama/dashboard/";

pub const VOLUME_LOOKUP: &str = "su_hacmi_hesapla";
pub const BULK_CREATE: &str = "bulk_create";
pub const MAP_DATA: &str = "harita_verileri";
pub const START_WORK: &str = "is_baslat";
pub const COMPLETE_WORK: &str = "is_tamamla";
pub const MONTHLY_USAGE: &str = "aylik_su_kullanimi";

/// `{collection}{id}/`
pub fn detail(collection: &str, id: Id) -> String {
    format!("{collection}{id}/")
}

/// `{collection}{id}/{action}/`
pub fn item_action(collection: &str, id: Id, action: &str) -> String {
    format!("{collection}{id}/{action}/")
}

/// `{collection}{action}/`
pub fn collection_action(collection: &str, action: &str) -> String {
    format!("{collection}{action}/")
}
