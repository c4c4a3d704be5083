//! REST client for the irrigation backend.
//!
//! Every call attaches `Authorization: Token <token>` when the session holds
//! one. Non-2xx responses become [`ApiError::Status`] carrying the backend's
//! message; a 401 on an authenticated call also clears the session. Nothing
//! is retried, cached or deduplicated.

use crate::dashboard::{DashboardScope, MonthlyDashboard};
use crate::endpoints::{self, collection_action, detail, item_action};
use crate::error::ApiError;
use crate::machine::{
    Machine, MachineKind, MachineLocation, MachineMap, MachineStatus, MachineWorkOrder, WorkKind,
    WorkStatus,
};
use crate::resources::{
    AnnualConsumption, CalculationPayload, Channel, CropMonthlyProfile, DailyNetworkWater,
    DailyStorageWater, Id, IrrigationSystem, ProductCategory, SaveCalculationResponse,
    StorageFacility, VolumeLookup,
};
use crate::session::{token_prefix, SessionStore};
use crate::wire::{ActionResponse, ListResponse};
use chrono::NaiveDate;
use log::{debug, info, warn};
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Query-string parameters for a list call. Unset filters are never sent.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Query(Vec<(&'static str, String)>);

impl Query {
    pub fn new() -> Self {
        Query::default()
    }

    pub fn with(mut self, key: &'static str, value: impl ToString) -> Self {
        self.0.push((key, value.to_string()));
        self
    }

    pub fn with_opt<T: ToString>(self, key: &'static str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self,
        }
    }

    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.0
    }
}

/// Filters shared by the two daily water record collections.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecordFilter {
    pub channel: Option<Id>,
    pub storage_facility: Option<Id>,
    pub date: Option<NaiveDate>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl RecordFilter {
    fn dates(&self, query: Query) -> Query {
        query
            .with_opt("tarih", self.date)
            .with_opt("baslangic_tarih", self.from)
            .with_opt("bitis_tarih", self.to)
    }

    fn network_query(&self) -> Query {
        let query = Query::new()
            .with_opt("kanal", self.channel)
            .with_opt("kanal__depolama_tesisi", self.storage_facility);
        self.dates(query)
    }

    fn storage_query(&self) -> Query {
        self.dates(Query::new().with_opt("depolama_tesisi", self.storage_facility))
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct MachineFilter {
    pub irrigation_system: Option<Id>,
    pub kind: Option<MachineKind>,
    pub status: Option<MachineStatus>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct WorkOrderFilter {
    pub machine: Option<Id>,
    pub kind: Option<WorkKind>,
    pub status: Option<WorkStatus>,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        session: Arc<dyn SessionStore>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ApiError::Transport {
                url: base_url.to_string(),
                source,
            })?;
        Ok(ApiClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Start a request, attaching the stored token if there is one.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.anonymous(method, path);
        match self.session.token() {
            Some(token) => {
                debug!("Using token {}", token_prefix(&token));
                builder.header(AUTHORIZATION, format!("Token {token}"))
            }
            None => builder,
        }
    }

    /// Start a request that never carries a token (login).
    pub(crate) fn anonymous(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    pub(crate) async fn execute(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let request = builder.build().map_err(|source| ApiError::Transport {
            url: self.base_url.clone(),
            source,
        })?;
        let url = request.url().to_string();
        let method = request.method().clone();
        let authenticated = request.headers().contains_key(AUTHORIZATION);

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;
        let status = response.status();
        debug!("{} {} -> {}", method, url, status);

        if status == StatusCode::UNAUTHORIZED && authenticated {
            warn!("Token rejected by {}; clearing session", url);
            if let Err(e) = self.session.clear_session() {
                warn!("Failed to clear session: {}", e);
            }
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status.as_u16(), body));
        }
        Ok(response)
    }

    pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let url = response.url().to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;
        serde_json::from_slice(&bytes).map_err(|source| ApiError::Decode { url, source })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &Query) -> Result<T, ApiError> {
        let builder = self.request(Method::GET, path).query(query.pairs());
        let response = self.execute(builder).await?;
        Self::decode(response).await
    }

    /// GET a collection, accepting a bare array or a `{results: [...]}` page.
    pub async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Query,
    ) -> Result<Vec<T>, ApiError> {
        let items = self.get::<ListResponse<T>>(path, query).await?.into_vec();
        debug!("{} returned {} items", path, items.len());
        Ok(items)
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.execute(self.request(Method::POST, path).json(body)).await?;
        Self::decode(response).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.execute(self.request(Method::PUT, path).json(body)).await?;
        Self::decode(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(self.request(Method::DELETE, path)).await?;
        Ok(())
    }

    // Irrigation network

    pub async fn irrigation_systems(&self) -> Result<Vec<IrrigationSystem>, ApiError> {
        self.list(endpoints::IRRIGATION_SYSTEMS, &Query::new()).await
    }

    pub async fn storage_facilities(
        &self,
        irrigation_system: Option<Id>,
    ) -> Result<Vec<StorageFacility>, ApiError> {
        let query = Query::new().with_opt("sulama", irrigation_system);
        self.list(endpoints::STORAGE_FACILITIES, &query).await
    }

    pub async fn channels(&self, storage_facility: Option<Id>) -> Result<Vec<Channel>, ApiError> {
        let query = Query::new().with_opt("depolama_tesisi", storage_facility);
        self.list(endpoints::CHANNELS, &query).await
    }

    /// Volume (m³) for a water height in a channel, from its rating table.
    pub async fn channel_volume(&self, channel: Id, height: f64) -> Result<f64, ApiError> {
        let path = item_action(endpoints::CHANNELS, channel, endpoints::VOLUME_LOOKUP);
        let lookup: VolumeLookup = self.post(&path, &json!({ "yukseklik": height })).await?;
        checked_volume(lookup)
    }

    /// Volume (m³) for a water surface elevation in a storage facility.
    pub async fn storage_volume(&self, facility: Id, elevation: f64) -> Result<f64, ApiError> {
        let path = item_action(endpoints::STORAGE_FACILITIES, facility, endpoints::VOLUME_LOOKUP);
        let lookup: VolumeLookup = self.post(&path, &json!({ "kot": elevation })).await?;
        checked_volume(lookup)
    }

    // Daily water records

    pub async fn daily_network_water(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<DailyNetworkWater>, ApiError> {
        self.list(endpoints::DAILY_NETWORK_WATER, &filter.network_query())
            .await
    }

    pub async fn create_daily_network_water(
        &self,
        record: &DailyNetworkWater,
    ) -> Result<DailyNetworkWater, ApiError> {
        let created: DailyNetworkWater =
            self.post(endpoints::DAILY_NETWORK_WATER, record).await?;
        info!(
            "Recorded {} m³ for channel {} on {}",
            created.volume, created.channel, created.date
        );
        Ok(created)
    }

    pub async fn update_daily_network_water(
        &self,
        id: Id,
        record: &DailyNetworkWater,
    ) -> Result<DailyNetworkWater, ApiError> {
        self.put(&detail(endpoints::DAILY_NETWORK_WATER, id), record)
            .await
    }

    pub async fn delete_daily_network_water(&self, id: Id) -> Result<(), ApiError> {
        self.delete(&detail(endpoints::DAILY_NETWORK_WATER, id)).await
    }

    pub async fn daily_storage_water(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<DailyStorageWater>, ApiError> {
        self.list(endpoints::DAILY_STORAGE_WATER, &filter.storage_query())
            .await
    }

    pub async fn create_daily_storage_water(
        &self,
        record: &DailyStorageWater,
    ) -> Result<DailyStorageWater, ApiError> {
        let created: DailyStorageWater =
            self.post(endpoints::DAILY_STORAGE_WATER, record).await?;
        info!(
            "Recorded {} m³ for storage facility {} on {}",
            created.volume, created.storage_facility, created.date
        );
        Ok(created)
    }

    pub async fn update_daily_storage_water(
        &self,
        id: Id,
        record: &DailyStorageWater,
    ) -> Result<DailyStorageWater, ApiError> {
        self.put(&detail(endpoints::DAILY_STORAGE_WATER, id), record)
            .await
    }

    pub async fn delete_daily_storage_water(&self, id: Id) -> Result<(), ApiError> {
        self.delete(&detail(endpoints::DAILY_STORAGE_WATER, id)).await
    }

    // Crops and annual calculations

    pub async fn products(
        &self,
        irrigation_system: Option<Id>,
        category: Option<Id>,
    ) -> Result<Vec<CropMonthlyProfile>, ApiError> {
        let query = Query::new()
            .with_opt("sulama", irrigation_system)
            .with_opt("kategori", category);
        self.list(endpoints::PRODUCTS, &query).await
    }

    pub async fn product_categories(&self) -> Result<Vec<ProductCategory>, ApiError> {
        self.list(endpoints::PRODUCT_CATEGORIES, &Query::new()).await
    }

    pub async fn annual_consumption(
        &self,
        year: Option<i32>,
        irrigation_system: Option<Id>,
    ) -> Result<Vec<AnnualConsumption>, ApiError> {
        let query = Query::new()
            .with_opt("yil", year)
            .with_opt("sulama", irrigation_system);
        self.list(endpoints::ANNUAL_CONSUMPTION, &query).await
    }

    /// Save a whole calculation in one request. The backend replaces any
    /// previous calculation for the same system and year, or saves nothing.
    pub async fn save_calculation(
        &self,
        payload: &CalculationPayload,
    ) -> Result<SaveCalculationResponse, ApiError> {
        let path = collection_action(endpoints::ANNUAL_CONSUMPTION, endpoints::BULK_CREATE);
        let saved: SaveCalculationResponse = self.post(&path, payload).await?;
        info!(
            "Saved calculation for system {} / {}: {} rows",
            payload.irrigation_system, payload.year, saved.saved_rows
        );
        Ok(saved)
    }

    // Machines

    pub async fn machines(&self, filter: &MachineFilter) -> Result<Vec<Machine>, ApiError> {
        let query = Query::new()
            .with_opt("sulama", filter.irrigation_system)
            .with_opt("makina_tipi", filter.kind)
            .with_opt("durum", filter.status);
        self.list(endpoints::MACHINES, &query).await
    }

    pub async fn machine(&self, id: Id) -> Result<Machine, ApiError> {
        self.get(&detail(endpoints::MACHINES, id), &Query::new())
            .await
    }

    pub async fn create_machine(&self, machine: &Machine) -> Result<Machine, ApiError> {
        let created: Machine = self.post(endpoints::MACHINES, machine).await?;
        info!("Created machine {} ({})", created.name, created.union_no);
        Ok(created)
    }

    pub async fn update_machine(&self, id: Id, machine: &Machine) -> Result<Machine, ApiError> {
        self.put(&detail(endpoints::MACHINES, id), machine).await
    }

    pub async fn delete_machine(&self, id: Id) -> Result<(), ApiError> {
        self.delete(&detail(endpoints::MACHINES, id)).await
    }

    pub async fn machine_map(&self) -> Result<MachineMap, ApiError> {
        let path = collection_action(endpoints::MACHINES, endpoints::MAP_DATA);
        self.get(&path, &Query::new()).await
    }

    pub async fn machine_locations(
        &self,
        machine: Option<Id>,
    ) -> Result<Vec<MachineLocation>, ApiError> {
        let query = Query::new().with_opt("makina", machine);
        self.list(endpoints::MACHINE_LOCATIONS, &query).await
    }

    pub async fn record_machine_location(
        &self,
        location: &MachineLocation,
    ) -> Result<MachineLocation, ApiError> {
        crate::machine::validate_coordinates(location.latitude, location.longitude)
            .map_err(ApiError::Validation)?;
        self.post(endpoints::MACHINE_LOCATIONS, location).await
    }

    pub async fn work_orders(
        &self,
        filter: &WorkOrderFilter,
    ) -> Result<Vec<MachineWorkOrder>, ApiError> {
        let query = Query::new()
            .with_opt("makina", filter.machine)
            .with_opt("is_tipi", filter.kind)
            .with_opt("durum", filter.status);
        self.list(endpoints::MACHINE_WORK_ORDERS, &query).await
    }

    pub async fn create_work_order(
        &self,
        order: &MachineWorkOrder,
    ) -> Result<MachineWorkOrder, ApiError> {
        self.post(endpoints::MACHINE_WORK_ORDERS, order).await
    }

    pub async fn start_work(&self, id: Id) -> Result<ActionResponse, ApiError> {
        let path = item_action(endpoints::MACHINE_WORK_ORDERS, id, endpoints::START_WORK);
        self.post(&path, &json!({})).await
    }

    pub async fn complete_work(&self, id: Id) -> Result<ActionResponse, ApiError> {
        let path = item_action(endpoints::MACHINE_WORK_ORDERS, id, endpoints::COMPLETE_WORK);
        self.post(&path, &json!({})).await
    }

    // Dashboard

    /// Month-by-month water usage for `year`, or for the backend's current
    /// year when `None`.
    pub async fn monthly_water_usage(
        &self,
        year: Option<i32>,
        scope: DashboardScope,
    ) -> Result<MonthlyDashboard, ApiError> {
        let mut query = Query::new().with_opt("yil", year);
        if let Some((key, id)) = scope.param() {
            query = query.with(key, id);
        }
        let path = collection_action(endpoints::DASHBOARD, endpoints::MONTHLY_USAGE);
        let dashboard: MonthlyDashboard = self.get(&path, &query).await?;
        debug!(
            "Dashboard for {} has {} months",
            dashboard.totals.year,
            dashboard.months.len()
        );
        Ok(dashboard)
    }
}

fn checked_volume(lookup: VolumeLookup) -> Result<f64, ApiError> {
    if lookup.success {
        Ok(lookup.volume)
    } else {
        Err(ApiError::Validation(String::from(
            "no volume found for the given value",
        )))
    }
}
