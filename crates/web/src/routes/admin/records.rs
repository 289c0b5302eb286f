use crate::error::WebError;
use crate::response::ApiResponse;
use crate::routes::{parse_page, PAGE_SIZE};
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use temperature_db::models::parse_decimal;
use temperature_db::records::{self, DateDrilldown};
use temperature_db::{NewRecord, Page, Record, RecordFilter, RecordRow};
use tracing::info;

/// Query parameters shared by the listing and the date drill-down.
#[derive(Debug, Default, Deserialize)]
pub struct RecordQuery {
    pub country: Option<i64>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub page: Option<String>,
}

impl RecordQuery {
    fn filter(&self) -> RecordFilter {
        RecordFilter {
            country_id: self.country,
            year: self.year,
            month: self.month,
            day: self.day,
        }
    }
}

/// Record fields as submitted by a client.
///
/// Decimals are strings so they go through the same parsing as CSV values;
/// an empty or missing string stores null.
#[derive(Debug, Deserialize)]
pub struct RecordPayload {
    pub date: NaiveDate,
    #[serde(default)]
    pub temperature: Option<String>,
    #[serde(default)]
    pub uncertainty: Option<String>,
    pub country_id: i64,
}

impl RecordPayload {
    fn into_new_record(self) -> Result<NewRecord, WebError> {
        Ok(NewRecord {
            date: self.date,
            temperature: parse_decimal(self.temperature.as_deref().unwrap_or_default())?,
            uncertainty: parse_decimal(self.uncertainty.as_deref().unwrap_or_default())?,
            country_id: self.country_id,
        })
    }
}

/// GET /admin/records
///
/// ### Query Parameters (All Optional)
/// - `country` (integer): only records of this country
/// - `year`, `month`, `day` (integers): date drill-down; `month` needs `year`
///   and `day` needs `month`
/// - `page`: page number or `last`; 50 records per page
///
/// Rows list country, date, temperature and uncertainty, ordered by
/// (country, date).
pub async fn list_records(
    State(state): State<AppState>,
    query: Result<Query<RecordQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Page<RecordRow>>>, WebError> {
    let Query(query) = query?;
    let page_number = parse_page(query.page.as_deref())?;
    let page = records::page(&state.db, &query.filter(), page_number, PAGE_SIZE).await?;

    state.metrics.inc_pages_served("admin_records");
    Ok(Json(ApiResponse::success(
        page,
        "Records retrieved successfully",
    )))
}

/// GET /admin/records/dates
///
/// Date hierarchy: years that have records, then months of `year`, then
/// days of `year`/`month`. Honors `country`.
pub async fn record_dates(
    State(state): State<AppState>,
    query: Result<Query<RecordQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<DateDrilldown>>, WebError> {
    let Query(query) = query?;
    let drilldown = records::date_drilldown(&state.db, &query.filter()).await?;
    Ok(Json(ApiResponse::success(
        drilldown,
        "Record dates retrieved successfully",
    )))
}

/// POST /admin/records
///
/// Returns `409 Conflict` if the country already has a record for the date.
pub async fn create_record(
    State(state): State<AppState>,
    payload: Result<Json<RecordPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Record>>), WebError> {
    let Json(payload) = payload?;
    let record = records::create(&state.db, payload.into_new_record()?).await?;
    info!("Admin created record {}", record.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(record, "Record created successfully")),
    ))
}

/// GET /admin/records/:id
pub async fn get_record(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<ApiResponse<Record>>, WebError> {
    let Path(id) = id?;
    let record = records::get(&state.db, id).await?;
    Ok(Json(ApiResponse::success(
        record,
        "Record retrieved successfully",
    )))
}

/// PUT /admin/records/:id
pub async fn update_record(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<RecordPayload>, JsonRejection>,
) -> Result<Json<ApiResponse<Record>>, WebError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let record = records::update(&state.db, id, payload.into_new_record()?).await?;
    Ok(Json(ApiResponse::success(
        record,
        "Record updated successfully",
    )))
}

/// DELETE /admin/records/:id
pub async fn delete_record(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<ApiResponse<()>>, WebError> {
    let Path(id) = id?;
    records::delete(&state.db, id).await?;
    info!("Admin deleted record {}", id);
    Ok(Json(ApiResponse::success((), "Record deleted successfully")))
}
