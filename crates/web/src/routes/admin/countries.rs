use crate::error::WebError;
use crate::response::ApiResponse;
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use temperature_db::{countries, Country};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct CountryPayload {
    pub name: String,
}

/// GET /admin/countries
///
/// All countries, ordered by name.
pub async fn list_countries(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Country>>>, WebError> {
    let countries = countries::list(&state.db).await?;
    Ok(Json(ApiResponse::success(
        countries,
        "Countries retrieved successfully",
    )))
}

/// POST /admin/countries
///
/// Returns `409 Conflict` when the name is already taken.
pub async fn create_country(
    State(state): State<AppState>,
    payload: Result<Json<CountryPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Country>>), WebError> {
    let Json(payload) = payload?;
    let country = countries::create(&state.db, &payload.name).await?;
    info!("Admin created country {} ({})", country.name, country.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(country, "Country created successfully")),
    ))
}

/// GET /admin/countries/:id
pub async fn get_country(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<ApiResponse<Country>>, WebError> {
    let Path(id) = id?;
    let country = countries::get(&state.db, id).await?;
    Ok(Json(ApiResponse::success(
        country,
        "Country retrieved successfully",
    )))
}

/// PUT /admin/countries/:id
pub async fn update_country(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CountryPayload>, JsonRejection>,
) -> Result<Json<ApiResponse<Country>>, WebError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let country = countries::rename(&state.db, id, &payload.name).await?;
    Ok(Json(ApiResponse::success(
        country,
        "Country updated successfully",
    )))
}

/// DELETE /admin/countries/:id
///
/// Also deletes every record of the country.
pub async fn delete_country(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<ApiResponse<()>>, WebError> {
    let Path(id) = id?;
    countries::delete(&state.db, id).await?;
    info!("Admin deleted country {}", id);
    Ok(Json(ApiResponse::success((), "Country deleted successfully")))
}
