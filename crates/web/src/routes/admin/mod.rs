//! Administration endpoints for countries and records.
//!
//! Every response uses the [`ApiResponse`](crate::response::ApiResponse)
//! envelope.

pub mod countries;
pub mod records;

use crate::state::AppState;
use axum::routing::get;
use axum::Router;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/countries",
            get(countries::list_countries).post(countries::create_country),
        )
        .route(
            "/countries/:id",
            get(countries::get_country)
                .put(countries::update_country)
                .delete(countries::delete_country),
        )
        .route(
            "/records",
            get(records::list_records).post(records::create_record),
        )
        .route("/records/dates", get(records::record_dates))
        .route(
            "/records/:id",
            get(records::get_record)
                .put(records::update_record)
                .delete(records::delete_record),
        )
}
