//! Route table.

pub mod admin;
pub mod health;
pub mod record_list;

use crate::state::AppState;
use axum::routing::get;
use axum::Router;
use temperature_db::{DbError, PageNumber};
use tower_http::trace::TraceLayer;

/// Records shown per page, in the public list and in the admin listing.
pub const PAGE_SIZE: u32 = 50;

/// Build the application router.
///
/// - `/` - paginated record list
/// - `/admin/...` - country and record administration
/// - `/health`, `/metrics`
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(record_list::record_list))
        .route("/health", get(health::health))
        .route("/metrics", get(health::metrics))
        .nest("/admin", admin::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Parse the `page` query parameter; absent or empty means the first page.
pub(crate) fn parse_page(raw: Option<&str>) -> Result<PageNumber, DbError> {
    match raw {
        None | Some("") => Ok(PageNumber::First),
        Some(raw) => raw.parse(),
    }
}
