//! The public, read-only list of temperature records.

use super::{parse_page, PAGE_SIZE};
use crate::error::WebError;
use crate::state::AppState;
use crate::templates::{escape, render_record_list};
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use temperature_db::{records, RecordFilter};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
}

/// GET /
///
/// All records ordered by (country, date), 50 per page. `?page=N` selects a
/// page and `?page=last` the final one; anything else past the end is a 404.
pub async fn record_list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>, HtmlError> {
    let page_number = parse_page(query.page.as_deref()).map_err(WebError::from)?;
    let page = records::page(&state.db, &RecordFilter::default(), page_number, PAGE_SIZE)
        .await
        .map_err(WebError::from)?;

    state.metrics.inc_pages_served("record_list");
    Ok(Html(render_record_list(&page)))
}

/// An error rendered as a small HTML page instead of JSON.
pub struct HtmlError(WebError);

impl From<WebError> for HtmlError {
    fn from(err: WebError) -> Self {
        HtmlError(err)
    }
}

impl IntoResponse for HtmlError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        let body = format!(
            "<!DOCTYPE html>\n<html lang=\"en\"><head><title>{0}</title></head>\
             <body><h1>{0}</h1><p>{1}</p></body></html>\n",
            status,
            escape(&self.0.public_message()),
        );
        (status, Html(body)).into_response()
    }
}
