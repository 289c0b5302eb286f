//! HTTP interface for temperature records: the public record list and the
//! admin endpoints.

pub mod error;
pub mod response;
pub mod routes;
pub mod state;
pub mod templates;

pub use routes::routes;
pub use state::AppState;

use tracing::info;

/// Bind `addr` and serve the application until the process stops.
pub async fn serve(addr: &str, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, routes(state)).await?;
    Ok(())
}
