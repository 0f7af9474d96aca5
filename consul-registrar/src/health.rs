//! Liveness endpoint polled by the registry. Reports process liveness only.

use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::descriptor::HEALTH_CHECK_PATH;
use crate::error::HealthError;

pub fn router() -> Router {
    Router::new()
        .route(HEALTH_CHECK_PATH, any(health))
        .fallback(not_found)
}

// `get` would also answer HEAD with a 200, so the method is checked by hand.
async fn health(method: Method) -> Response {
    if method == Method::GET {
        (StatusCode::OK, "OK").into_response()
    } else {
        StatusCode::METHOD_NOT_ALLOWED.into_response()
    }
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

pub async fn bind(addr: &str) -> Result<TcpListener, HealthError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| HealthError::Bind {
            addr: addr.to_string(),
            source,
        })
}

/// Serves the health router on `listener` until `shutdown` is cancelled.
pub async fn serve(listener: TcpListener, shutdown: CancellationToken) -> Result<(), HealthError> {
    match listener.local_addr() {
        Ok(addr) => info!(%addr, "health endpoint listening"),
        Err(e) => info!(error = %e, "health endpoint listening on unknown address"),
    }

    axum::serve(listener, router())
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(HealthError::Serve)?;

    info!("health endpoint stopped");
    Ok(())
}
