//! Operational HTTP endpoints.
//!
//! - `/metrics` : Prometheus text format
//! - anything else : empty 200

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::registry::MetricRegistry;

pub async fn metrics(State(registry): State<MetricRegistry>) -> Response {
    match registry.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, registry.content_type())],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "metrics snapshot failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Empty body, default status, no content-type.
pub async fn empty() {}
