//! Axum router wiring.
//!
//! `GET /metrics` renders the registry; every other path or method gets the
//! empty handler.

use axum::{routing::get, Router};

use crate::{ops, registry::MetricRegistry};

pub const METRICS_PATH: &str = "/metrics";

pub fn build_router(registry: MetricRegistry) -> Router {
    Router::new()
        .route(METRICS_PATH, get(ops::metrics).fallback(ops::empty))
        .fallback(ops::empty)
        .with_state(registry)
}
