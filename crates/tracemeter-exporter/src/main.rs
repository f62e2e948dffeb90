//! tracemeter exporter binary.
//!
//! Loads `tracemeter.yaml` (or the path given as the first argument), starts
//! the exporter, creates the configured instruments, and serves until Ctrl-C.

use tracing_subscriber::{fmt, EnvFilter};

use tracemeter_core::error::{Result, TraceMeterError};
use tracemeter_exporter::{config, Exporter};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, code = e.kind().as_str(), "tracemeter-exporter failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "tracemeter.yaml".to_string());
    let cfg = config::load_from_file(&path)?;
    let instruments = cfg.instruments.clone();

    let exporter = Exporter::start(cfg).await?;
    match exporter.local_addr() {
        Some(addr) => tracing::info!(%addr, "tracemeter-exporter serving"),
        None => tracing::warn!("no exporter.port configured; nothing to serve"),
    }

    // Handles stay alive for the process lifetime; an embedding application
    // would pass them to its instrumentation layer.
    let _trace = instruments
        .trace
        .as_ref()
        .map(|t| exporter.create_trace_function(t.allowed_props.iter().cloned()))
        .transpose()?;
    let _memory = instruments
        .memory
        .as_ref()
        .map(|m| exporter.create_memory_function(m.allowed_props.iter().cloned()))
        .transpose()?;
    let _timer = instruments
        .timer
        .then(|| exporter.create_timer_function())
        .transpose()?;

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| TraceMeterError::Internal(format!("signal handler failed: {e}")))?;
    tracing::info!("shutting down");
    exporter.stop().await
}
