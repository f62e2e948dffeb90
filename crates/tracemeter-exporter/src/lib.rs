//! tracemeter exporter library entry.
//!
//! Wires the registry adapter, the trace/lifetime/timer instruments, and the
//! `/metrics` HTTP endpoint into an `Exporter`. Consumed by the binary
//! (`main.rs`), by embedding applications, and by integration tests.

pub mod config;
pub mod exporter;
pub mod instruments;
pub mod ops;
pub mod registry;
pub mod router;

pub use exporter::{Exporter, ExporterBuilder, ServerState};
pub use instruments::{LifetimeKind, MemoryFunction, TimerFunction, TimerGuard, TraceFunction};
pub use registry::MetricRegistry;
