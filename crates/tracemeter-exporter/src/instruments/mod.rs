//! Instrument handles.
//!
//! Each handle is cheap to clone and is handed to the instrumentation layer
//! directly; there is no ambient "current trace function".
//!
//! - `TraceFunction`  : `trace_counter`, +1 per traced call
//! - `MemoryFunction` : `memory_instance_lifetime_gauge`, +1 alloc / -1 dispose
//! - `TimerFunction`  : `timer_counter`, accumulated milliseconds per name

mod family;
pub mod lifetime;
pub mod timer;
pub mod trace;

pub use lifetime::{LifetimeKind, MemoryFunction, MEMORY_INSTANCE_LIFETIME_GAUGE};
pub use timer::{TimerFunction, TimerGuard, TIMER_COUNTER};
pub use trace::{TraceFunction, TRACE_COUNTER};

/// Every metric name an exporter may create, for teardown.
pub const INSTRUMENT_NAMES: [&str; 3] = [
    TRACE_COUNTER,
    MEMORY_INSTANCE_LIFETIME_GAUGE,
    TIMER_COUNTER,
];
