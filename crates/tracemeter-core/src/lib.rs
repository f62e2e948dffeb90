//! tracemeter core: event records, label sanitizing, and label-set building.
//!
//! This crate turns a call-site event into a bounded set of metric labels. It
//! carries no runtime, transport, or registry dependency so the builder can be
//! used by any exporter that speaks the Prometheus label rules.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Every fallible path
//! surfaces as `TraceMeterError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod event;
pub mod labels;

/// Shared result type.
pub use error::{ErrorKind, Result, TraceMeterError};
pub use event::{CallerRef, ObjectRef, PropValue, Props, TraceEvent};
pub use labels::{AllowedProps, LabelSchema, LabelSet};
