//! Top-level facade crate for tracemeter.
//!
//! Re-exports the core label types and the exporter so users can depend on a single crate.

pub mod core {
    pub use tracemeter_core::*;
}

pub mod exporter {
    pub use tracemeter_exporter::*;
}
