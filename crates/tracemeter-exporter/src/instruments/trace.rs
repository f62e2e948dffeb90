use std::sync::Arc;

use prometheus::core::{AtomicU64, Collector};
use prometheus::proto::MetricType;

use tracemeter_core::error::Result;
use tracemeter_core::labels::build_trace_labels;
use tracemeter_core::{AllowedProps, LabelSchema, LabelSet, TraceEvent};

use super::family::Family;

pub const TRACE_COUNTER: &str = "trace_counter";
const HELP: &str = "Counts how many times a function has been traced";

/// Counts traced calls, one cell per label combination.
#[derive(Clone)]
pub struct TraceFunction {
    family: Family<AtomicU64>,
    allowed: Arc<AllowedProps>,
}

impl TraceFunction {
    pub(crate) fn new(allowed: AllowedProps) -> Result<Self> {
        let schema = LabelSchema::trace(&allowed);
        let family = Family::new(TRACE_COUNTER, HELP, schema, MetricType::COUNTER)?;
        Ok(Self {
            family,
            allowed: Arc::new(allowed),
        })
    }

    pub(crate) fn collector(&self) -> Box<dyn Collector> {
        Box::new(self.family.clone())
    }

    /// Record one call.
    pub fn trace(&self, event: &TraceEvent) {
        let labels = build_trace_labels(event, &self.allowed);
        self.family.add(labels, 1);
    }

    /// Current count for an exact label combination.
    pub fn count(&self, labels: &LabelSet) -> Option<u64> {
        self.family.get(labels)
    }

    /// Number of distinct label combinations seen.
    pub fn cardinality(&self) -> usize {
        self.family.len()
    }

    pub fn allowed_props(&self) -> &AllowedProps {
        &self.allowed
    }
}
