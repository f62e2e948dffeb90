use std::sync::Arc;

use prometheus::core::{AtomicI64, Collector};
use prometheus::proto::MetricType;

use tracemeter_core::error::Result;
use tracemeter_core::labels::build_lifetime_labels;
use tracemeter_core::{AllowedProps, LabelSchema, LabelSet, ObjectRef};

use super::family::Family;

pub const MEMORY_INSTANCE_LIFETIME_GAUGE: &str = "memory_instance_lifetime_gauge";
const HELP: &str = "Counts live instances of traced objects";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifetimeKind {
    Alloc,
    Dispose,
}

/// Live-instance gauge keyed by object and parent identity.
///
/// Alloc/dispose pairing is the caller's business: an unmatched dispose
/// drives the cell negative, which is reported as-is.
#[derive(Clone)]
pub struct MemoryFunction {
    family: Family<AtomicI64>,
    allowed: Arc<AllowedProps>,
}

impl MemoryFunction {
    pub(crate) fn new(allowed: AllowedProps) -> Result<Self> {
        let schema = LabelSchema::lifetime(&allowed);
        let family = Family::new(
            MEMORY_INSTANCE_LIFETIME_GAUGE,
            HELP,
            schema,
            MetricType::GAUGE,
        )?;
        Ok(Self {
            family,
            allowed: Arc::new(allowed),
        })
    }

    pub(crate) fn collector(&self) -> Box<dyn Collector> {
        Box::new(self.family.clone())
    }

    pub fn record(&self, kind: LifetimeKind, object: &ObjectRef, parent: Option<&ObjectRef>) {
        let labels = build_lifetime_labels(object, parent, &self.allowed);
        match kind {
            LifetimeKind::Alloc => self.family.add(labels, 1),
            LifetimeKind::Dispose => self.family.sub(labels, 1),
        }
    }

    pub fn alloc(&self, object: &ObjectRef, parent: Option<&ObjectRef>) {
        self.record(LifetimeKind::Alloc, object, parent);
    }

    pub fn dispose(&self, object: &ObjectRef, parent: Option<&ObjectRef>) {
        self.record(LifetimeKind::Dispose, object, parent);
    }

    /// Current value for one identity; `None` if never touched.
    pub fn live(&self, object: &ObjectRef, parent: Option<&ObjectRef>) -> Option<i64> {
        self.family
            .get(&build_lifetime_labels(object, parent, &self.allowed))
    }

    pub fn value(&self, labels: &LabelSet) -> Option<i64> {
        self.family.get(labels)
    }

    pub fn allowed_props(&self) -> &AllowedProps {
        &self.allowed
    }
}
