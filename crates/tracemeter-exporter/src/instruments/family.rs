//! Labelled metric family backed by atomics.
//!
//! One cell per distinct `LabelSet`, held in a `DashMap` and created at zero on
//! first use. A cell carries only the labels present on its events, so cells
//! of one family may differ in label count. Labels render in schema order.

use std::sync::Arc;

use dashmap::DashMap;
use prometheus::core::{Atomic, Collector, Desc, Number};
use prometheus::proto::{self, LabelPair, Metric, MetricFamily, MetricType};

use tracemeter_core::error::{Result, TraceMeterError};
use tracemeter_core::{LabelSchema, LabelSet};

struct Inner<P: Atomic> {
    desc: Desc,
    metric_type: MetricType,
    schema: LabelSchema,
    cells: DashMap<LabelSet, P>,
}

pub(crate) struct Family<P: Atomic> {
    inner: Arc<Inner<P>>,
}

impl<P: Atomic> Clone for Family<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: Atomic> Family<P> {
    pub(crate) fn new(
        name: &str,
        help: &str,
        schema: LabelSchema,
        metric_type: MetricType,
    ) -> Result<Self> {
        // Label names stay out of the descriptor: the registry pins a name to
        // its first label set even after unregister, and the schema already
        // bounds what cells may carry.
        let desc = Desc::new(name.to_string(), help.to_string(), vec![], Default::default())
        .map_err(|e| TraceMeterError::Registry(format!("bad descriptor for {name}: {e}")))?;

        Ok(Self {
            inner: Arc::new(Inner {
                desc,
                metric_type,
                schema,
                cells: DashMap::new(),
            }),
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.inner.desc.fq_name
    }

    /// Add `v` to the cell for `labels`, creating it at zero.
    pub(crate) fn add(&self, labels: LabelSet, v: P::T) {
        debug_assert!(
            self.inner.schema.admits(&labels),
            "undeclared label for {}",
            self.name()
        );
        let cell = self
            .inner
            .cells
            .entry(labels)
            .or_insert_with(|| P::new(<P::T as Number>::from_i64(0)));
        cell.inc_by(v);
    }

    /// Subtract `v` from the cell for `labels`, creating it at zero.
    pub(crate) fn sub(&self, labels: LabelSet, v: P::T) {
        debug_assert!(self.inner.schema.admits(&labels));
        let cell = self
            .inner
            .cells
            .entry(labels)
            .or_insert_with(|| P::new(<P::T as Number>::from_i64(0)));
        cell.dec_by(v);
    }

    pub(crate) fn get(&self, labels: &LabelSet) -> Option<P::T> {
        self.inner.cells.get(labels).map(|c| c.value().get())
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.cells.len()
    }

    fn metric(&self, labels: &LabelSet, value: f64) -> Metric {
        let mut m = Metric::default();
        for name in self.inner.schema.names() {
            if let Some(v) = labels.get(name) {
                let mut lp = LabelPair::default();
                lp.set_name(name.clone());
                lp.set_value(v.to_string());
                m.mut_label().push(lp);
            }
        }
        match self.inner.metric_type {
            MetricType::GAUGE => {
                let mut g = proto::Gauge::default();
                g.set_value(value);
                m.set_gauge(g);
            }
            _ => {
                let mut c = proto::Counter::default();
                c.set_value(value);
                m.set_counter(c);
            }
        }
        m
    }
}

impl<P: Atomic + 'static> Collector for Family<P> {
    fn desc(&self) -> Vec<&Desc> {
        vec![&self.inner.desc]
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let mut mf = MetricFamily::default();
        mf.set_name(self.inner.desc.fq_name.clone());
        mf.set_help(self.inner.desc.help.clone());
        mf.set_field_type(self.inner.metric_type);
        for cell in self.inner.cells.iter() {
            let value = cell.value().get().into_f64();
            mf.mut_metric().push(self.metric(cell.key(), value));
        }
        vec![mf]
    }
}
