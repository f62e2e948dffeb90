//! Registry adapter over `prometheus::Registry`.
//!
//! The underlying registry owns collectors, rejects duplicate names, and
//! encodes the text exposition format. This adapter adds a registration
//! sequence per metric family so the snapshot lists instruments in the order
//! they were registered; families registered behind its back (a shared
//! registry) follow in name order. A registered family with no samples yet
//! still renders its `# HELP`/`# TYPE` header.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use prometheus::core::Collector;
use prometheus::proto::{MetricFamily, MetricType};
use prometheus::{Encoder, Registry, TextEncoder};

use tracemeter_core::error::{Result, TraceMeterError};

/// What the adapter remembers about one registered family.
struct Entry {
    seq: u64,
    help: String,
    metric_type: MetricType,
}

#[derive(Clone)]
pub struct MetricRegistry {
    inner: Registry,
    order: Arc<DashMap<String, Entry>>,
    seq: Arc<AtomicU64>,
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Registry> for MetricRegistry {
    fn from(inner: Registry) -> Self {
        Self {
            inner,
            order: Arc::new(DashMap::new()),
            seq: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl MetricRegistry {
    /// Fresh, empty registry.
    pub fn new() -> Self {
        Self::from(Registry::new())
    }

    /// The wrapped registry, for callers registering their own collectors.
    pub fn inner(&self) -> &Registry {
        &self.inner
    }

    /// Register a collector. A name already present is a hard failure.
    pub fn register(&self, collector: Box<dyn Collector>) -> Result<()> {
        let names: Vec<String> = collector
            .desc()
            .iter()
            .map(|d| d.fq_name.clone())
            .collect();

        if let Some(dup) = names.iter().find(|n| self.order.contains_key(n.as_str())) {
            return Err(TraceMeterError::DuplicateMetric(dup.clone()));
        }

        // Headers for families that may have no samples at render time.
        let headers: Vec<(String, String, MetricType)> = collector
            .collect()
            .into_iter()
            .map(|mf| (mf.get_name().to_string(), mf.get_help().to_string(), mf.get_field_type()))
            .collect();

        self.inner.register(collector).map_err(|e| match e {
            prometheus::Error::AlreadyReg => TraceMeterError::DuplicateMetric(names.join(",")),
            prometheus::Error::Msg(m) if m.contains("same fully-qualified name") => {
                TraceMeterError::DuplicateMetric(names.join(","))
            }
            other => TraceMeterError::Registry(other.to_string()),
        })?;

        for name in names {
            let seq = self.seq.fetch_add(1, Ordering::Relaxed);
            let (help, metric_type) = headers
                .iter()
                .find(|(n, _, _)| *n == name)
                .map(|(_, h, t)| (h.clone(), *t))
                .unwrap_or((String::new(), MetricType::UNTYPED));
            self.order.insert(
                name,
                Entry {
                    seq,
                    help,
                    metric_type,
                },
            );
        }
        Ok(())
    }

    /// Remove a collector. Returns `false` when it was not registered.
    pub fn unregister(&self, collector: Box<dyn Collector>) -> bool {
        let names: Vec<String> = collector
            .desc()
            .iter()
            .map(|d| d.fq_name.clone())
            .collect();

        match self.inner.unregister(collector) {
            Ok(()) => {
                for name in &names {
                    self.order.remove(name);
                }
                true
            }
            Err(e) => {
                tracing::debug!(metrics = ?names, error = %e, "unregister skipped: not registered");
                false
            }
        }
    }

    /// Whether a family with this name was registered through the adapter.
    pub fn contains(&self, name: &str) -> bool {
        self.order.contains_key(name)
    }

    /// Register the standard process metrics (CPU, memory, fds, start time).
    /// Process statistics are only available on Linux; elsewhere this is a no-op.
    pub fn collect_defaults(&self) -> Result<()> {
        #[cfg(target_os = "linux")]
        self.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;
        Ok(())
    }

    /// Remove the collectors added by `collect_defaults`.
    pub fn remove_defaults(&self) -> bool {
        #[cfg(target_os = "linux")]
        return self.unregister(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ));
        #[cfg(not(target_os = "linux"))]
        false
    }

    /// Content type of `render()` output.
    pub fn content_type(&self) -> &'static str {
        prometheus::TEXT_FORMAT
    }

    /// Point-in-time snapshot in the text exposition format.
    ///
    /// Each cell is read atomically; cells are not read under one global lock.
    pub fn render(&self) -> Result<String> {
        let gathered = self.inner.gather();

        // Registered-but-empty families are pruned by `gather`; put their
        // headers back at their registration slot.
        let mut sections: Vec<(u64, Section)> = Vec::new();
        for entry in self.order.iter() {
            if !gathered.iter().any(|mf| mf.get_name() == entry.key().as_str()) {
                sections.push((entry.value().seq, Section::Header(entry.key().clone())));
            }
        }
        for mf in gathered {
            let seq = self
                .order
                .get(mf.get_name())
                .map(|e| e.value().seq)
                .unwrap_or(u64::MAX);
            sections.push((seq, Section::Family(Box::new(mf))));
        }
        // Stable: unordered families keep gather's name order.
        sections.sort_by_key(|(seq, _)| *seq);

        let encoder = TextEncoder::new();
        let mut buf = Vec::new();
        for (_, section) in sections {
            match section {
                Section::Family(mf) => encoder
                    .encode(std::slice::from_ref(&*mf), &mut buf)
                    .map_err(|e| TraceMeterError::Registry(format!("encode failed: {e}")))?,
                Section::Header(name) => {
                    if let Some(entry) = self.order.get(&name) {
                        buf.extend_from_slice(header(&name, entry.value()).as_bytes());
                    }
                }
            }
        }
        String::from_utf8(buf)
            .map_err(|e| TraceMeterError::Registry(format!("non-utf8 exposition: {e}")))
    }
}

enum Section {
    Family(Box<MetricFamily>),
    Header(String),
}

fn header(name: &str, entry: &Entry) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# HELP {} {}", name, escape_help(&entry.help));
    let _ = writeln!(out, "# TYPE {} {}", name, type_name(entry.metric_type));
    out
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

fn type_name(t: MetricType) -> &'static str {
    match t {
        MetricType::COUNTER => "counter",
        MetricType::GAUGE => "gauge",
        MetricType::HISTOGRAM => "histogram",
        MetricType::SUMMARY => "summary",
        MetricType::UNTYPED => "untyped",
    }
}
