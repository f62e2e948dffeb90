//! Exporter lifecycle.
//!
//! An `Exporter` owns one registry reference (its own, or one handed in via
//! `ExporterBuilder::registry`) and routes every instrument registration and
//! removal through it. States:
//!
//! - `Stopped`   : no listener; `metrics()` and `router()` still work
//! - `Listening` : `axum::serve` task bound to the configured port
//!
//! Dropping an `Exporter` without `stop()` closes the listener in the
//! background but does not wait for it.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use axum::Router;
use dashmap::DashMap;
use prometheus::core::Collector;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use tracemeter_core::error::{Result, TraceMeterError};
use tracemeter_core::AllowedProps;

use crate::config::ExporterConfig;
use crate::instruments::{
    MemoryFunction, TimerFunction, TraceFunction, INSTRUMENT_NAMES,
    MEMORY_INSTANCE_LIFETIME_GAUGE, TIMER_COUNTER, TRACE_COUNTER,
};
use crate::registry::MetricRegistry;
use crate::router;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Stopped,
    Listening,
}

/// Construction options that are runtime handles rather than config.
pub struct ExporterBuilder {
    config: ExporterConfig,
    registry: Option<MetricRegistry>,
    external_server: bool,
}

impl ExporterBuilder {
    pub fn new(config: ExporterConfig) -> Self {
        Self {
            config,
            registry: None,
            external_server: false,
        }
    }

    /// Use a caller-owned registry instead of a fresh one.
    pub fn registry(mut self, registry: MetricRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// The caller serves `Exporter::router()` itself; no port is bound.
    pub fn external_server(mut self) -> Self {
        self.external_server = true;
        self
    }

    pub async fn start(self) -> Result<Exporter> {
        self.config.validate()?;
        let registry = self.registry.unwrap_or_default();

        let defaults = self.config.exporter.collect_defaults;
        if defaults {
            registry.collect_defaults()?;
        }

        let listen = match self.config.exporter.listen_addr()? {
            Some(addr) if !self.external_server => Some(addr),
            _ => None,
        };

        let server = match listen {
            Some(addr) => match Listener::bind(addr, registry.clone()).await {
                Ok(l) => Some(l),
                Err(e) => {
                    if defaults {
                        registry.remove_defaults();
                    }
                    return Err(e);
                }
            },
            None => None,
        };

        Ok(Exporter {
            registry,
            created: DashMap::new(),
            defaults: AtomicBool::new(defaults),
            server: Mutex::new(server),
        })
    }
}

struct Listener {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl Listener {
    async fn bind(addr: SocketAddr, registry: MetricRegistry) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| TraceMeterError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        let addr = listener
            .local_addr()
            .map_err(|e| TraceMeterError::Internal(format!("local_addr failed: {e}")))?;

        let app = router::build_router(registry);
        let (shutdown, rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let signal = async {
                let _ = rx.await;
            };
            if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(signal).await {
                tracing::warn!(%addr, error = %e, "metrics listener failed");
            }
        });

        tracing::info!(%addr, path = router::METRICS_PATH, "metrics listener started");
        Ok(Self {
            addr,
            shutdown,
            task,
        })
    }
}

pub struct Exporter {
    registry: MetricRegistry,
    created: DashMap<&'static str, Box<dyn Collector>>,
    defaults: AtomicBool,
    server: Mutex<Option<Listener>>,
}

impl Exporter {
    pub fn builder(config: ExporterConfig) -> ExporterBuilder {
        ExporterBuilder::new(config)
    }

    /// Start with a fresh registry.
    pub async fn start(config: ExporterConfig) -> Result<Self> {
        ExporterBuilder::new(config).start().await
    }

    pub fn create_trace_function<I, S>(&self, allowed_props: I) -> Result<TraceFunction>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let f = TraceFunction::new(AllowedProps::new(allowed_props)?)?;
        self.adopt(TRACE_COUNTER, f.collector(), f.collector())?;
        Ok(f)
    }

    pub fn create_memory_function<I, S>(&self, allowed_props: I) -> Result<MemoryFunction>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let f = MemoryFunction::new(AllowedProps::new(allowed_props)?)?;
        self.adopt(MEMORY_INSTANCE_LIFETIME_GAUGE, f.collector(), f.collector())?;
        Ok(f)
    }

    pub fn create_timer_function(&self) -> Result<TimerFunction> {
        let f = TimerFunction::new()?;
        self.adopt(TIMER_COUNTER, f.collector(), f.collector())?;
        Ok(f)
    }

    // Register one copy, keep the other for removal on stop.
    fn adopt(
        &self,
        name: &'static str,
        collector: Box<dyn Collector>,
        keep: Box<dyn Collector>,
    ) -> Result<()> {
        self.registry.register(collector)?;
        self.created.insert(name, keep);
        tracing::info!(metric = name, "instrument registered");
        Ok(())
    }

    /// Current snapshot, without going through HTTP.
    pub fn metrics(&self) -> Result<String> {
        self.registry.render()
    }

    pub fn content_type(&self) -> &'static str {
        self.registry.content_type()
    }

    /// Router for an externally owned server.
    pub fn router(&self) -> Router {
        router::build_router(self.registry.clone())
    }

    pub fn registry(&self) -> &MetricRegistry {
        &self.registry
    }

    pub fn state(&self) -> ServerState {
        if self.lock_server().is_some() {
            ServerState::Listening
        } else {
            ServerState::Stopped
        }
    }

    /// Bound address while listening.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.lock_server().as_ref().map(|l| l.addr)
    }

    fn lock_server(&self) -> std::sync::MutexGuard<'_, Option<Listener>> {
        self.server.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deregister this exporter's instruments and close the listener.
    ///
    /// Idempotent. Returns once the listener has released its port. Metrics
    /// registered on a shared registry by others are left alone.
    pub async fn stop(&self) -> Result<()> {
        for name in INSTRUMENT_NAMES {
            if let Some((_, collector)) = self.created.remove(name) {
                self.registry.unregister(collector);
            }
        }
        if self.defaults.swap(false, Ordering::SeqCst) {
            self.registry.remove_defaults();
        }

        let listener = self.lock_server().take();
        if let Some(l) = listener {
            let _ = l.shutdown.send(());
            l.task
                .await
                .map_err(|e| TraceMeterError::Internal(format!("listener task failed: {e}")))?;
            tracing::info!(addr = %l.addr, "metrics listener stopped");
        }
        Ok(())
    }
}
