use std::time::Instant;

use prometheus::core::{AtomicF64, Collector};
use prometheus::proto::MetricType;

use tracemeter_core::error::Result;
use tracemeter_core::labels::NAME;
use tracemeter_core::{LabelSchema, LabelSet};

use super::family::Family;

pub const TIMER_COUNTER: &str = "timer_counter";
const HELP: &str = "Accumulates milliseconds spent in named operations";

/// Duration counter: each cell is the total milliseconds recorded for a name.
#[derive(Clone)]
pub struct TimerFunction {
    family: Family<AtomicF64>,
}

impl TimerFunction {
    pub(crate) fn new() -> Result<Self> {
        let family = Family::new(TIMER_COUNTER, HELP, LabelSchema::timer(), MetricType::COUNTER)?;
        Ok(Self { family })
    }

    pub(crate) fn collector(&self) -> Box<dyn Collector> {
        Box::new(self.family.clone())
    }

    /// Add `elapsed_ms` to `name`. Negative input is not checked.
    pub fn record(&self, name: &str, elapsed_ms: f64) {
        self.family.add(labels(name), elapsed_ms);
    }

    /// Start timing `name`; the elapsed time is recorded once, on `stop` or drop.
    pub fn start(&self, name: impl Into<String>) -> TimerGuard {
        TimerGuard {
            timer: self.clone(),
            name: name.into(),
            started: Instant::now(),
            done: false,
        }
    }

    /// Total milliseconds recorded for `name`.
    pub fn total_ms(&self, name: &str) -> Option<f64> {
        self.family.get(&labels(name))
    }
}

fn labels(name: &str) -> LabelSet {
    [(NAME, name)].into_iter().collect()
}

/// Pending measurement from `TimerFunction::start`.
pub struct TimerGuard {
    timer: TimerFunction,
    name: String,
    started: Instant,
    done: bool,
}

impl TimerGuard {
    /// Record now and return the elapsed milliseconds.
    pub fn stop(mut self) -> f64 {
        self.finish()
    }

    fn finish(&mut self) -> f64 {
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        if !self.done {
            self.done = true;
            self.timer.record(&self.name, elapsed_ms);
        }
        elapsed_ms
    }
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        if !self.done {
            self.finish();
        }
    }
}
