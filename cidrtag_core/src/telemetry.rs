//! Callback-backed `metrics` recorder.
//!
//! Tree operations emit `counter!`/`gauge!` events under the names in
//! [`crate::constants`]. Nothing is recorded until a host registers a
//! name/value callback; that first registration installs the recorder.

use metrics::{Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Signature for external collectors.
pub type StatsCallback = fn(name: &str, value: u64);

static CALLBACK: OnceCell<StatsCallback> = OnceCell::new();

/// Register the process-wide collector. Only the first registration sticks;
/// returns false if one was already present.
pub fn register_stats_callback(cb: StatsCallback) -> bool {
    let fresh = CALLBACK.set(cb).is_ok();
    init();
    fresh
}

#[inline]
fn emit(key: &Key, value: u64) {
    if let Some(cb) = CALLBACK.get() {
        cb(key.name(), value);
    }
}

/// Forwarding recorder. Uses the callback **if** it was registered.
struct CallbackRecorder;

#[derive(Clone)]
struct CallbackCounter {
    key: Key,
}
#[derive(Clone)]
struct CallbackGauge {
    key: Key,
}
#[derive(Clone)]
struct CallbackHistogram {
    key: Key,
}

impl Recorder for CallbackRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        Counter::from_arc(Arc::new(CallbackCounter { key: key.clone() }))
    }
    fn register_gauge(&self, key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::from_arc(Arc::new(CallbackGauge { key: key.clone() }))
    }
    fn register_histogram(&self, key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::from_arc(Arc::new(CallbackHistogram { key: key.clone() }))
    }
}

impl metrics::CounterFn for CallbackCounter {
    fn increment(&self, value: u64) {
        emit(&self.key, value);
    }
    fn absolute(&self, value: u64) {
        emit(&self.key, value);
    }
}

impl metrics::GaugeFn for CallbackGauge {
    fn set(&self, value: f64) {
        emit(&self.key, value as u64);
    }
    fn increment(&self, value: f64) {
        emit(&self.key, value as u64);
    }
    fn decrement(&self, value: f64) {
        emit(&self.key, value as u64);
    }
}

impl metrics::HistogramFn for CallbackHistogram {
    fn record(&self, value: f64) {
        emit(&self.key, value as u64);
    }
}

/// Install exactly **once**.
pub fn init() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        if metrics::set_global_recorder(CallbackRecorder).is_err() {
            log::warn!("[TELEMETRY] A metrics recorder was already installed; callback unused.");
        }
    });
}
