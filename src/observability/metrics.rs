use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Counters for one function node. Written by the node's stream task,
/// readable from anywhere.
pub struct FuncMetrics {
    node_id: String,
    inputs_received: AtomicU64,
    inputs_skipped: AtomicU64,
    calls: AtomicU64,
    call_errors: AtomicU64,
    outputs_emitted: AtomicU64,
    outputs_suppressed: AtomicU64,
    total_call_us: AtomicU64,
}

impl FuncMetrics {
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            inputs_received: AtomicU64::new(0),
            inputs_skipped: AtomicU64::new(0),
            calls: AtomicU64::new(0),
            call_errors: AtomicU64::new(0),
            outputs_emitted: AtomicU64::new(0),
            outputs_suppressed: AtomicU64::new(0),
            total_call_us: AtomicU64::new(0),
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn inputs_received(&self) -> u64 {
        self.inputs_received.load(Ordering::Relaxed)
    }

    pub fn inputs_skipped(&self) -> u64 {
        self.inputs_skipped.load(Ordering::Relaxed)
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    pub fn call_errors(&self) -> u64 {
        self.call_errors.load(Ordering::Relaxed)
    }

    pub fn outputs_emitted(&self) -> u64 {
        self.outputs_emitted.load(Ordering::Relaxed)
    }

    pub fn outputs_suppressed(&self) -> u64 {
        self.outputs_suppressed.load(Ordering::Relaxed)
    }

    pub fn record_input(&self) {
        self.inputs_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_input_skipped(&self) {
        self.inputs_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_call_error(&self) {
        self.call_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_output(&self) {
        self.outputs_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_output_suppressed(&self) {
        self.outputs_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn start_call(&self) -> Instant {
        Instant::now()
    }

    /// Counts the call and its latency, whether or not it succeeded
    pub fn finish_call(&self, start: Instant) {
        let latency_us = start.elapsed().as_micros() as u64;
        self.total_call_us.fetch_add(latency_us, Ordering::Relaxed);
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn avg_call_us(&self) -> u64 {
        let calls = self.calls.load(Ordering::Relaxed);
        if calls == 0 {
            return 0;
        }
        self.total_call_us.load(Ordering::Relaxed) / calls
    }
}
