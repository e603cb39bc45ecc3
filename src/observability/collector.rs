use std::collections::HashMap;
use std::sync::Arc;
use super::FuncMetrics;

#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub node_id: String,
    pub inputs_received: u64,
    pub inputs_skipped: u64,
    pub calls: u64,
    pub call_errors: u64,
    pub outputs_emitted: u64,
    pub outputs_suppressed: u64,
    pub avg_call_us: u64,
}

#[derive(Clone, Default)]
pub struct MetricsCollector {
    metrics: HashMap<String, Arc<FuncMetrics>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, node_id: impl Into<String>, metrics: Arc<FuncMetrics>) {
        self.metrics.insert(node_id.into(), metrics);
    }

    pub fn snapshot(&self) -> HashMap<String, MetricsSnapshot> {
        self.metrics
            .iter()
            .map(|(id, metrics)| {
                (
                    id.clone(),
                    MetricsSnapshot {
                        node_id: metrics.node_id().to_string(),
                        inputs_received: metrics.inputs_received(),
                        inputs_skipped: metrics.inputs_skipped(),
                        calls: metrics.calls(),
                        call_errors: metrics.call_errors(),
                        outputs_emitted: metrics.outputs_emitted(),
                        outputs_suppressed: metrics.outputs_suppressed(),
                        avg_call_us: metrics.avg_call_us(),
                    },
                )
            })
            .collect()
    }

    pub fn get_node_metrics(&self, node_id: &str) -> Option<Arc<FuncMetrics>> {
        self.metrics.get(node_id).cloned()
    }
}
