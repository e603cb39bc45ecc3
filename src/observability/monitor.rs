use super::MetricsCollector;

pub struct NodeMonitor {
    collector: MetricsCollector,
}

impl NodeMonitor {
    pub fn new(collector: MetricsCollector) -> Self {
        Self { collector }
    }

    pub fn generate_report(&self) -> String {
        let snapshot = self.collector.snapshot();

        if snapshot.is_empty() {
            return "No nodes registered".to_string();
        }

        let mut ids: Vec<&String> = snapshot.keys().collect();
        ids.sort();

        let mut report = String::from("=== Function Node Metrics ===\n");

        for node_id in ids {
            let m = &snapshot[node_id];
            report.push_str(&format!(
                "\n[{}]\n  Inputs: {} received, {} unchanged\n  Calls: {} ({})\n  Outputs: {} emitted, {} unchanged\n  Avg Call: {}μs\n",
                node_id,
                m.inputs_received,
                m.inputs_skipped,
                m.calls,
                if m.call_errors > 0 {
                    format!("{} error{}", m.call_errors, if m.call_errors == 1 { "" } else { "s" })
                } else {
                    "0 errors".to_string()
                },
                m.outputs_emitted,
                m.outputs_suppressed,
                m.avg_call_us
            ));
        }

        report
    }

    pub fn collector(&self) -> &MetricsCollector {
        &self.collector
    }
}
