pub mod metrics;
pub mod collector;
pub mod monitor;

pub use metrics::FuncMetrics;
pub use collector::{MetricsCollector, MetricsSnapshot};
pub use monitor::NodeMonitor;
