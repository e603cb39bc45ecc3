use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Settings for running function nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Capacity of each node's input and output channel
    pub channel_capacity: usize,
    /// How long `NodeRunner::wait` waits for a stream to finish
    pub stop_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 16,
            stop_timeout_ms: 1000,
        }
    }
}

impl EngineConfig {
    /// Read the `engine_config` block of a JSON document; missing keys keep
    /// their defaults
    pub fn from_json(config: &Value) -> Result<Self> {
        let config: Self = match config.get("engine_config") {
            Some(block) => serde_json::from_value(block.clone())
                .context("Failed to parse engine_config")?,
            None => Self::default(),
        };
        config.validated()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .context(format!("Failed to read engine config from {:?}", path))?;
        let value: Value = serde_json::from_str(&json)
            .context(format!("Failed to parse engine config at {:?}", path))?;
        Self::from_json(&value)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }

    fn validated(self) -> Result<Self> {
        // tokio::sync::mpsc panics on a zero capacity
        if self.channel_capacity == 0 {
            anyhow::bail!("channel_capacity must be at least 1");
        }
        Ok(self)
    }
}
