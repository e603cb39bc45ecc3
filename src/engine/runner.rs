use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use crate::core::{Func, Info, Init};
use crate::engine::config::EngineConfig;
use crate::engine::state::NodeState;
use crate::funcs::Catalog;
use crate::observability::FuncMetrics;
use crate::types::Value;

/// The host's ends of a running node's channels
pub struct NodeIo {
    /// Send input records here; drop it to signal that no more will come
    pub input: mpsc::Sender<Value>,
    /// Values the node emits; yields `None` once the node stops
    pub output: mpsc::Receiver<Value>,
}

/// Drives one function node through its lifecycle on behalf of a host
pub struct NodeRunner {
    node_id: String,
    node: Option<Box<dyn Func>>,
    running: Option<Arc<dyn Func>>,
    handle: Option<JoinHandle<Result<()>>>,
    config: EngineConfig,
    state: NodeState,
}

impl NodeRunner {
    pub fn new(node_id: impl Into<String>, node: Box<dyn Func>, config: EngineConfig) -> Self {
        Self {
            node_id: node_id.into(),
            node: Some(node),
            running: None,
            handle: None,
            config,
            state: NodeState::Unvalidated,
        }
    }

    /// Instantiate the catalog entry `name` as node `node_id`
    pub fn from_catalog(
        catalog: &Catalog,
        name: &str,
        node_id: impl Into<String>,
        config: EngineConfig,
    ) -> Result<Self> {
        let node = catalog.create(name)?;
        Ok(Self::new(node_id, node, config))
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Get current node state
    pub fn state(&self) -> &NodeState {
        &self.state
    }

    /// Transition to a new state with validation
    pub fn transition_to(&mut self, new_state: NodeState) -> Result<()> {
        if !self.state.can_transition_to(&new_state) {
            return Err(anyhow!(
                "Invalid state transition for {}: {} -> {}",
                self.node_id,
                self.state.name(),
                new_state.name()
            ));
        }
        log::trace!("node {}: {} -> {}", self.node_id, self.state.name(), new_state.name());
        self.state = new_state;
        Ok(())
    }

    fn func(&self) -> Option<&dyn Func> {
        match (&self.node, &self.running) {
            (Some(node), _) => Some(&**node),
            (None, Some(running)) => Some(&**running),
            (None, None) => None,
        }
    }

    pub fn info(&self) -> Option<Info> {
        self.func().map(|f| f.info())
    }

    pub fn metrics(&self) -> Option<Arc<FuncMetrics>> {
        self.func().and_then(|f| f.metrics())
    }

    /// Check the node; it stays `Unvalidated` if the check fails
    pub fn validate(&mut self) -> Result<()> {
        let node = self
            .node
            .as_ref()
            .ok_or_else(|| anyhow!("node {} was already started", self.node_id))?;
        node.validate()
            .with_context(|| format!("node {} failed validation", self.node_id))?;
        self.transition_to(NodeState::Validated)
    }

    /// Initialize the node and spawn its stream on a new task
    pub async fn start(&mut self) -> Result<NodeIo> {
        if self.state != NodeState::Validated {
            return Err(anyhow!(
                "node {} must be validated before start, it is {}",
                self.node_id,
                self.state.name()
            ));
        }
        let mut node = self
            .node
            .take()
            .ok_or_else(|| anyhow!("node {} was already started", self.node_id))?;

        let capacity = self.config.channel_capacity;
        let (input_tx, input_rx) = mpsc::channel(capacity);
        let (output_tx, output_rx) = mpsc::channel(capacity);

        let init = Init {
            input: input_rx,
            output: output_tx,
        };
        if let Err(e) = node.init(init).await {
            self.transition_to(NodeState::Errored {
                error_msg: format!("{:#}", e),
            })?;
            return Err(e.context(format!("node {} failed to initialize", self.node_id)));
        }
        self.transition_to(NodeState::Initialized)?;

        let running: Arc<dyn Func> = Arc::from(node);
        let stream_node = running.clone();
        let node_id = self.node_id.clone();
        let handle = tokio::spawn(async move {
            let result = stream_node.stream().await;
            match &result {
                Ok(()) => log::debug!("node {} stream finished", node_id),
                Err(e) => log::error!("node {} stream failed: {:#}", node_id, e),
            }
            result
        });

        self.running = Some(running);
        self.handle = Some(handle);
        self.transition_to(NodeState::Streaming)?;

        Ok(NodeIo {
            input: input_tx,
            output: output_rx,
        })
    }

    /// Raise the node's cancellation signal without waiting for it
    pub fn close(&self) -> Result<()> {
        let running = self
            .running
            .as_ref()
            .ok_or_else(|| anyhow!("node {} is not streaming", self.node_id))?;
        running.close()
    }

    /// Wait for the stream task to end and record how it ended
    pub async fn wait(&mut self) -> Result<()> {
        let mut handle = self
            .handle
            .take()
            .ok_or_else(|| anyhow!("node {} has no running stream", self.node_id))?;

        let joined = match tokio::time::timeout(self.config.stop_timeout(), &mut handle).await {
            Ok(joined) => joined,
            Err(_) => {
                handle.abort();
                let msg = format!("stream did not stop within {}ms", self.config.stop_timeout_ms);
                self.transition_to(NodeState::Errored { error_msg: msg.clone() })?;
                return Err(anyhow!("node {}: {}", self.node_id, msg));
            }
        };

        match joined.map_err(anyhow::Error::from).and_then(|r| r) {
            Ok(()) => self.transition_to(NodeState::Closed),
            Err(e) => {
                self.transition_to(NodeState::Errored {
                    error_msg: format!("{:#}", e),
                })?;
                Err(e)
            }
        }
    }

    /// Close the node and wait for its stream to end
    pub async fn stop(&mut self) -> Result<()> {
        self.close()?;
        self.wait().await
    }
}
