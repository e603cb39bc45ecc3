use crate::observability::FuncMetrics;
use crate::types::{FuncType, Value};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FuncError {
    /// The node was never bound to a function
    #[error("type is still unspecified")]
    Unspecified,

    #[error("function was not initialized")]
    NotInitialized,

    #[error("function is already streaming")]
    AlreadyStreaming,

    #[error("function was already closed")]
    AlreadyClosed,

    #[error("missing argument `{0}` in input")]
    MissingArgument(String),

    #[error("input is not a struct, got {0}")]
    NotARecord(&'static str),
}

/// Static information a function node reports about itself
#[derive(Debug, Clone)]
pub struct Info {
    /// Output depends only on input, with no side effects
    pub pure: bool,
    /// Whether the engine should memoize calls for this node
    pub memo: bool,
    /// Signature, if the node is bound to a function
    pub sig: Option<FuncType>,
    /// Result of `validate()` at the time of the call
    pub err: Option<FuncError>,
}

/// Channels the engine hands to a node in `init`
pub struct Init {
    /// Input records, one `Value::Struct` per change upstream
    pub input: mpsc::Receiver<Value>,
    /// Output values; the node drops this when it stops producing
    pub output: mpsc::Sender<Value>,
}

/// Base trait for all function nodes in a graph.
///
/// Lifecycle: `validate` → `info` → `init` → `stream` (on its own task) →
/// `close` (from any task).
#[async_trait]
pub trait Func: Send + Sync {
    /// Check that the node was built properly
    fn validate(&self) -> Result<(), FuncError>;

    /// Static information about this node
    fn info(&self) -> Info;

    /// Store the engine channels and prepare internal state
    async fn init(&mut self, init: Init) -> Result<()>;

    /// Streaming loop. Runs until input ends, the node is closed, or the
    /// wrapped computation fails. Closes the output channel on return.
    async fn stream(&self) -> Result<()>;

    /// Ask a running `stream` to stop
    fn close(&self) -> Result<()>;

    /// Counters for this node, if it keeps any
    fn metrics(&self) -> Option<Arc<FuncMetrics>> {
        None
    }
}
