pub mod config;
pub mod runner;
pub mod state;

pub use config::EngineConfig;
pub use runner::{NodeIo, NodeRunner};
pub use state::NodeState;
