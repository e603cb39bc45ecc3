//! Simple funcs: static, pure functions wrapped as streaming nodes.
//!
//! Easier to use than implementing [`Func`](crate::core::Func) by hand, but
//! limited to functions whose output depends only on their arguments.

pub mod node;
pub mod registry;

pub use node::SimpleFunc;
pub use registry::{RegistryError, SimpleRegistry, StaticFunc, StaticFuncBuilder};
