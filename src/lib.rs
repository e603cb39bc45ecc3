pub mod core;
pub mod engine;
pub mod funcs;
pub mod observability;
pub mod types;
