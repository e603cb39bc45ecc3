pub mod node;

pub use node::{Func, FuncError, Info, Init};
