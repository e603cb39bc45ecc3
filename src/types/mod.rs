pub mod func;
pub mod sig;
pub mod value;

pub use func::{CallFn, FuncValue};
pub use sig::{FuncType, Type};
pub use value::{Record, Value, ValueError};
