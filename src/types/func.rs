use super::{FuncType, Value};
use anyhow::Result;
use std::fmt;
use std::sync::Arc;

/// Call operation of a pure function: positional arguments in, one value out
pub type CallFn = Arc<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>;

/// An immutable, pure function: its signature plus how to call it.
///
/// Calling with equal arguments must always give an equal result, and the
/// call must have no observable side effects. Clones share the same call.
#[derive(Clone)]
pub struct FuncValue {
    sig: FuncType,
    call: CallFn,
}

impl FuncValue {
    pub fn new<F>(sig: FuncType, call: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            sig,
            call: Arc::new(call),
        }
    }

    pub fn sig(&self) -> &FuncType {
        &self.sig
    }

    pub fn call(&self, args: &[Value]) -> Result<Value> {
        if args.len() != self.sig.arity() {
            anyhow::bail!(
                "expected {} arguments for {}, got {}",
                self.sig.arity(),
                self.sig,
                args.len()
            );
        }
        (self.call)(args)
    }
}

impl fmt::Debug for FuncValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuncValue").field("sig", &self.sig).finish()
    }
}
