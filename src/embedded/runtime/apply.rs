use tracing::trace;

use crate::embedded::{
    ctx::{Ctx, Host},
    exception::{INVALID_ARGUMENT, Raise},
    gc::HeapObject,
    runtime::Runtime,
    value::{FnId, Value},
};

impl Runtime {
    /// Applies `callee` to `args` with curried semantics.
    ///
    /// Too few arguments build a partial application, exactly enough run the
    /// function, and surplus arguments are applied to the function's result.
    /// A function of arity zero runs immediately.
    pub fn apply(&self, host: &dyn Host, callee: Value, args: &[Value]) -> Result<Value, Raise> {
        let _busy = self.enter();
        self.apply_curried(host, callee, args)
    }

    fn apply_curried(&self, host: &dyn Host, callee: Value, args: &[Value]) -> Result<Value, Raise> {
        let target = match callee {
            Value::Fn(id) => Some((id, Vec::new())),
            Value::Gc(handle) => match self.heap.borrow().get(handle) {
                HeapObject::Partial { function, applied } => Some((*function, applied.clone())),
                _ => None,
            },
            _ => None,
        };
        let Some((function, mut applied)) = target else {
            return Err(self.not_a_function(callee));
        };
        let Some(arity) = self.function(function).map(|f| f.arity) else {
            return Err(self.not_a_function(callee));
        };

        let needed = arity - applied.len();
        if args.len() < needed {
            if args.is_empty() {
                return Ok(callee);
            }
            applied.extend_from_slice(args);
            return Ok(self.alloc(HeapObject::Partial { function, applied }));
        }

        applied.extend_from_slice(&args[..needed]);
        let result = self.invoke(host, function, &applied)?;
        let rest = &args[needed..];
        if rest.is_empty() {
            Ok(result)
        } else {
            self.apply_curried(host, result, rest)
        }
    }

    fn invoke(&self, host: &dyn Host, id: FnId, args: &[Value]) -> Result<Value, Raise> {
        let function = &self.functions[id.0 as usize];
        trace!(target: "embridge::embedded", function = %function.name, depth = self.depth(), "invoke");
        let ctx = Ctx::new(self, host);
        (function.body)(&ctx, args).map_err(|mut raise| {
            if self.config.record_backtrace {
                raise.backtrace.push(function.location);
            }
            raise
        })
    }

    #[track_caller]
    fn not_a_function(&self, callee: Value) -> Raise {
        let message = format!("apply: {} is not a function", self.kind_of(callee));
        let msg = self.make_bytes(message.as_bytes());
        self.raise(INVALID_ARGUMENT, vec![msg])
    }
}
