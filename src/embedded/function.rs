use std::{fmt, panic::Location, sync::Arc};

use crate::embedded::{ctx::Ctx, exception::Raise, value::Value};

/// Body of a native function. Receives exactly `arity` arguments.
pub type NativeBody = dyn Fn(&Ctx<'_>, &[Value]) -> Result<Value, Raise> + Send + Sync;

/// A function of the embedded program.
pub struct NativeFunction {
    /// Qualified as `module.name`.
    pub name: Arc<str>,
    pub arity: usize,
    /// Definition site, reported in exception backtraces.
    pub location: &'static Location<'static>,
    pub(crate) body: Box<NativeBody>,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}
