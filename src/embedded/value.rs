use std::fmt;

use crate::embedded::gc::GcHandle;

/// Index of a native function in the runtime's code table.
///
/// Code is never collected, so a function value is an immediate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FnId(pub(crate) u32);

/// Runtime value of the embedded runtime.
///
/// Immediates are stored inline; everything else (floats, boxed integers,
/// byte strings, blocks, closures, objects, host wrappers, exceptions) lives
/// on the GC heap and is referenced through `Gc`. A `Value` is a raw
/// reference: holding one does not keep its referent alive across a
/// collection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Unit,
    /// Tagged machine integer.
    Int(i64),
    Bool(bool),
    /// Host null reference.
    Null,
    /// Native function with nothing applied yet.
    Fn(FnId),
    Gc(GcHandle),
}

impl Value {
    /// Label used in conversion diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Null => "null",
            Value::Fn(_) => "function",
            Value::Gc(_) => "block",
        }
    }

    pub fn is_immediate(&self) -> bool {
        !matches!(self, Value::Gc(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Int(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Null => write!(f, "null"),
            Value::Fn(id) => write!(f, "<fun#{}>", id.0),
            Value::Gc(handle) => write!(f, "<block#{}>", handle.index()),
        }
    }
}
