use std::sync::Arc;

use crate::{
    embedded::{class::ClassId, value::FnId, value::Value},
    host::HostRef,
};

/// Objects that live on the GC-managed heap.
#[derive(Debug, Clone)]
pub enum HeapObject {
    /// Boxed double.
    Float(f64),
    /// Boxed 32-bit integer.
    Int32(i32),
    /// Boxed 64-bit integer.
    Int64(i64),
    /// Byte string, passed across the boundary without decoding.
    Bytes(Box<[u8]>),
    /// Tagged tuple of fields (tuples, records, constructors).
    Block { tag: u8, fields: Vec<Value> },
    /// Function applied to fewer arguments than its arity.
    Partial { function: FnId, applied: Vec<Value> },
    /// Instance of a class; methods are found through the class.
    Object { class: ClassId, fields: Vec<Value> },
    /// Wrapper keeping a host object alive from the embedded side.
    Host(HostRef),
    /// Exception value: constructor name plus arguments.
    Exception { name: Arc<str>, args: Vec<Value> },
}

impl HeapObject {
    /// Returns the runtime type label used in conversion diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            HeapObject::Float(_) => "float",
            HeapObject::Int32(_) => "int32",
            HeapObject::Int64(_) => "int64",
            HeapObject::Bytes(_) => "string",
            HeapObject::Block { .. } => "block",
            HeapObject::Partial { .. } => "closure",
            HeapObject::Object { .. } => "object",
            HeapObject::Host(_) => "host object",
            HeapObject::Exception { .. } => "exception",
        }
    }

    /// Values directly referenced by this object.
    pub(crate) fn children(&self) -> &[Value] {
        match self {
            HeapObject::Block { fields, .. } | HeapObject::Object { fields, .. } => fields,
            HeapObject::Partial { applied, .. } => applied,
            HeapObject::Exception { args, .. } => args,
            HeapObject::Float(_)
            | HeapObject::Int32(_)
            | HeapObject::Int64(_)
            | HeapObject::Bytes(_)
            | HeapObject::Host(_) => &[],
        }
    }
}
