use std::panic::Location;

use crate::{
    embedded::{
        gc::{GcHeap, HeapObject},
        value::Value,
    },
    host::HostError,
};

pub const FAILURE: &str = "Failure";
pub const INVALID_ARGUMENT: &str = "Invalid_argument";
pub const NOT_FOUND: &str = "Not_found";
/// Wraps a host exception raised by a host method called from embedded code.
/// Its single argument is the host-object wrapper of the [`HostError`].
pub const HOST_EXCEPTION: &str = "Host.Exception";

/// An embedded exception in flight.
///
/// `backtrace` starts at the raise site and grows by one definition site per
/// native function the exception unwinds through. It stays empty when
/// backtrace recording is disabled.
#[derive(Debug, Clone)]
pub struct Raise {
    pub(crate) exn: Value,
    pub(crate) backtrace: Vec<&'static Location<'static>>,
}

impl Raise {
    pub(crate) fn new(exn: Value, origin: Option<&'static Location<'static>>) -> Self {
        Self {
            exn,
            backtrace: origin.into_iter().collect(),
        }
    }

    /// The raised exception value.
    pub fn exception(&self) -> Value {
        self.exn
    }

    pub fn backtrace(&self) -> &[&'static Location<'static>] {
        &self.backtrace
    }
}

/// Name of the exception constructor, or `None` if `exn` is not an exception.
pub(crate) fn exception_name(heap: &GcHeap, exn: Value) -> Option<&str> {
    match exn {
        Value::Gc(handle) => match heap.get(handle) {
            HeapObject::Exception { name, .. } => Some(name.as_ref()),
            _ => None,
        },
        _ => None,
    }
}

/// Host error carried by a `Host.Exception`, if `exn` is one.
pub(crate) fn host_cause(heap: &GcHeap, exn: Value) -> Option<HostError> {
    let Value::Gc(handle) = exn else {
        return None;
    };
    let HeapObject::Exception { name, args } = heap.get(handle) else {
        return None;
    };
    if name.as_ref() != HOST_EXCEPTION {
        return None;
    }
    match args.first() {
        Some(Value::Gc(inner)) => match heap.get(*inner) {
            HeapObject::Host(obj) => obj.downcast_ref::<HostError>().cloned(),
            _ => None,
        },
        _ => None,
    }
}

/// Renders an exception the way the embedded runtime prints uncaught ones,
/// e.g. `Failure("boom")` or `Not_found`.
pub(crate) fn format_exception(heap: &GcHeap, exn: Value) -> String {
    let Value::Gc(handle) = exn else {
        return format_value(heap, exn);
    };
    match heap.get(handle) {
        HeapObject::Exception { name, args } if args.is_empty() => name.to_string(),
        HeapObject::Exception { name, args } => {
            let rendered: Vec<String> = args.iter().map(|arg| format_value(heap, *arg)).collect();
            format!("{}({})", name, rendered.join(", "))
        }
        _ => format_value(heap, exn),
    }
}

fn format_value(heap: &GcHeap, value: Value) -> String {
    let Value::Gc(handle) = value else {
        return value.to_string();
    };
    match heap.get(handle) {
        HeapObject::Float(v) => format!("{:?}", v),
        HeapObject::Int32(v) => format!("{}l", v),
        HeapObject::Int64(v) => format!("{}L", v),
        HeapObject::Bytes(bytes) => format!("{:?}", String::from_utf8_lossy(bytes)),
        HeapObject::Host(obj) => match obj.downcast_ref::<HostError>() {
            Some(err) => err.to_string(),
            None => format!("<{}>", obj.class_name()),
        },
        _ => "_".to_string(),
    }
}
