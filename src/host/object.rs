use std::{any::Any, fmt, panic::Location, sync::Arc};

use crate::bridge::StackFrame;

/// An object of the host runtime that can cross into the embedded runtime.
///
/// The embedded side only ever holds it behind a [`HostRef`]; it can be
/// handed back to host methods or returned to the host unchanged.
pub trait HostObject: Any + Send + Sync + fmt::Debug {
    fn class_name(&self) -> &str;
}

/// Shared reference to a host object.
#[derive(Clone)]
pub struct HostRef(Arc<dyn HostObject>);

impl HostRef {
    pub fn new<T: HostObject>(object: T) -> Self {
        Self(Arc::new(object))
    }

    pub fn from_arc(object: Arc<dyn HostObject>) -> Self {
        Self(object)
    }

    pub fn class_name(&self) -> &str {
        self.0.class_name()
    }

    pub fn downcast_ref<T: HostObject>(&self) -> Option<&T> {
        let any: &dyn Any = self.0.as_ref();
        any.downcast_ref::<T>()
    }

    /// Identity comparison, not structural equality.
    pub fn same_object(&self, other: &HostRef) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl fmt::Debug for HostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostRef({:?})", self.0)
    }
}

/// Exception object of the host runtime.
///
/// Host methods called from embedded code fail with a `HostError`; the error
/// crosses the embedded runtime as an exception and is handed back to the
/// host caller unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct HostError {
    class: Arc<str>,
    message: String,
    frames: Vec<StackFrame>,
}

impl HostError {
    /// Creates an error of the given exception class, recording the caller as
    /// its first host frame.
    #[track_caller]
    pub fn new(class: impl Into<Arc<str>>, message: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            message: message.into(),
            frames: vec![StackFrame::host("<init>", Location::caller())],
        }
    }

    /// Error raised by host-side argument checks of inbound calls.
    #[track_caller]
    pub fn illegal_argument(message: impl Into<String>) -> Self {
        Self::new("IllegalArgumentException", message)
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Host frames, innermost first.
    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    pub fn with_frame(mut self, frame: StackFrame) -> Self {
        self.frames.push(frame);
        self
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.class, self.message)
    }
}

impl std::error::Error for HostError {}

impl HostObject for HostError {
    fn class_name(&self) -> &str {
        &self.class
    }
}
