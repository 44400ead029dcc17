use std::borrow::Cow;

use crate::{
    bridge::{error::BridgeError, handle::Handle},
    embedded::{Runtime, Value},
    host::HostRef,
};

/// 32-bit integer, boxed on the embedded side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Int32(pub i32);

/// 64-bit integer, boxed on the embedded side (unlike the tagged `i64`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Int64(pub i64);

/// A tagged argument slot of a [`Call`](crate::bridge::Call).
///
/// Conversion to an embedded value is deferred until the call is performed.
#[derive(Debug, Clone)]
pub enum Arg<'a> {
    Unit,
    /// Tagged machine integer.
    Int(i64),
    Float(f64),
    /// Byte string, passed without any encoding step. `None` is a null string.
    Bytes(Option<Cow<'a, [u8]>>),
    Bool(bool),
    Int32(i32),
    Int64(i64),
    /// Previously returned foreign value. `None` is a null handle.
    Value(Option<&'a Handle>),
    /// Host object; `None` becomes the embedded host null.
    Object(Option<HostRef>),
}

impl Arg<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Arg::Unit => "unit",
            Arg::Int(_) => "int",
            Arg::Float(_) => "float",
            Arg::Bytes(_) => "string",
            Arg::Bool(_) => "bool",
            Arg::Int32(_) => "int32",
            Arg::Int64(_) => "int64",
            Arg::Value(_) => "value",
            Arg::Object(_) => "object",
        }
    }

    pub(crate) fn check_null(&self) -> Result<(), BridgeError> {
        match self {
            Arg::Bytes(None) | Arg::Value(None) => Err(BridgeError::NullReference("argument")),
            _ => Ok(()),
        }
    }

    /// Host-to-embedded conversion. Null slots were rejected at push time.
    pub(crate) fn to_value(&self, rt: &Runtime) -> Value {
        match self {
            Arg::Unit => Value::Unit,
            Arg::Int(v) => Value::Int(*v),
            Arg::Float(v) => rt.make_float(*v),
            Arg::Bytes(Some(bytes)) => rt.make_bytes(bytes),
            Arg::Bool(v) => Value::Bool(*v),
            Arg::Int32(v) => rt.make_int32(*v),
            Arg::Int64(v) => rt.make_int64(*v),
            Arg::Value(Some(handle)) => handle.value(),
            Arg::Object(Some(obj)) => rt.make_host(obj.clone()),
            Arg::Object(None) | Arg::Bytes(None) | Arg::Value(None) => Value::Null,
        }
    }
}

impl From<()> for Arg<'_> {
    fn from(_: ()) -> Self {
        Arg::Unit
    }
}

impl From<i64> for Arg<'_> {
    fn from(v: i64) -> Self {
        Arg::Int(v)
    }
}

impl From<f64> for Arg<'_> {
    fn from(v: f64) -> Self {
        Arg::Float(v)
    }
}

impl From<bool> for Arg<'_> {
    fn from(v: bool) -> Self {
        Arg::Bool(v)
    }
}

impl From<Int32> for Arg<'_> {
    fn from(v: Int32) -> Self {
        Arg::Int32(v.0)
    }
}

impl From<Int64> for Arg<'_> {
    fn from(v: Int64) -> Self {
        Arg::Int64(v.0)
    }
}

impl<'a> From<&'a [u8]> for Arg<'a> {
    fn from(v: &'a [u8]) -> Self {
        Arg::Bytes(Some(Cow::Borrowed(v)))
    }
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(v: &'a str) -> Self {
        Arg::Bytes(Some(Cow::Borrowed(v.as_bytes())))
    }
}

impl<'a> From<Option<&'a [u8]>> for Arg<'a> {
    fn from(v: Option<&'a [u8]>) -> Self {
        Arg::Bytes(v.map(Cow::Borrowed))
    }
}

impl From<Vec<u8>> for Arg<'_> {
    fn from(v: Vec<u8>) -> Self {
        Arg::Bytes(Some(Cow::Owned(v)))
    }
}

impl From<String> for Arg<'_> {
    fn from(v: String) -> Self {
        Arg::Bytes(Some(Cow::Owned(v.into_bytes())))
    }
}

impl<'a> From<&'a Handle> for Arg<'a> {
    fn from(v: &'a Handle) -> Self {
        Arg::Value(Some(v))
    }
}

impl<'a> From<Option<&'a Handle>> for Arg<'a> {
    fn from(v: Option<&'a Handle>) -> Self {
        Arg::Value(v)
    }
}

impl From<HostRef> for Arg<'_> {
    fn from(v: HostRef) -> Self {
        Arg::Object(Some(v))
    }
}

impl From<Option<HostRef>> for Arg<'_> {
    fn from(v: Option<HostRef>) -> Self {
        Arg::Object(v)
    }
}
