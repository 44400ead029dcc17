use crate::{
    bridge::{Handle, Int32, Int64},
    host::{HostError, HostRef},
};

/// A value marshalled between embedded code and a host method.
///
/// Scalars and byte strings are copied; any other embedded value arrives as
/// an anchored [`Handle`], and host objects travel as [`HostRef`]s.
#[derive(Debug)]
pub enum HostValue {
    Unit,
    Int(i64),
    Float(f64),
    Bytes(Vec<u8>),
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Value(Handle),
    /// Host object reference; `None` is the host null.
    Object(Option<HostRef>),
}

impl HostValue {
    pub fn kind(&self) -> &'static str {
        match self {
            HostValue::Unit => "unit",
            HostValue::Int(_) => "int",
            HostValue::Float(_) => "float",
            HostValue::Bytes(_) => "string",
            HostValue::Bool(_) => "bool",
            HostValue::Int32(_) => "int32",
            HostValue::Int64(_) => "int64",
            HostValue::Value(_) => "value",
            HostValue::Object(_) => "object",
        }
    }

    fn mismatch(&self, expected: &str) -> HostError {
        HostError::illegal_argument(format!("expected {}, got {}", expected, self.kind()))
    }

    pub fn as_int(&self) -> Result<i64, HostError> {
        match self {
            HostValue::Int(v) => Ok(*v),
            other => Err(other.mismatch("int")),
        }
    }

    pub fn as_float(&self) -> Result<f64, HostError> {
        match self {
            HostValue::Float(v) => Ok(*v),
            other => Err(other.mismatch("float")),
        }
    }

    pub fn as_bytes(&self) -> Result<&[u8], HostError> {
        match self {
            HostValue::Bytes(v) => Ok(v),
            other => Err(other.mismatch("string")),
        }
    }

    pub fn as_bool(&self) -> Result<bool, HostError> {
        match self {
            HostValue::Bool(v) => Ok(*v),
            other => Err(other.mismatch("bool")),
        }
    }

    pub fn as_int32(&self) -> Result<i32, HostError> {
        match self {
            HostValue::Int32(v) => Ok(*v),
            other => Err(other.mismatch("int32")),
        }
    }

    pub fn as_int64(&self) -> Result<i64, HostError> {
        match self {
            HostValue::Int64(v) => Ok(*v),
            other => Err(other.mismatch("int64")),
        }
    }

    pub fn as_handle(&self) -> Result<&Handle, HostError> {
        match self {
            HostValue::Value(handle) => Ok(handle),
            other => Err(other.mismatch("value")),
        }
    }

    pub fn as_object(&self) -> Result<Option<&HostRef>, HostError> {
        match self {
            HostValue::Object(obj) => Ok(obj.as_ref()),
            other => Err(other.mismatch("object")),
        }
    }
}

impl From<()> for HostValue {
    fn from(_: ()) -> Self {
        HostValue::Unit
    }
}

impl From<i64> for HostValue {
    fn from(v: i64) -> Self {
        HostValue::Int(v)
    }
}

impl From<f64> for HostValue {
    fn from(v: f64) -> Self {
        HostValue::Float(v)
    }
}

impl From<bool> for HostValue {
    fn from(v: bool) -> Self {
        HostValue::Bool(v)
    }
}

impl From<Vec<u8>> for HostValue {
    fn from(v: Vec<u8>) -> Self {
        HostValue::Bytes(v)
    }
}

impl From<&str> for HostValue {
    fn from(v: &str) -> Self {
        HostValue::Bytes(v.as_bytes().to_vec())
    }
}

impl From<Int32> for HostValue {
    fn from(v: Int32) -> Self {
        HostValue::Int32(v.0)
    }
}

impl From<Int64> for HostValue {
    fn from(v: Int64) -> Self {
        HostValue::Int64(v.0)
    }
}

impl From<Handle> for HostValue {
    fn from(v: Handle) -> Self {
        HostValue::Value(v)
    }
}

impl From<HostRef> for HostValue {
    fn from(v: HostRef) -> Self {
        HostValue::Object(Some(v))
    }
}

impl From<Option<HostRef>> for HostValue {
    fn from(v: Option<HostRef>) -> Self {
        HostValue::Object(v)
    }
}
