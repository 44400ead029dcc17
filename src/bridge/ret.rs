use std::sync::Arc;

use crate::{
    bridge::{
        arg::{Int32, Int64},
        error::BridgeError,
        handle::{AnchorTable, Handle},
    },
    embedded::{Runtime, Value},
    host::HostRef,
};

/// Access to the runtime while a call result is converted.
pub struct Converter<'a> {
    pub(crate) runtime: &'a Runtime,
    pub(crate) anchors: &'a Arc<AnchorTable>,
}

impl<'a> Converter<'a> {
    pub fn runtime(&self) -> &'a Runtime {
        self.runtime
    }

    /// Anchors `value` under a fresh handle.
    pub fn anchor(&self, value: Value) -> Handle {
        Handle::acquire(self.anchors, value)
    }

    pub fn mismatch(&self, expected: &'static str, value: Value) -> BridgeError {
        BridgeError::ResultMismatch {
            expected,
            found: self.runtime.kind_of(value),
        }
    }
}

/// Host types a call result can be converted to.
pub trait FromEmbedded: Sized {
    /// Embedded kind this type is read from.
    const KIND: &'static str;

    fn from_embedded(conv: &Converter<'_>, value: Value) -> Result<Self, BridgeError>;
}

/// Discards the result.
impl FromEmbedded for () {
    const KIND: &'static str = "unit";

    fn from_embedded(_: &Converter<'_>, _: Value) -> Result<Self, BridgeError> {
        Ok(())
    }
}

impl FromEmbedded for i64 {
    const KIND: &'static str = "int";

    fn from_embedded(conv: &Converter<'_>, value: Value) -> Result<Self, BridgeError> {
        match value {
            Value::Int(v) => Ok(v),
            other => Err(conv.mismatch(Self::KIND, other)),
        }
    }
}

impl FromEmbedded for bool {
    const KIND: &'static str = "bool";

    fn from_embedded(conv: &Converter<'_>, value: Value) -> Result<Self, BridgeError> {
        match value {
            Value::Bool(v) => Ok(v),
            other => Err(conv.mismatch(Self::KIND, other)),
        }
    }
}

impl FromEmbedded for f64 {
    const KIND: &'static str = "float";

    fn from_embedded(conv: &Converter<'_>, value: Value) -> Result<Self, BridgeError> {
        conv.runtime
            .read_float(value)
            .ok_or_else(|| conv.mismatch(Self::KIND, value))
    }
}

impl FromEmbedded for Vec<u8> {
    const KIND: &'static str = "string";

    fn from_embedded(conv: &Converter<'_>, value: Value) -> Result<Self, BridgeError> {
        conv.runtime
            .read_bytes(value)
            .ok_or_else(|| conv.mismatch(Self::KIND, value))
    }
}

impl FromEmbedded for Int32 {
    const KIND: &'static str = "int32";

    fn from_embedded(conv: &Converter<'_>, value: Value) -> Result<Self, BridgeError> {
        conv.runtime
            .read_int32(value)
            .map(Int32)
            .ok_or_else(|| conv.mismatch(Self::KIND, value))
    }
}

impl FromEmbedded for Int64 {
    const KIND: &'static str = "int64";

    fn from_embedded(conv: &Converter<'_>, value: Value) -> Result<Self, BridgeError> {
        conv.runtime
            .read_int64(value)
            .map(Int64)
            .ok_or_else(|| conv.mismatch(Self::KIND, value))
    }
}

/// Any value; the result is anchored.
impl FromEmbedded for Handle {
    const KIND: &'static str = "value";

    fn from_embedded(conv: &Converter<'_>, value: Value) -> Result<Self, BridgeError> {
        Ok(conv.anchor(value))
    }
}

/// Host object wrapper or host null.
impl FromEmbedded for Option<HostRef> {
    const KIND: &'static str = "host object";

    fn from_embedded(conv: &Converter<'_>, value: Value) -> Result<Self, BridgeError> {
        if value == Value::Null {
            return Ok(None);
        }
        conv.runtime
            .read_host(value)
            .map(Some)
            .ok_or_else(|| conv.mismatch(Self::KIND, value))
    }
}
