//! Calls from embedded code into host methods.

use tracing::debug;

use crate::{
    bridge::{Bridge, handle::Handle},
    embedded::{Host, Raise, Runtime, Value},
    host::{HostCall, HostError, HostValue, MethodId},
};

impl Bridge {
    /// Tag-directed embedded-to-host conversion. Scalars and strings are
    /// copied, host wrappers unwrapped, anything else anchored.
    fn to_host(&self, rt: &Runtime, value: Value) -> HostValue {
        match value {
            Value::Unit => HostValue::Unit,
            Value::Int(v) => HostValue::Int(v),
            Value::Bool(v) => HostValue::Bool(v),
            Value::Null => HostValue::Object(None),
            Value::Fn(_) => HostValue::Value(Handle::acquire(&self.anchors, value)),
            Value::Gc(_) => match rt.kind_of(value) {
                "float" => rt.read_float(value).map(HostValue::Float),
                "int32" => rt.read_int32(value).map(HostValue::Int32),
                "int64" => rt.read_int64(value).map(HostValue::Int64),
                "string" => rt.read_bytes(value).map(HostValue::Bytes),
                "host object" => rt.read_host(value).map(|obj| HostValue::Object(Some(obj))),
                _ => None,
            }
            .unwrap_or_else(|| HostValue::Value(Handle::acquire(&self.anchors, value))),
        }
    }

    /// Host-to-embedded conversion of a host method's result. A handle issued
    /// by another bridge raises `IllegalArgumentException`.
    fn to_embedded(&self, rt: &Runtime, value: HostValue) -> Result<Value, Raise> {
        let value = match value {
            HostValue::Unit => Value::Unit,
            HostValue::Int(v) => Value::Int(v),
            HostValue::Float(v) => rt.make_float(v),
            HostValue::Bytes(bytes) => rt.make_bytes(&bytes),
            HostValue::Bool(v) => Value::Bool(v),
            HostValue::Int32(v) => rt.make_int32(v),
            HostValue::Int64(v) => rt.make_int64(v),
            HostValue::Value(handle) if handle.belongs_to(&self.anchors) => handle.value(),
            HostValue::Value(_) => {
                return Err(rt.raise_host(HostError::illegal_argument(
                    "handle was issued by another bridge",
                )));
            }
            HostValue::Object(None) => Value::Null,
            HostValue::Object(Some(obj)) => rt.make_host(obj),
        };
        Ok(value)
    }
}

impl Host for Bridge {
    fn find_method(&self, class: &str, name: &str) -> Option<MethodId> {
        self.host.find(class, name)
    }

    fn invoke(
        &self,
        runtime: &Runtime,
        method: MethodId,
        receiver: Option<Value>,
        args: &[Value],
    ) -> Result<Value, Raise> {
        let Some(method) = self.host.get(method) else {
            return Err(runtime.failwith("unknown host method"));
        };

        let receiver = if method.is_static {
            None
        } else {
            match receiver {
                Some(value) if value != Value::Null => match runtime.read_host(value) {
                    Some(obj) => Some(obj),
                    None => {
                        return Err(runtime.raise_host(HostError::illegal_argument(format!(
                            "{}.{}: receiver is not a host object",
                            method.class, method.name
                        ))));
                    }
                },
                _ => {
                    return Err(runtime.raise_host(HostError::new(
                        "NullPointerException",
                        format!("{}.{}: null receiver", method.class, method.name),
                    )));
                }
            }
        };

        let call = HostCall {
            bridge: self,
            method: &method,
            receiver,
            args: args.iter().map(|arg| self.to_host(runtime, *arg)).collect(),
        };
        debug!(
            target: "embridge::inbound",
            class = %method.class,
            method = %method.name,
            args = args.len(),
            depth = runtime.depth(),
            "host call"
        );

        match (method.body)(&call) {
            Ok(value) => self.to_embedded(runtime, value),
            Err(error) => {
                debug!(target: "embridge::inbound", %error, "host method failed");
                Err(runtime.raise_host(error))
            }
        }
    }
}
