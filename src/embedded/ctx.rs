use crate::{
    embedded::{
        class::ClassId,
        exception::{INVALID_ARGUMENT, NOT_FOUND, Raise},
        gc::HeapObject,
        hash::Selector,
        runtime::Runtime,
        value::Value,
    },
    host::{HostError, HostRef, MethodId},
};

/// The host side of the embedded runtime: how embedded code reaches host
/// methods.
pub trait Host {
    /// Resolves a host method by class and method name.
    fn find_method(&self, class: &str, name: &str) -> Option<MethodId>;

    /// Calls a host method. Static methods get no receiver.
    ///
    /// A host exception comes back as a raised `Host.Exception`.
    fn invoke(
        &self,
        runtime: &Runtime,
        method: MethodId,
        receiver: Option<Value>,
        args: &[Value],
    ) -> Result<Value, Raise>;
}

/// Host used when the runtime runs without a bridge attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHost;

impl Host for NoHost {
    fn find_method(&self, _class: &str, _name: &str) -> Option<MethodId> {
        None
    }

    fn invoke(
        &self,
        runtime: &Runtime,
        _method: MethodId,
        _receiver: Option<Value>,
        _args: &[Value],
    ) -> Result<Value, Raise> {
        Err(runtime.failwith("no host attached"))
    }
}

/// What a native function body can do while it runs.
///
/// Values a body allocates stay valid until it returns: collection never
/// happens while a function body is executing.
pub struct Ctx<'a> {
    rt: &'a Runtime,
    host: &'a dyn Host,
}

impl<'a> Ctx<'a> {
    pub(crate) fn new(rt: &'a Runtime, host: &'a dyn Host) -> Self {
        Self { rt, host }
    }

    pub fn runtime(&self) -> &'a Runtime {
        self.rt
    }

    pub fn make_float(&self, value: f64) -> Value {
        self.rt.make_float(value)
    }

    pub fn make_int32(&self, value: i32) -> Value {
        self.rt.make_int32(value)
    }

    pub fn make_int64(&self, value: i64) -> Value {
        self.rt.make_int64(value)
    }

    pub fn make_bytes(&self, bytes: &[u8]) -> Value {
        self.rt.make_bytes(bytes)
    }

    pub fn make_tuple(&self, fields: Vec<Value>) -> Value {
        self.rt.alloc(HeapObject::Block { tag: 0, fields })
    }

    pub fn make_object(&self, class: ClassId, fields: Vec<Value>) -> Value {
        self.rt.alloc(HeapObject::Object { class, fields })
    }

    pub fn make_host(&self, object: HostRef) -> Value {
        self.rt.make_host(object)
    }

    #[track_caller]
    pub fn as_int(&self, value: Value) -> Result<i64, Raise> {
        match value {
            Value::Int(v) => Ok(v),
            other => Err(self.type_error("int", other)),
        }
    }

    #[track_caller]
    pub fn as_bool(&self, value: Value) -> Result<bool, Raise> {
        match value {
            Value::Bool(v) => Ok(v),
            other => Err(self.type_error("bool", other)),
        }
    }

    #[track_caller]
    pub fn as_float(&self, value: Value) -> Result<f64, Raise> {
        match self.rt.read_float(value) {
            Some(v) => Ok(v),
            None => Err(self.type_error("float", value)),
        }
    }

    #[track_caller]
    pub fn as_int32(&self, value: Value) -> Result<i32, Raise> {
        match self.rt.read_int32(value) {
            Some(v) => Ok(v),
            None => Err(self.type_error("int32", value)),
        }
    }

    #[track_caller]
    pub fn as_int64(&self, value: Value) -> Result<i64, Raise> {
        match self.rt.read_int64(value) {
            Some(v) => Ok(v),
            None => Err(self.type_error("int64", value)),
        }
    }

    #[track_caller]
    pub fn as_bytes(&self, value: Value) -> Result<Vec<u8>, Raise> {
        match self.rt.read_bytes(value) {
            Some(v) => Ok(v),
            None => Err(self.type_error("string", value)),
        }
    }

    /// Host object behind a wrapper; `Null` reads as `None`.
    #[track_caller]
    pub fn as_host(&self, value: Value) -> Result<Option<HostRef>, Raise> {
        if value == Value::Null {
            return Ok(None);
        }
        match self.rt.read_host(value) {
            Some(obj) => Ok(Some(obj)),
            None => Err(self.type_error("host object", value)),
        }
    }

    /// Field `index` of a tuple, block or object.
    #[track_caller]
    pub fn field(&self, value: Value, index: usize) -> Result<Value, Raise> {
        match self.rt.read_field(value, index) {
            Some(field) => Ok(field),
            None => Err(self.invalid_arg("field index out of bounds")),
        }
    }

    pub fn apply(&self, function: Value, args: &[Value]) -> Result<Value, Raise> {
        self.rt.apply(self.host, function, args)
    }

    /// Dynamic method dispatch; the object is passed as the first argument.
    #[track_caller]
    pub fn send(&self, object: Value, selector: Selector, args: &[Value]) -> Result<Value, Raise> {
        let Some(method) = self.rt.public_method(object, selector) else {
            return Err(self.raise(NOT_FOUND, Vec::new()));
        };
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push(object);
        full.extend_from_slice(args);
        self.rt.apply(self.host, Value::Fn(method), &full)
    }

    /// Resolves a host method, raising `Not_found` when it does not exist.
    #[track_caller]
    pub fn find_host_method(&self, class: &str, name: &str) -> Result<MethodId, Raise> {
        match self.host.find_method(class, name) {
            Some(method) => Ok(method),
            None => Err(self.raise(NOT_FOUND, Vec::new())),
        }
    }

    pub fn call_host(&self, method: MethodId, receiver: Value, args: &[Value]) -> Result<Value, Raise> {
        self.host.invoke(self.rt, method, Some(receiver), args)
    }

    pub fn call_host_static(&self, method: MethodId, args: &[Value]) -> Result<Value, Raise> {
        self.host.invoke(self.rt, method, None, args)
    }

    #[track_caller]
    pub fn raise(&self, name: &str, args: Vec<Value>) -> Raise {
        self.rt.raise(name, args)
    }

    #[track_caller]
    pub fn failwith(&self, message: &str) -> Raise {
        self.rt.failwith(message)
    }

    #[track_caller]
    pub fn invalid_arg(&self, message: &str) -> Raise {
        let msg = self.rt.make_bytes(message.as_bytes());
        self.raise(INVALID_ARGUMENT, vec![msg])
    }

    /// Raises the host exception held by `value` so the host caller receives
    /// it as-is.
    #[track_caller]
    pub fn throw(&self, value: Value) -> Raise {
        match self.rt.read_host(value) {
            Some(obj) => match obj.downcast_ref::<HostError>() {
                Some(err) => self.rt.raise_host(err.clone()),
                None => self.invalid_arg("throw: not a host exception"),
            },
            None => self.invalid_arg("throw: not a host exception"),
        }
    }

    /// Creates a host exception of `class` and raises it.
    #[track_caller]
    pub fn throw_new(&self, class: &str, message: &str) -> Raise {
        self.rt.raise_host(HostError::new(class, message))
    }

    /// Host error carried by a raised exception, for handlers that catch
    /// host failures.
    pub fn host_error(&self, raise: &Raise) -> Option<HostError> {
        self.rt.host_cause(raise)
    }

    pub fn exception_name(&self, raise: &Raise) -> Option<String> {
        self.rt.exception_name(raise)
    }

    pub fn register(&self, name: &str, value: Value) {
        self.rt.register(name.as_bytes(), value);
    }

    pub fn named(&self, name: &str) -> Option<Value> {
        self.rt.lookup_named(name.as_bytes())
    }

    #[track_caller]
    fn type_error(&self, expected: &str, found: Value) -> Raise {
        let message = format!("expected {}, got {}", expected, self.rt.kind_of(found));
        self.invalid_arg(&message)
    }
}
