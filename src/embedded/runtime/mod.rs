use std::{
    cell::{Cell, RefCell},
    fmt,
    panic::Location,
};

use tracing::debug;

use crate::{
    config::RuntimeConfig,
    embedded::{
        class::ClassDef,
        ctx::{Ctx, Host},
        exception::{self, FAILURE, HOST_EXCEPTION, Raise},
        function::NativeFunction,
        gc::{GcHeap, HeapObject},
        hash::Selector,
        named::{NamedSlot, NamedTable},
        program::{Initializer, Program},
        value::{FnId, Value},
    },
    host::{HostError, HostRef},
};

mod apply;

/// Single-threaded embedded runtime.
///
/// All methods take `&self`; interior state lives in cells and no borrow is
/// held while a native function body runs, so bodies may re-enter the
/// runtime freely. The type is `Send` but not `Sync`: callers serialize
/// access themselves.
pub struct Runtime {
    config: RuntimeConfig,
    heap: RefCell<GcHeap>,
    functions: Vec<NativeFunction>,
    classes: Vec<ClassDef>,
    named: RefCell<NamedTable>,
    initializers: RefCell<Vec<Initializer>>,
    started: Cell<bool>,
    depth: Cell<usize>,
}

/// Marks the runtime busy for as long as it is alive.
pub(crate) struct DepthGuard<'a>(&'a Cell<usize>);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

impl Runtime {
    /// Links `program`. Module initializers do not run until [`start`].
    ///
    /// [`start`]: Runtime::start
    pub fn new(program: Program, config: RuntimeConfig) -> Self {
        let linked = program.link();
        Self {
            heap: RefCell::new(GcHeap::with_threshold(config.gc_threshold)),
            functions: linked.functions,
            classes: linked.classes,
            named: RefCell::new(NamedTable::default()),
            initializers: RefCell::new(linked.initializers),
            started: Cell::new(false),
            depth: Cell::new(0),
            config,
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Runs the module initializers once. Later calls do nothing.
    ///
    /// An initializer that raises aborts startup; the runtime still counts as
    /// started.
    pub fn start(&self, host: &dyn Host) -> Result<(), Raise> {
        if self.started.replace(true) {
            return Ok(());
        }
        let initializers = std::mem::take(&mut *self.initializers.borrow_mut());
        debug!(target: "embridge::embedded", count = initializers.len(), "running module initializers");
        let _busy = self.enter();
        let ctx = Ctx::new(self, host);
        for init in initializers {
            init(&ctx)?;
        }
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.started.get()
    }

    /// Number of embedded activations currently on the stack.
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    pub(crate) fn enter(&self) -> DepthGuard<'_> {
        self.depth.set(self.depth.get() + 1);
        DepthGuard(&self.depth)
    }

    pub fn function(&self, id: FnId) -> Option<&NativeFunction> {
        self.functions.get(id.0 as usize)
    }

    // ---- named values ----

    pub fn register(&self, name: &[u8], value: Value) -> NamedSlot {
        self.named.borrow_mut().register(name, value)
    }

    pub fn named_slot(&self, name: &[u8]) -> Option<NamedSlot> {
        self.named.borrow().lookup(name)
    }

    /// Current value of a slot; re-read on every call.
    pub fn named_value(&self, slot: NamedSlot) -> Value {
        self.named.borrow().get(slot)
    }

    pub fn lookup_named(&self, name: &[u8]) -> Option<Value> {
        let named = self.named.borrow();
        named.lookup(name).map(|slot| named.get(slot))
    }

    // ---- allocation ----

    pub fn alloc(&self, object: HeapObject) -> Value {
        Value::Gc(self.heap.borrow_mut().alloc(object))
    }

    pub fn make_float(&self, value: f64) -> Value {
        self.alloc(HeapObject::Float(value))
    }

    pub fn make_int32(&self, value: i32) -> Value {
        self.alloc(HeapObject::Int32(value))
    }

    pub fn make_int64(&self, value: i64) -> Value {
        self.alloc(HeapObject::Int64(value))
    }

    pub fn make_bytes(&self, bytes: &[u8]) -> Value {
        self.alloc(HeapObject::Bytes(bytes.into()))
    }

    pub fn make_host(&self, object: HostRef) -> Value {
        self.alloc(HeapObject::Host(object))
    }

    // ---- reading ----

    fn with_object<R>(&self, value: Value, f: impl FnOnce(&HeapObject) -> Option<R>) -> Option<R> {
        match value {
            Value::Gc(handle) => f(self.heap.borrow().get(handle)),
            _ => None,
        }
    }

    pub fn read_float(&self, value: Value) -> Option<f64> {
        self.with_object(value, |obj| match obj {
            HeapObject::Float(v) => Some(*v),
            _ => None,
        })
    }

    pub fn read_int32(&self, value: Value) -> Option<i32> {
        self.with_object(value, |obj| match obj {
            HeapObject::Int32(v) => Some(*v),
            _ => None,
        })
    }

    pub fn read_int64(&self, value: Value) -> Option<i64> {
        self.with_object(value, |obj| match obj {
            HeapObject::Int64(v) => Some(*v),
            _ => None,
        })
    }

    pub fn read_bytes(&self, value: Value) -> Option<Vec<u8>> {
        self.with_object(value, |obj| match obj {
            HeapObject::Bytes(bytes) => Some(bytes.to_vec()),
            _ => None,
        })
    }

    pub fn read_host(&self, value: Value) -> Option<HostRef> {
        self.with_object(value, |obj| match obj {
            HeapObject::Host(obj) => Some(obj.clone()),
            _ => None,
        })
    }

    pub fn read_field(&self, value: Value, index: usize) -> Option<Value> {
        self.with_object(value, |obj| match obj {
            HeapObject::Block { fields, .. } | HeapObject::Object { fields, .. } => {
                fields.get(index).copied()
            }
            _ => None,
        })
    }

    /// Type label of a value, looking through heap references.
    pub fn kind_of(&self, value: Value) -> &'static str {
        match value {
            Value::Gc(handle) => self.heap.borrow().get(handle).type_name(),
            other => other.type_name(),
        }
    }

    /// Public method of `object` for `selector`, if `object` is an object
    /// and its class has one.
    pub fn public_method(&self, object: Value, selector: Selector) -> Option<FnId> {
        let class = self.with_object(object, |obj| match obj {
            HeapObject::Object { class, .. } => Some(*class),
            _ => None,
        })?;
        self.classes.get(class.0 as usize)?.method(selector)
    }

    // ---- exceptions ----

    fn origin(&self, location: &'static Location<'static>) -> Option<&'static Location<'static>> {
        self.config.record_backtrace.then_some(location)
    }

    #[track_caller]
    pub fn raise(&self, name: &str, args: Vec<Value>) -> Raise {
        let exn = self.alloc(HeapObject::Exception {
            name: name.into(),
            args,
        });
        Raise::new(exn, self.origin(Location::caller()))
    }

    #[track_caller]
    pub fn failwith(&self, message: &str) -> Raise {
        let msg = self.make_bytes(message.as_bytes());
        self.raise(FAILURE, vec![msg])
    }

    /// Wraps a host exception so it unwinds the embedded stack and reaches
    /// the host caller unchanged.
    #[track_caller]
    pub fn raise_host(&self, error: HostError) -> Raise {
        let wrapped = self.make_host(HostRef::new(error));
        self.raise(HOST_EXCEPTION, vec![wrapped])
    }

    pub fn exception_name(&self, raise: &Raise) -> Option<String> {
        exception::exception_name(&self.heap.borrow(), raise.exn).map(str::to_string)
    }

    pub fn host_cause(&self, raise: &Raise) -> Option<HostError> {
        exception::host_cause(&self.heap.borrow(), raise.exn)
    }

    pub fn format_exception(&self, raise: &Raise) -> String {
        exception::format_exception(&self.heap.borrow(), raise.exn)
    }

    // ---- collection ----

    pub fn should_collect(&self) -> bool {
        self.heap.borrow().should_collect()
    }

    /// Collects garbage, treating named values and `extra_roots` as roots.
    ///
    /// Host code collects through `Bridge::collect`, which passes its anchors
    /// as `extra_roots`. Returns `None` without collecting while any embedded code is running,
    /// since its intermediate values are not rooted.
    pub(crate) fn collect(&self, extra_roots: &[Value]) -> Option<usize> {
        if self.depth.get() > 0 {
            return None;
        }
        let mut roots = self.named.borrow().values().to_vec();
        roots.extend_from_slice(extra_roots);
        let freed = self.heap.borrow_mut().collect(&roots);
        debug!(target: "embridge::gc", freed, live = self.live_objects(), "collection finished");
        Some(freed)
    }

    pub fn live_objects(&self) -> usize {
        self.heap.borrow().live_count()
    }

    pub fn total_collections(&self) -> usize {
        self.heap.borrow().total_collections()
    }

    /// Whether `value` still refers to a live object. Immediates always do.
    pub fn is_live(&self, value: Value) -> bool {
        match value {
            Value::Gc(handle) => self.heap.borrow().contains(handle),
            _ => true,
        }
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("functions", &self.functions.len())
            .field("classes", &self.classes.len())
            .field("started", &self.started.get())
            .field("depth", &self.depth.get())
            .field("live_objects", &self.live_objects())
            .finish()
    }
}
