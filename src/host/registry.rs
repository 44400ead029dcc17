use std::{collections::HashMap, fmt, sync::Arc};

use parking_lot::RwLock;

use crate::{
    bridge::Bridge,
    host::{HostError, HostRef, HostValue},
};

/// Reflective identifier of a registered host method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodId(pub(crate) u32);

pub type HostMethodFn =
    dyn Fn(&HostCall<'_>) -> Result<HostValue, HostError> + Send + Sync + 'static;

pub struct HostMethod {
    pub class: Arc<str>,
    pub name: Arc<str>,
    /// Static methods take no receiver.
    pub is_static: bool,
    pub(crate) body: Arc<HostMethodFn>,
}

impl fmt::Debug for HostMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HostMethod({}.{}{})",
            self.class,
            self.name,
            if self.is_static { ", static" } else { "" }
        )
    }
}

/// Builder for the methods of one host class.
#[derive(Debug)]
pub struct HostClass {
    name: Arc<str>,
    methods: Vec<HostMethod>,
}

impl HostClass {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    /// Adds an instance method; the embedded caller must supply a receiver.
    pub fn method<F>(self, name: &str, body: F) -> Self
    where
        F: Fn(&HostCall<'_>) -> Result<HostValue, HostError> + Send + Sync + 'static,
    {
        self.add(name, false, Arc::new(body))
    }

    pub fn static_method<F>(self, name: &str, body: F) -> Self
    where
        F: Fn(&HostCall<'_>) -> Result<HostValue, HostError> + Send + Sync + 'static,
    {
        self.add(name, true, Arc::new(body))
    }

    fn add(mut self, name: &str, is_static: bool, body: Arc<HostMethodFn>) -> Self {
        self.methods.push(HostMethod {
            class: self.name.clone(),
            name: name.into(),
            is_static,
            body,
        });
        self
    }
}

#[derive(Default)]
struct Methods {
    table: Vec<Arc<HostMethod>>,
    index: HashMap<(Arc<str>, Arc<str>), MethodId>,
}

/// Host methods reachable from embedded code.
///
/// Registration may happen from any thread; lookups happen on the bridge's
/// owning thread during inbound calls.
#[derive(Default)]
pub struct HostRegistry {
    methods: RwLock<Methods>,
}

impl HostRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every method of `class`. Registering a method again keeps
    /// its identifier and replaces its body.
    pub fn register(&self, class: HostClass) {
        let mut methods = self.methods.write();
        for method in class.methods {
            let key = (method.class.clone(), method.name.clone());
            match methods.index.get(&key) {
                Some(id) => {
                    let slot = id.0 as usize;
                    methods.table[slot] = Arc::new(method);
                }
                None => {
                    let id = MethodId(methods.table.len() as u32);
                    methods.table.push(Arc::new(method));
                    methods.index.insert(key, id);
                }
            }
        }
    }

    pub fn find(&self, class: &str, name: &str) -> Option<MethodId> {
        let methods = self.methods.read();
        methods
            .index
            .get(&(Arc::from(class), Arc::from(name)))
            .copied()
    }

    pub fn get(&self, id: MethodId) -> Option<Arc<HostMethod>> {
        self.methods.read().table.get(id.0 as usize).cloned()
    }

    pub fn len(&self) -> usize {
        self.methods.read().table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for HostRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostRegistry")
            .field("methods", &self.len())
            .finish()
    }
}

/// Arguments of one inbound call, as seen by the host method.
pub struct HostCall<'a> {
    pub(crate) bridge: &'a Bridge,
    pub(crate) method: &'a HostMethod,
    pub(crate) receiver: Option<HostRef>,
    pub(crate) args: Vec<HostValue>,
}

impl<'a> HostCall<'a> {
    /// The bridge, for calling back into the embedded runtime.
    pub fn bridge(&self) -> &'a Bridge {
        self.bridge
    }

    pub fn method_name(&self) -> &str {
        &self.method.name
    }

    pub fn receiver(&self) -> Option<&HostRef> {
        self.receiver.as_ref()
    }

    /// Receiver downcast to its concrete host type.
    pub fn this<T: crate::host::HostObject>(&self) -> Result<&T, HostError> {
        self.receiver
            .as_ref()
            .and_then(|obj| obj.downcast_ref::<T>())
            .ok_or_else(|| {
                HostError::illegal_argument(format!(
                    "{}.{}: receiver has the wrong class",
                    self.method.class, self.method.name
                ))
            })
    }

    pub fn args(&self) -> &[HostValue] {
        &self.args
    }

    pub fn arg(&self, index: usize) -> Result<&HostValue, HostError> {
        self.args.get(index).ok_or_else(|| {
            HostError::illegal_argument(format!(
                "{}.{}: missing argument {}",
                self.method.class, self.method.name, index
            ))
        })
    }
}
