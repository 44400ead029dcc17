use std::{fmt, panic::Location, sync::Arc};

use crate::embedded::{
    class::{ClassDef, ClassId},
    ctx::Ctx,
    exception::Raise,
    function::NativeFunction,
    hash::{Selector, hash_variant},
    value::{FnId, Value},
};

/// Top-level effect of a module, run once when the runtime starts.
pub type Initializer = Box<dyn FnOnce(&Ctx<'_>) -> Result<(), Raise> + Send>;

type LinkFn = Box<dyn FnOnce(&mut ModuleBuilder<'_>) + Send>;

/// An embedded program: an ordered list of modules.
///
/// Modules are linked when the [`Runtime`](crate::embedded::Runtime) is
/// created and initialized, in order, when it starts.
#[derive(Default)]
pub struct Program {
    modules: Vec<(Arc<str>, LinkFn)>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn module<F>(mut self, name: &str, link: F) -> Self
    where
        F: FnOnce(&mut ModuleBuilder<'_>) + Send + 'static,
    {
        self.modules.push((name.into(), Box::new(link)));
        self
    }

    pub(crate) fn link(self) -> Linked {
        let mut linked = Linked::default();
        for (name, link) in self.modules {
            let mut builder = ModuleBuilder {
                module: name,
                linked: &mut linked,
            };
            link(&mut builder);
        }
        linked
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.modules.iter().map(|(name, _)| name.as_ref()).collect();
        f.debug_struct("Program").field("modules", &names).finish()
    }
}

#[derive(Default)]
pub(crate) struct Linked {
    pub(crate) functions: Vec<NativeFunction>,
    pub(crate) classes: Vec<ClassDef>,
    pub(crate) initializers: Vec<Initializer>,
}

pub struct ModuleBuilder<'a> {
    module: Arc<str>,
    linked: &'a mut Linked,
}

impl<'a> ModuleBuilder<'a> {
    /// Defines a function taking `arity` arguments. The call site is recorded
    /// as its definition location.
    #[track_caller]
    pub fn function<F>(&mut self, name: &str, arity: usize, body: F) -> FnId
    where
        F: Fn(&Ctx<'_>, &[Value]) -> Result<Value, Raise> + Send + Sync + 'static,
    {
        self.define(name, arity, Location::caller(), Box::new(body))
    }

    /// Defines a function and registers it under its own name at startup.
    #[track_caller]
    pub fn export<F>(&mut self, name: &str, arity: usize, body: F) -> FnId
    where
        F: Fn(&Ctx<'_>, &[Value]) -> Result<Value, Raise> + Send + Sync + 'static,
    {
        let id = self.define(name, arity, Location::caller(), Box::new(body));
        self.register(name, Value::Fn(id));
        id
    }

    /// Registers an immediate value under `name` when the runtime starts.
    pub fn register(&mut self, name: &str, value: Value) {
        let name = name.to_string();
        self.on_start(move |ctx| {
            ctx.register(&name, value);
            Ok(())
        });
    }

    pub fn on_start<F>(&mut self, init: F)
    where
        F: FnOnce(&Ctx<'_>) -> Result<(), Raise> + Send + 'static,
    {
        self.linked.initializers.push(Box::new(init));
    }

    pub fn class(&mut self, name: &str) -> ClassBuilder<'_, 'a> {
        ClassBuilder {
            name: name.into(),
            methods: Vec::new(),
            module: self,
        }
    }

    fn define(
        &mut self,
        name: &str,
        arity: usize,
        location: &'static Location<'static>,
        body: Box<crate::embedded::function::NativeBody>,
    ) -> FnId {
        let id = FnId(self.linked.functions.len() as u32);
        self.linked.functions.push(NativeFunction {
            name: format!("{}.{}", self.module, name).into(),
            arity,
            location,
            body,
        });
        id
    }
}

/// Collects the public methods of a class.
pub struct ClassBuilder<'m, 'a> {
    module: &'m mut ModuleBuilder<'a>,
    name: Arc<str>,
    methods: Vec<(Selector, FnId)>,
}

impl ClassBuilder<'_, '_> {
    /// Adds a method; `arity` counts the receiver, which is always the first
    /// argument.
    #[track_caller]
    pub fn method<F>(mut self, name: &str, arity: usize, body: F) -> Self
    where
        F: Fn(&Ctx<'_>, &[Value]) -> Result<Value, Raise> + Send + Sync + 'static,
    {
        let qualified = format!("{}#{}", self.name, name);
        let id = self
            .module
            .define(&qualified, arity, Location::caller(), Box::new(body));
        self.methods.push((hash_variant(name.as_bytes()), id));
        self
    }

    pub fn build(self) -> ClassId {
        let classes = &mut self.module.linked.classes;
        let id = ClassId(classes.len() as u32);
        classes.push(ClassDef::new(self.name, self.methods));
        id
    }
}
