//! The embedded runtime: a single-threaded, garbage-collected functional
//! runtime with curried native functions, objects with selector-dispatched
//! methods, and exceptions.
//!
//! Programs are assembled with [`Program`] and [`ModuleBuilder`]; native
//! function bodies talk to the runtime through [`Ctx`].

pub mod class;
pub mod ctx;
pub mod exception;
pub mod function;
pub mod gc;
pub mod hash;
pub mod named;
pub mod program;
pub mod runtime;
pub mod value;

pub use class::{ClassDef, ClassId};
pub use ctx::{Ctx, Host, NoHost};
pub use exception::{FAILURE, HOST_EXCEPTION, INVALID_ARGUMENT, NOT_FOUND, Raise};
pub use function::{NativeBody, NativeFunction};
pub use hash::{Selector, hash_variant};
pub use named::NamedSlot;
pub use program::{ClassBuilder, ModuleBuilder, Program};
pub use runtime::Runtime;
pub use value::{FnId, Value};
