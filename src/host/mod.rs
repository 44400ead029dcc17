//! Host object model seen from the bridge.
//!
//! Host objects cross into the embedded runtime as opaque [`HostRef`]s, host
//! exceptions as [`HostError`]s, and host methods are registered in a
//! [`HostRegistry`] so embedded code can call them by [`MethodId`].

mod object;
mod registry;
mod value;

pub use object::{HostError, HostObject, HostRef};
pub use registry::{HostCall, HostClass, HostMethod, HostMethodFn, HostRegistry, MethodId};
pub use value::HostValue;
