//! Host-side bridge into the embedded runtime.
//!
//! A [`Bridge`] owns the embedded [`Runtime`] and is pinned to the thread
//! that started it. Host code resolves [`Callback`]s by name, builds a
//! [`Call`], pushes [`Arg`]s and performs it; non-primitive results come back
//! as [`Handle`]s that keep their value alive until dropped. Embedded code
//! reaches host methods registered in [`Bridge::host`] through the
//! [`Host`](crate::embedded::Host) implementation in `inbound`.

use std::{fmt, panic::Location, sync::Arc};

use parking_lot::ReentrantMutex;
use tracing::{debug, info, warn};

use crate::{
    config::BridgeConfig,
    embedded::{Program, Runtime, Selector, hash_variant},
    host::HostRegistry,
};

mod arg;
mod call;
mod callback;
mod error;
mod exception;
mod guard;
mod handle;
mod inbound;
mod ret;

pub use arg::{Arg, Int32, Int64};
pub use call::{Call, Target};
pub use callback::Callback;
pub use error::BridgeError;
pub use exception::{ExceptionRecord, StackFrame};
pub use handle::Handle;
pub use ret::{Converter, FromEmbedded};

use guard::ThreadGuard;
use handle::AnchorTable;

/// The bridge between host code and one embedded runtime.
///
/// `Bridge` is `Send + Sync` so it can be shared, but every operation that
/// touches the embedded runtime fails with [`BridgeError::WrongThread`] off
/// the owning thread.
pub struct Bridge {
    guard: ThreadGuard,
    runtime: ReentrantMutex<Runtime>,
    anchors: Arc<AnchorTable>,
    host: HostRegistry,
    config: BridgeConfig,
}

impl Bridge {
    /// Takes ownership of `runtime`, pins the bridge to the calling thread and
    /// runs the runtime's module initializers (unless
    /// `config.skip_runtime_startup` is set). An invalid `config` fails with
    /// [`BridgeError::Config`].
    #[track_caller]
    pub fn startup(config: BridgeConfig, runtime: Runtime) -> Result<Self, BridgeError> {
        let call_site = Location::caller();
        config.validate()?;
        let bridge = Self {
            guard: ThreadGuard::current(),
            runtime: ReentrantMutex::new(runtime),
            anchors: Arc::new(AnchorTable::default()),
            host: HostRegistry::new(),
            config,
        };

        if bridge.config.skip_runtime_startup {
            if !bridge.runtime.lock().is_started() {
                warn!(
                    target: "embridge::bridge",
                    "runtime startup skipped but the runtime was never started"
                );
            }
        } else {
            let started = {
                let rt = bridge.runtime.lock();
                rt.start(&bridge)
                    .map_err(|raise| exception::translate(&rt, &raise, call_site))
            };
            started?;
        }

        info!(
            target: "embridge::bridge",
            max_arguments = bridge.config.max_arguments,
            "bridge started"
        );
        Ok(bridge)
    }

    /// Links `program` with `config.runtime` and starts a bridge over it.
    #[track_caller]
    pub fn launch(config: BridgeConfig, program: Program) -> Result<Self, BridgeError> {
        let runtime = Runtime::new(program, config.runtime.clone());
        Self::startup(config, runtime)
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Host classes callable from embedded code.
    pub fn host(&self) -> &HostRegistry {
        &self.host
    }

    pub fn is_owner(&self) -> bool {
        self.guard.is_owner()
    }

    /// Looks up a value the embedded program registered under `name`.
    pub fn resolve_callback(&self, name: impl AsRef<[u8]>) -> Result<Callback, BridgeError> {
        let name = name.as_ref();
        if name.is_empty() {
            return Err(BridgeError::NullReference("name"));
        }
        self.guard.check()?;
        let slot = self.runtime.lock().named_slot(name);
        match slot {
            Some(slot) => Ok(Callback::new(name, slot)),
            None => {
                debug!(
                    target: "embridge::bridge",
                    name = %String::from_utf8_lossy(name),
                    "callback not found"
                );
                Err(BridgeError::CallbackNotFound(
                    String::from_utf8_lossy(name).into_owned(),
                ))
            }
        }
    }

    /// Anchors the current value of a named slot.
    pub fn lookup(&self, callback: &Callback) -> Result<Handle, BridgeError> {
        self.guard.check()?;
        let value = self.runtime.lock().named_value(callback.slot);
        Ok(Handle::acquire(&self.anchors, value))
    }

    /// Selector of a method or variant name. Pure; callable from any thread.
    pub fn compute_selector(&self, name: impl AsRef<[u8]>) -> Result<Selector, BridgeError> {
        let name = name.as_ref();
        if name.is_empty() {
            return Err(BridgeError::NullReference("name"));
        }
        Ok(hash_variant(name))
    }

    /// A second, independent anchor on the value of `handle`.
    pub fn duplicate(&self, handle: &Handle) -> Result<Handle, BridgeError> {
        self.check_owned(handle, "handle")?;
        Ok(Handle::acquire(&self.anchors, handle.value()))
    }

    /// Number of live anchors.
    pub fn anchored(&self) -> usize {
        self.anchors.len()
    }

    /// Runs a full collection now.
    ///
    /// Returns `Ok(false)` without collecting when called while an embedded
    /// call is in flight (from inside an inbound host method).
    pub fn collect(&self) -> Result<bool, BridgeError> {
        self.guard.check()?;
        let rt = self.runtime.lock();
        Ok(self.collect_with(&rt))
    }

    fn collect_with(&self, rt: &Runtime) -> bool {
        let roots = self.anchors.roots();
        match rt.collect(&roots) {
            Some(_) => true,
            None => {
                debug!(target: "embridge::gc", depth = rt.depth(), "collection deferred: call in flight");
                false
            }
        }
    }

    /// Runs `f` with the runtime, on the owning thread only.
    pub fn with_runtime<R>(&self, f: impl FnOnce(&Runtime) -> R) -> Result<R, BridgeError> {
        self.guard.check()?;
        let rt = self.runtime.lock();
        Ok(f(&rt))
    }
}

impl fmt::Debug for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge")
            .field("guard", &self.guard)
            .field("anchored", &self.anchored())
            .field("host", &self.host)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
