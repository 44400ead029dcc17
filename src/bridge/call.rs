use std::panic::Location;

use tracing::debug;

use crate::{
    bridge::{
        Bridge,
        arg::Arg,
        callback::Callback,
        error::BridgeError,
        exception,
        handle::Handle,
        ret::{Converter, FromEmbedded},
    },
    embedded::{FnId, NamedSlot, Selector, Value},
};

/// What a call invokes.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// Value registered by name.
    Callback(&'a Callback),
    /// Function value obtained from an earlier call.
    Value(&'a Handle),
    /// Public method of an object, by selector.
    Method(&'a Handle, Selector),
    /// Absent target; the label names what was missing.
    Null(&'static str),
}

impl<'a> From<&'a Callback> for Target<'a> {
    fn from(callback: &'a Callback) -> Self {
        Target::Callback(callback)
    }
}

impl<'a> From<&'a Handle> for Target<'a> {
    fn from(handle: &'a Handle) -> Self {
        Target::Value(handle)
    }
}

impl<'a> From<Option<&'a Callback>> for Target<'a> {
    fn from(callback: Option<&'a Callback>) -> Self {
        callback.map_or(Target::Null("callback"), Target::Callback)
    }
}

impl<'a> From<Option<&'a Handle>> for Target<'a> {
    fn from(handle: Option<&'a Handle>) -> Self {
        handle.map_or(Target::Null("handle"), Target::Value)
    }
}

impl<'a> From<(&'a Handle, Selector)> for Target<'a> {
    fn from((object, selector): (&'a Handle, Selector)) -> Self {
        Target::Method(object, selector)
    }
}

/// A method call on a possibly absent object.
impl<'a> From<(Option<&'a Handle>, Selector)> for Target<'a> {
    fn from((object, selector): (Option<&'a Handle>, Selector)) -> Self {
        match object {
            Some(object) => Target::Method(object, selector),
            None => Target::Null("object"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Callee<'a> {
    Named(NamedSlot),
    Anchored(&'a Handle),
    Method { object: &'a Handle, method: FnId },
}

/// An armed call: target fixed, arguments accumulating.
///
/// Created by [`Bridge::begin_call`], consumed by [`Call::perform`].
#[derive(Debug)]
pub struct Call<'a> {
    bridge: &'a Bridge,
    callee: Callee<'a>,
    args: Vec<Arg<'a>>,
    capacity: usize,
}

impl Bridge {
    /// Starts a call to `target`.
    ///
    /// Method targets are resolved here; a selector the object does not
    /// implement fails with [`BridgeError::InvalidMethodId`].
    pub fn begin_call<'a>(&'a self, target: impl Into<Target<'a>>) -> Result<Call<'a>, BridgeError> {
        self.guard.check()?;

        let limit = self.config.max_arguments;
        let (callee, capacity) = match target.into() {
            Target::Null(what) => return Err(BridgeError::NullReference(what)),
            Target::Callback(callback) => (Callee::Named(callback.slot), limit.saturating_sub(1)),
            Target::Value(handle) => {
                self.check_owned(handle, "target")?;
                (Callee::Anchored(handle), limit.saturating_sub(1))
            }
            Target::Method(object, selector) => {
                self.check_owned(object, "object")?;
                let method = {
                    let rt = self.runtime.lock();
                    rt.public_method(object.value(), selector)
                };
                let method = method.ok_or(BridgeError::InvalidMethodId(selector))?;
                (Callee::Method { object, method }, limit.saturating_sub(2))
            }
        };

        Ok(Call {
            bridge: self,
            callee,
            args: Vec::with_capacity(capacity.min(8)),
            capacity,
        })
    }
}

impl Bridge {
    pub(super) fn check_owned(&self, handle: &Handle, what: &'static str) -> Result<(), BridgeError> {
        if handle.belongs_to(&self.anchors) {
            Ok(())
        } else {
            Err(BridgeError::ForeignHandle(what))
        }
    }
}

impl<'a> Call<'a> {
    /// Appends an argument.
    ///
    /// Fails when the argument buffer is full, the argument is a null string
    /// or handle, or the handle belongs to another bridge; the call stays
    /// usable either way.
    pub fn push(&mut self, arg: impl Into<Arg<'a>>) -> Result<&mut Self, BridgeError> {
        let arg = arg.into();
        if self.args.len() >= self.capacity {
            return Err(BridgeError::ArgumentStackOverflow {
                limit: self.bridge.config.max_arguments,
            });
        }
        arg.check_null()?;
        if let Arg::Value(Some(handle)) = &arg {
            self.bridge.check_owned(handle, "argument")?;
        }
        self.args.push(arg);
        Ok(self)
    }

    /// Number of arguments pushed so far.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Arguments that still fit.
    pub fn remaining(&self) -> usize {
        self.capacity - self.args.len()
    }

    /// Invokes the target with the accumulated arguments and converts the
    /// result to `T`.
    ///
    /// Embedded exceptions come back as [`BridgeError::Embedded`], host
    /// errors raised by inbound calls as [`BridgeError::Host`]; both carry
    /// the caller of `perform` as their last frame.
    #[track_caller]
    pub fn perform<T: FromEmbedded>(self) -> Result<T, BridgeError> {
        let call_site = Location::caller();
        let bridge = self.bridge;
        bridge.guard.check()?;

        let rt = bridge.runtime.lock();
        if rt.depth() == 0 && rt.should_collect() {
            bridge.collect_with(&rt);
        }

        let mut args = Vec::with_capacity(self.args.len() + 1);
        let callee = match self.callee {
            Callee::Named(slot) => rt.named_value(slot),
            Callee::Anchored(handle) => handle.value(),
            Callee::Method { object, method } => {
                args.push(object.value());
                Value::Fn(method)
            }
        };
        args.extend(self.args.iter().map(|arg| arg.to_value(&rt)));

        debug!(
            target: "embridge::bridge",
            args = args.len(),
            depth = rt.depth(),
            expect = T::KIND,
            "perform"
        );

        match rt.apply(bridge, callee, &args) {
            Ok(value) => {
                let conv = Converter {
                    runtime: &rt,
                    anchors: &bridge.anchors,
                };
                T::from_embedded(&conv, value)
            }
            Err(raise) => {
                let err = exception::translate(&rt, &raise, call_site);
                debug!(target: "embridge::bridge", error = %err, "call raised");
                Err(err)
            }
        }
    }
}
