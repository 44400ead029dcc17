use std::{fmt, sync::Arc};

use crate::embedded::NamedSlot;

/// Resolved reference to a value the embedded program registered by name.
///
/// The value is re-read from its slot at every call, so re-registering the
/// name is observed by existing callbacks.
#[derive(Clone, PartialEq, Eq)]
pub struct Callback {
    name: Arc<[u8]>,
    pub(crate) slot: NamedSlot,
}

impl Callback {
    pub(crate) fn new(name: &[u8], slot: NamedSlot) -> Self {
        Self {
            name: name.into(),
            slot,
        }
    }

    pub fn name(&self) -> &[u8] {
        &self.name
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:?})", String::from_utf8_lossy(&self.name))
    }
}
