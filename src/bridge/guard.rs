use std::thread::{self, ThreadId};

use tracing::warn;

use crate::bridge::error::BridgeError;

/// Pins the bridge to the thread that started it.
#[derive(Debug)]
pub(crate) struct ThreadGuard {
    owner: ThreadId,
}

impl ThreadGuard {
    pub(crate) fn current() -> Self {
        Self {
            owner: thread::current().id(),
        }
    }

    pub(crate) fn is_owner(&self) -> bool {
        thread::current().id() == self.owner
    }

    pub(crate) fn check(&self) -> Result<(), BridgeError> {
        if self.is_owner() {
            return Ok(());
        }
        warn!(
            target: "embridge::bridge",
            owner = ?self.owner,
            current = ?thread::current().id(),
            "rejected call from non-owner thread"
        );
        Err(BridgeError::WrongThread)
    }
}
