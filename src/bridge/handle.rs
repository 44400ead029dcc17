use std::{fmt, sync::Arc};

use parking_lot::Mutex;

use crate::embedded::Value;

#[derive(Default)]
struct Slots {
    values: Vec<Option<Value>>,
    free: Vec<u32>,
    live: usize,
}

/// Embedded values anchored by host-side handles.
///
/// Every anchored value is a collection root. This is the only bridge state
/// mutated from arbitrary threads (handles are dropped wherever their owner
/// lives).
#[derive(Default)]
pub(crate) struct AnchorTable {
    slots: Mutex<Slots>,
}

impl AnchorTable {
    fn anchor(&self, value: Value) -> u32 {
        let mut slots = self.slots.lock();
        slots.live += 1;
        match slots.free.pop() {
            Some(idx) => {
                slots.values[idx as usize] = Some(value);
                idx
            }
            None => {
                slots.values.push(Some(value));
                (slots.values.len() - 1) as u32
            }
        }
    }

    fn get(&self, idx: u32) -> Option<Value> {
        self.slots.lock().values.get(idx as usize).copied().flatten()
    }

    fn release(&self, idx: u32) {
        let mut slots = self.slots.lock();
        let released = match slots.values.get_mut(idx as usize) {
            Some(slot) => slot.take().is_some(),
            None => false,
        };
        if released {
            slots.free.push(idx);
            slots.live -= 1;
        }
    }

    pub(crate) fn roots(&self) -> Vec<Value> {
        self.slots.lock().values.iter().flatten().copied().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.lock().live
    }
}

/// Owning host-side reference to a value in the embedded heap.
///
/// The value cannot be collected while the handle exists. Dropping the
/// handle, on any thread, releases the anchor; handles are deliberately not
/// `Clone` (see [`Bridge::duplicate`](crate::bridge::Bridge::duplicate)).
pub struct Handle {
    table: Arc<AnchorTable>,
    slot: u32,
}

impl Handle {
    pub(crate) fn acquire(table: &Arc<AnchorTable>, value: Value) -> Self {
        Self {
            table: Arc::clone(table),
            slot: table.anchor(value),
        }
    }

    /// The anchored value. Only meaningful on the bridge's owning thread.
    pub(crate) fn value(&self) -> Value {
        // A live handle always owns its slot.
        self.table.get(self.slot).unwrap_or(Value::Unit)
    }

    /// Whether this handle was issued by the bridge owning `table`.
    pub(crate) fn belongs_to(&self, table: &Arc<AnchorTable>) -> bool {
        Arc::ptr_eq(&self.table, table)
    }

    /// Releases the anchor now rather than at the end of scope.
    pub fn release(self) {}
}

impl Drop for Handle {
    fn drop(&mut self) {
        self.table.release(self.slot);
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle(#{})", self.slot)
    }
}
