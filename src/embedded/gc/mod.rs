//! Heap of the embedded runtime.

pub mod gc_heap;
pub mod heap_object;

pub use gc_heap::GcHeap;
pub use heap_object::HeapObject;

/// Slot index of a boxed value in the [`GcHeap`].
///
/// Only meaningful while the slot is reachable: from a named value, an
/// anchor held by the bridge, or the arguments of a running call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GcHandle(pub(crate) u32);

impl GcHandle {
    pub fn index(self) -> u32 {
        self.0
    }

    #[cfg(test)]
    pub fn new_for_test(index: u32) -> Self {
        Self(index)
    }
}

struct HeapEntry {
    object: HeapObject,
    marked: bool,
}
