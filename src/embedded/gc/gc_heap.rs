use crate::embedded::{
    gc::{GcHandle, HeapEntry, heap_object::HeapObject},
    value::Value,
};

const DEFAULT_GC_THRESHOLD: usize = 10_000;
const MIN_GC_THRESHOLD: usize = 64;
const MAX_GC_THRESHOLD: usize = 1_000_000;

/// Stop-the-world mark-and-sweep garbage collector heap.
///
/// Every boxed value of the embedded runtime is allocated here. Collection is
/// only ever requested by the runtime at a safe point, i.e. when no native
/// function body holds unrooted values.
pub struct GcHeap {
    entries: Vec<Option<HeapEntry>>,
    free_list: Vec<u32>,
    allocation_count: usize,
    gc_threshold: usize,
    total_collections: usize,
    total_allocations: usize,
}

impl Default for GcHeap {
    fn default() -> Self {
        Self::new()
    }
}

impl GcHeap {
    /// Creates a new GC heap with the default threshold of `10_000`
    /// allocations.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            free_list: Vec::new(),
            allocation_count: 0,
            gc_threshold: DEFAULT_GC_THRESHOLD,
            total_collections: 0,
            total_allocations: 0,
        }
    }

    /// Creates a new heap with a custom GC allocation threshold.
    ///
    /// The threshold (at least 1) is used as given for the first cycle; later
    /// cycles adapt it within `MIN_GC_THRESHOLD..=MAX_GC_THRESHOLD`.
    pub fn with_threshold(threshold: usize) -> Self {
        let mut heap = Self::new();
        heap.gc_threshold = threshold.max(1);
        heap
    }

    /// Returns `true` when the allocation threshold was reached.
    pub fn should_collect(&self) -> bool {
        self.allocation_count >= self.gc_threshold
    }

    /// Allocates a new heap object and returns a stable handle to it.
    ///
    /// Freed slots are reused through the internal free-list before growing
    /// the storage vector.
    pub fn alloc(&mut self, object: HeapObject) -> GcHandle {
        self.allocation_count += 1;
        self.total_allocations += 1;

        let entry = HeapEntry {
            object,
            marked: false,
        };

        if let Some(idx) = self.free_list.pop() {
            self.entries[idx as usize] = Some(entry);
            GcHandle(idx)
        } else {
            let idx = self.entries.len() as u32;
            self.entries.push(Some(entry));
            GcHandle(idx)
        }
    }

    /// Returns an immutable reference to a live object by handle.
    ///
    /// Panics if the handle points to a free slot or is out of bounds: a
    /// stale handle means a value was used after its last anchor was
    /// released, which the bridge rules out by construction.
    pub fn get(&self, handle: GcHandle) -> &HeapObject {
        &self.entries[handle.0 as usize]
            .as_ref()
            .expect("GcHeap::get: invalid or free handle")
            .object
    }

    /// Returns `true` if the handle designates a live slot.
    pub fn contains(&self, handle: GcHandle) -> bool {
        matches!(self.entries.get(handle.0 as usize), Some(Some(_)))
    }

    /// Returns the number of currently live heap entries.
    pub fn live_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_some()).count()
    }

    /// Returns the total number of allocations performed by this heap.
    pub fn total_allocations(&self) -> usize {
        self.total_allocations
    }

    /// Returns the total number of completed GC cycles.
    pub fn total_collections(&self) -> usize {
        self.total_collections
    }

    pub fn threshold(&self) -> usize {
        self.gc_threshold
    }

    /// Runs a full stop-the-world mark-and-sweep collection and returns the
    /// number of reclaimed objects.
    ///
    /// The runtime provides the roots: its named values plus every value
    /// anchored by the host.
    pub fn collect(&mut self, roots: &[Value]) -> usize {
        let mut worklist = Vec::with_capacity(roots.len().max(16));
        worklist.extend(roots.iter().copied());

        while let Some(value) = worklist.pop() {
            if let Value::Gc(handle) = value {
                self.mark_handle(handle, &mut worklist);
            }
        }

        let live_before = self.live_count();
        self.sweep();
        let live_after = self.live_count();
        let collected = live_before.saturating_sub(live_after);

        self.total_collections += 1;
        self.allocation_count = 0;

        self.adapt_threshold(collected, live_before);
        collected
    }

    fn mark_handle(&mut self, handle: GcHandle, worklist: &mut Vec<Value>) {
        let idx = handle.index() as usize;

        // Mark first so shared objects are visited once.
        match self.entries.get_mut(idx) {
            Some(Some(entry)) => {
                if entry.marked {
                    return;
                }
                entry.marked = true;
            }
            _ => return,
        }

        if let Some(Some(entry)) = self.entries.get(idx) {
            worklist.extend(entry.object.children().iter().copied());
        }
    }

    fn sweep(&mut self) {
        let mut i = 0;
        let len = self.entries.len();
        while i < len {
            if let Some(entry) = &mut self.entries[i] {
                if entry.marked {
                    entry.marked = false;
                } else {
                    self.entries[i] = None;
                    self.free_list.push(i as u32);
                }
            }
            i += 1;
        }
    }

    fn adapt_threshold(&mut self, collected: usize, total_before: usize) {
        if total_before == 0 {
            return;
        }

        let ratio = collected as f64 / total_before as f64;
        if ratio < 0.25 {
            self.gc_threshold = (self.gc_threshold * 2).min(MAX_GC_THRESHOLD);
        } else if ratio > 0.75 {
            self.gc_threshold = (self.gc_threshold / 2).max(MIN_GC_THRESHOLD)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::embedded::{
        gc::{gc_heap::GcHeap, heap_object::HeapObject},
        value::Value,
    };

    #[test]
    fn test_alloc_and_get() {
        let mut heap = GcHeap::new();
        let h = heap.alloc(HeapObject::Float(1.5));
        match heap.get(h) {
            HeapObject::Float(v) => assert_eq!(*v, 1.5),
            other => panic!("expected Float, got {:?}", other),
        }
        assert_eq!(heap.live_count(), 1);
    }

    #[test]
    fn test_collect_frees_unreachable() {
        let mut heap = GcHeap::new();
        for i in 0..100 {
            heap.alloc(HeapObject::Int64(i));
        }
        assert_eq!(heap.live_count(), 100);

        let collected = heap.collect(&[]);
        assert_eq!(collected, 100);
        assert_eq!(heap.live_count(), 0);
        assert_eq!(heap.free_list.len(), 100);
    }

    #[test]
    fn test_collect_preserves_reachable() {
        let mut heap = GcHeap::new();
        let h = heap.alloc(HeapObject::Int32(42));
        for i in 0..50 {
            heap.alloc(HeapObject::Int32(i));
        }
        assert_eq!(heap.live_count(), 51);

        heap.collect(&[Value::Gc(h)]);
        assert_eq!(heap.live_count(), 1);
        assert!(matches!(heap.get(h), HeapObject::Int32(42)));
    }

    #[test]
    fn test_collect_traces_through_blocks_and_partials() {
        let mut heap = GcHeap::new();
        let inner = heap.alloc(HeapObject::Bytes(b"a".to_vec().into_boxed_slice()));
        let block = heap.alloc(HeapObject::Block {
            tag: 0,
            fields: vec![Value::Gc(inner), Value::Int(1)],
        });
        let partial = heap.alloc(HeapObject::Partial {
            function: crate::embedded::value::FnId(0),
            applied: vec![Value::Gc(block)],
        });
        heap.alloc(HeapObject::Float(0.0));

        heap.collect(&[Value::Gc(partial)]);
        assert_eq!(heap.live_count(), 3);
        assert!(heap.contains(inner));
    }

    #[test]
    fn test_shared_children_are_marked_once() {
        let mut heap = GcHeap::new();
        let shared = heap.alloc(HeapObject::Float(2.0));
        let a = heap.alloc(HeapObject::Block {
            tag: 0,
            fields: vec![Value::Gc(shared)],
        });
        let b = heap.alloc(HeapObject::Block {
            tag: 0,
            fields: vec![Value::Gc(shared), Value::Gc(a)],
        });

        heap.collect(&[Value::Gc(b), Value::Gc(a)]);
        assert_eq!(heap.live_count(), 3);
    }

    #[test]
    fn test_free_slots_are_reused() {
        let mut heap = GcHeap::new();
        let first = heap.alloc(HeapObject::Int32(1));
        heap.collect(&[]);
        assert!(!heap.contains(first));

        let second = heap.alloc(HeapObject::Int32(2));
        assert_eq!(first.index(), second.index());
        assert_eq!(heap.total_allocations(), 2);
    }

    #[test]
    fn test_threshold_triggers_should_collect() {
        let mut heap = GcHeap::with_threshold(3);
        heap.alloc(HeapObject::Int32(1));
        heap.alloc(HeapObject::Int32(2));
        assert!(!heap.should_collect());
        heap.alloc(HeapObject::Int32(3));
        assert!(heap.should_collect());

        heap.collect(&[]);
        assert!(!heap.should_collect());
        assert_eq!(heap.total_collections(), 1);
    }

    #[test]
    fn test_zero_threshold_is_raised_to_one() {
        let mut heap = GcHeap::with_threshold(0);
        assert_eq!(heap.threshold(), 1);
        assert!(!heap.should_collect());
        heap.alloc(HeapObject::Int32(1));
        assert!(heap.should_collect());
    }

    #[test]
    fn test_threshold_grows_when_little_is_collected() {
        let mut heap = GcHeap::with_threshold(100);
        let roots: Vec<Value> = (0..10)
            .map(|i| Value::Gc(heap.alloc(HeapObject::Int64(i))))
            .collect();
        heap.collect(&roots);
        assert_eq!(heap.threshold(), 200);
    }
}
