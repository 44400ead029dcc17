use std::collections::HashMap;

use crate::embedded::value::Value;

/// Stable position of a named value; survives re-registration of the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NamedSlot(pub(crate) u32);

/// Values the embedded program registered under a name for host lookup.
///
/// Every entry is a GC root.
#[derive(Debug, Default)]
pub struct NamedTable {
    values: Vec<Value>,
    index: HashMap<Box<[u8]>, NamedSlot>,
}

impl NamedTable {
    /// Binds `name` to `value`, replacing the previous binding in place.
    pub fn register(&mut self, name: &[u8], value: Value) -> NamedSlot {
        if let Some(&slot) = self.index.get(name) {
            self.values[slot.0 as usize] = value;
            return slot;
        }
        let slot = NamedSlot(self.values.len() as u32);
        self.values.push(value);
        self.index.insert(name.into(), slot);
        slot
    }

    pub fn lookup(&self, name: &[u8]) -> Option<NamedSlot> {
        self.index.get(name).copied()
    }

    pub fn get(&self, slot: NamedSlot) -> Value {
        self.values[slot.0 as usize]
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
