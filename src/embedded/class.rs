use std::sync::Arc;

use crate::embedded::{hash::Selector, value::FnId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(pub(crate) u32);

/// Method table of a class, sorted by selector for binary search.
#[derive(Debug, Clone)]
pub struct ClassDef {
    pub name: Arc<str>,
    methods: Vec<(Selector, FnId)>,
}

impl ClassDef {
    /// Builds the table; for colliding selectors the last method wins.
    pub(crate) fn new(name: Arc<str>, mut methods: Vec<(Selector, FnId)>) -> Self {
        methods.reverse();
        methods.sort_by_key(|(selector, _)| *selector);
        methods.dedup_by_key(|(selector, _)| *selector);
        Self { name, methods }
    }

    pub fn method(&self, selector: Selector) -> Option<FnId> {
        self.methods
            .binary_search_by_key(&selector, |(selector, _)| *selector)
            .ok()
            .map(|idx| self.methods[idx].1)
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedded::hash::hash_variant;

    #[test]
    fn lookup_by_selector() {
        let class = ClassDef::new(
            "obj".into(),
            vec![
                (hash_variant(b"test"), FnId(0)),
                (hash_variant(b"test_int"), FnId(1)),
            ],
        );
        assert_eq!(class.method(hash_variant(b"test")), Some(FnId(0)));
        assert_eq!(class.method(hash_variant(b"test_int")), Some(FnId(1)));
        assert_eq!(class.method(hash_variant(b"invalid")), None);
    }

    #[test]
    fn later_definition_wins_on_collision() {
        let selector = Selector(7);
        let class = ClassDef::new("obj".into(), vec![(selector, FnId(0)), (selector, FnId(3))]);
        assert_eq!(class.method_count(), 1);
        assert_eq!(class.method(selector), Some(FnId(3)));
    }
}
