//! String interning for identifiers.
//!
//! The name table (spec §4.1) interns every identifier once; the rest of
//! the compiler compares names by this cheap `Atom` handle instead of by
//! string content.

use rustc_hash::FxHashMap;
use std::sync::Arc;

/// An interned string handle. Cheap to copy and compare.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Atom(u32);

/// Interns strings into stable `Atom` handles.
///
/// Not thread-safe by design: the compiler is single-threaded and
/// cooperative (spec §5), so a plain `FxHashMap` is enough — no need for
/// the teacher's `DashMap`/sharded variant used under concurrent LSP access.
#[derive(Default)]
pub struct Interner {
    strings: Vec<Arc<str>>,
    lookup: FxHashMap<Arc<str>, Atom>,
}

impl Interner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, s: &str) -> Atom {
        if let Some(&atom) = self.lookup.get(s) {
            return atom;
        }
        let arc: Arc<str> = Arc::from(s);
        let atom = Atom(u32::try_from(self.strings.len()).expect("interner overflow"));
        self.strings.push(arc.clone());
        self.lookup.insert(arc, atom);
        atom
    }

    #[must_use]
    pub fn resolve(&self, atom: Atom) -> &str {
        &self.strings[atom.0 as usize]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_dedupes() {
        let mut interner = Interner::new();
        let a = interner.intern("self");
        let b = interner.intern("self");
        assert_eq!(a, b);
        assert_eq!(interner.resolve(a), "self");
    }

    #[test]
    fn distinct_strings_get_distinct_atoms() {
        let mut interner = Interner::new();
        let a = interner.intern("uni");
        let b = interner.intern("mut");
        assert_ne!(a, b);
    }
}
