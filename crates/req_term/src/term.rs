//! Terms: non-empty symbol sequences denoting requirement paths.
//!
//! A term reads left to right as a path from a root generic parameter
//! through associated-type and protocol steps to a trailing requirement
//! symbol. Two terms are equal only if syntactically identical; equivalence
//! under the rule set is established separately by rewrite paths.
//!
//! `Term` is immutable; `MutableTerm` is the working copy the simplifier
//! splices rule right-hand sides into, converted back once a pass is done.

use smallvec::SmallVec;
use std::borrow::Borrow;

use crate::symbol::Symbol;

/// An immutable, structurally compared term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Term {
    symbols: SmallVec<[Symbol; 3]>,
}

impl Term {
    /// Build a term from symbols.
    ///
    /// # Panics
    /// Debug-asserts the sequence is non-empty.
    pub fn new(symbols: impl Into<SmallVec<[Symbol; 3]>>) -> Self {
        let symbols = symbols.into();
        debug_assert!(!symbols.is_empty(), "terms are non-empty");
        Term { symbols }
    }

    /// A single-symbol term.
    pub fn from_symbol(symbol: Symbol) -> Self {
        let mut symbols = SmallVec::new();
        symbols.push(symbol);
        Term { symbols }
    }

    pub fn from_slice(symbols: &[Symbol]) -> Self {
        Term::new(SmallVec::from_iter(symbols.iter().cloned()))
    }

    #[inline]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always `false`: terms are non-empty by construction (asserted in
    /// [`Term::new`]). Present only to pair with [`Term::len`].
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The trailing symbol.
    pub fn back(&self) -> &Symbol {
        &self.symbols[self.symbols.len() - 1]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Symbol> {
        self.symbols.iter()
    }

    /// This term with `prefix` prepended.
    pub fn with_prefix(&self, prefix: &[Symbol]) -> Term {
        let mut symbols = SmallVec::with_capacity(prefix.len() + self.symbols.len());
        symbols.extend(prefix.iter().cloned());
        symbols.extend(self.symbols.iter().cloned());
        Term { symbols }
    }

    /// This term with a leading `prefix` removed, or `None` if the term does
    /// not start with it or nothing would remain.
    pub fn strip_prefix(&self, prefix: &[Symbol]) -> Option<Term> {
        if self.symbols.len() <= prefix.len() || !self.symbols.starts_with(prefix) {
            return None;
        }
        Some(Term::from_slice(&self.symbols[prefix.len()..]))
    }
}

// Terms hash like their symbol slice, so a map keyed by Term can be probed
// with a borrowed slice (the property map's suffix lookup relies on this).
impl Borrow<[Symbol]> for Term {
    fn borrow(&self) -> &[Symbol] {
        self.symbols()
    }
}

impl From<MutableTerm> for Term {
    fn from(term: MutableTerm) -> Term {
        debug_assert!(!term.symbols.is_empty(), "terms are non-empty");
        Term {
            symbols: SmallVec::from_vec(term.symbols),
        }
    }
}

/// A working copy of a term, mutated in place during simplification and
/// discarded once converted back to a [`Term`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutableTerm {
    symbols: Vec<Symbol>,
}

impl MutableTerm {
    pub fn new() -> Self {
        MutableTerm {
            symbols: Vec::new(),
        }
    }

    pub fn from_slice(symbols: &[Symbol]) -> Self {
        MutableTerm {
            symbols: symbols.to_vec(),
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[Symbol] {
        &self.symbols
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn back(&self) -> Option<&Symbol> {
        self.symbols.last()
    }

    pub fn push(&mut self, symbol: Symbol) {
        self.symbols.push(symbol);
    }

    /// Replace `count` symbols starting at `offset` with `replacement`.
    /// The workhorse of rule application.
    pub fn splice(&mut self, offset: usize, count: usize, replacement: &[Symbol]) {
        self.symbols
            .splice(offset..offset + count, replacement.iter().cloned());
    }

    /// Replace the trailing symbol.
    ///
    /// # Panics
    /// Debug-asserts the term is non-empty.
    pub fn replace_back(&mut self, symbol: Symbol) {
        debug_assert!(!self.symbols.is_empty());
        let last = self.symbols.len() - 1;
        self.symbols[last] = symbol;
    }
}

impl Default for MutableTerm {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Term> for MutableTerm {
    fn from(term: Term) -> MutableTerm {
        MutableTerm {
            symbols: term.symbols.into_vec(),
        }
    }
}

impl From<&Term> for MutableTerm {
    fn from(term: &Term) -> MutableTerm {
        MutableTerm::from_slice(term.symbols())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generic_param(index: u32) -> Symbol {
        Symbol::GenericParam { depth: 0, index }
    }

    #[test]
    fn test_from_symbol() {
        let t = Term::from_symbol(generic_param(0));
        assert_eq!(t.len(), 1);
        assert_eq!(t.back(), &generic_param(0));
    }

    #[test]
    fn test_prefix_roundtrip() {
        let t = Term::from_slice(&[generic_param(1), Symbol::Name(0)]);
        let prefixed = t.with_prefix(&[generic_param(0)]);
        assert_eq!(prefixed.len(), 3);
        assert_eq!(prefixed.strip_prefix(&[generic_param(0)]), Some(t.clone()));
        assert_eq!(prefixed.strip_prefix(&[generic_param(9)]), None);
        // Stripping the whole term would leave it empty.
        assert_eq!(t.strip_prefix(t.symbols()), None);
    }

    #[test]
    fn test_splice() {
        let mut m = MutableTerm::from_slice(&[generic_param(0), Symbol::Name(1), Symbol::Name(2)]);
        m.splice(1, 2, &[Symbol::Name(9)]);
        assert_eq!(m.as_slice(), &[generic_param(0), Symbol::Name(9)]);
        m.splice(1, 1, &[Symbol::Name(1), Symbol::Name(2)]);
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn test_term_mutable_roundtrip() {
        let t = Term::from_slice(&[generic_param(0), Symbol::Name(1)]);
        let m = MutableTerm::from(&t);
        assert_eq!(Term::from(m), t);
    }
}
