//! Rewrite rules: directed LHS → RHS pairs over requirement terms.

use req_term::{Symbol, Term};

use crate::path::RewritePath;

/// Stable index of a rule in the system's append-only rule arena.
pub type RuleId = usize;

/// A directed rewrite rule.
///
/// Rules never change meaning once created; simplification passes only ever
/// set flags on them and register replacement rules alongside.
#[derive(Debug, Clone)]
pub struct Rule {
    lhs: Term,
    rhs: Term,
    /// Proof that lhs and rhs are equivalent under the earlier rules, when
    /// the rule was synthesized by a simplification pass.
    path: Option<RewritePath>,
    lhs_simplified: bool,
    rhs_simplified: bool,
    substitution_simplified: bool,
}

impl Rule {
    pub fn new(lhs: Term, rhs: Term, path: Option<RewritePath>) -> Self {
        Rule {
            lhs,
            rhs,
            path,
            lhs_simplified: false,
            rhs_simplified: false,
            substitution_simplified: false,
        }
    }

    #[inline]
    pub fn lhs(&self) -> &Term {
        &self.lhs
    }

    #[inline]
    pub fn rhs(&self) -> &Term {
        &self.rhs
    }

    pub fn path(&self) -> Option<&RewritePath> {
        self.path.as_ref()
    }

    #[inline]
    pub fn is_lhs_simplified(&self) -> bool {
        self.lhs_simplified
    }

    #[inline]
    pub fn is_rhs_simplified(&self) -> bool {
        self.rhs_simplified
    }

    #[inline]
    pub fn is_substitution_simplified(&self) -> bool {
        self.substitution_simplified
    }

    pub fn mark_lhs_simplified(&mut self) {
        debug_assert!(!self.lhs_simplified);
        self.lhs_simplified = true;
    }

    pub fn mark_rhs_simplified(&mut self) {
        debug_assert!(!self.rhs_simplified);
        self.rhs_simplified = true;
    }

    pub fn mark_substitution_simplified(&mut self) {
        debug_assert!(!self.substitution_simplified);
        self.substitution_simplified = true;
    }

    /// If this is a property rule, the trailing LHS property symbol.
    ///
    /// A property rule's LHS is its RHS with one property symbol appended:
    /// it is the canonical source of a conformance / layout / superclass /
    /// concrete-type fact about the term its RHS denotes.
    pub fn property_symbol(&self) -> Option<&Symbol> {
        let symbol = self.lhs.back();
        if !symbol.is_property() {
            return None;
        }
        if self.lhs.len() != self.rhs.len() + 1 {
            return None;
        }
        if self.lhs.symbols()[..self.lhs.len() - 1] != *self.rhs.symbols() {
            return None;
        }
        Some(symbol)
    }
}
