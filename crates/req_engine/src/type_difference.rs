//! Type differences: records of how a symbol's substitution list changes
//! under property-aware simplification.
//!
//! A difference is keyed to a base term and an original substitution-bearing
//! symbol (its LHS); per substitution index it records either "now expressed
//! as simplified term X" or "resolved to concrete-type symbol Y". The RHS
//! symbol is computed once at build time and the pair is referenced by index
//! from `DecomposeConcrete` steps and from newly synthesized rules.

use smallvec::SmallVec;

use req_term::{MutableTerm, Symbol, Term};

/// Stable index of a difference in the system's append-only arena.
pub type DifferenceId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDifference {
    base_term: Term,
    lhs: Symbol,
    rhs: Symbol,
    /// Substitutions re-spelled by the term simplifier: (index, new term).
    same_types: SmallVec<[(usize, Term); 1]>,
    /// Substitutions resolved through the property map:
    /// (index, re-anchored concrete-type symbol).
    concrete_types: SmallVec<[(usize, Symbol); 1]>,
}

impl TypeDifference {
    /// Build a difference, computing the RHS symbol from the two entry
    /// lists. Entry indices must be distinct and in range; a substitution
    /// appears in at most one list (a structural change short-circuits the
    /// concrete lookup for that index).
    pub fn build(
        base_term: Term,
        lhs: Symbol,
        same_types: SmallVec<[(usize, Term); 1]>,
        concrete_types: SmallVec<[(usize, Symbol); 1]>,
    ) -> Self {
        debug_assert!(lhs.has_substitutions());
        debug_assert!(same_types
            .iter()
            .map(|(i, _)| i)
            .all(|i| concrete_types.iter().all(|(j, _)| i != j)));

        let rhs = compute_rhs(&lhs, &same_types, &concrete_types);
        TypeDifference {
            base_term,
            lhs,
            rhs,
            same_types,
            concrete_types,
        }
    }

    #[inline]
    pub fn base_term(&self) -> &Term {
        &self.base_term
    }

    #[inline]
    pub fn lhs(&self) -> &Symbol {
        &self.lhs
    }

    #[inline]
    pub fn rhs(&self) -> &Symbol {
        &self.rhs
    }

    pub fn same_types(&self) -> &[(usize, Term)] {
        &self.same_types
    }

    pub fn concrete_types(&self) -> &[(usize, Symbol)] {
        &self.concrete_types
    }

    /// Number of substitutions of the LHS symbol.
    pub fn arity(&self) -> usize {
        self.lhs.substitutions().len()
    }

    /// The replay form of substitution `index`: what sits on the evaluator's
    /// stack for that substitution just before the difference is folded in.
    ///
    /// - same-type entry: the simplified term
    /// - concrete entry: the original term with the resolved symbol appended
    /// - otherwise: the original term unchanged
    pub fn expanded_substitution(&self, index: usize) -> Term {
        debug_assert!(index < self.arity());
        if let Some((_, term)) = self.same_types.iter().find(|(i, _)| *i == index) {
            return term.clone();
        }
        let original = &self.lhs.substitutions()[index];
        if let Some((_, symbol)) = self.concrete_types.iter().find(|(i, _)| *i == index) {
            let mut term = MutableTerm::from(original);
            term.push(symbol.clone());
            return Term::from(term);
        }
        original.clone()
    }
}

fn compute_rhs(
    lhs: &Symbol,
    same_types: &[(usize, Term)],
    concrete_types: &[(usize, Symbol)],
) -> Symbol {
    let Some(ct) = lhs.concrete_type() else {
        // Precondition checked by the caller.
        return lhs.clone();
    };

    let mut ct = ct.clone();
    for (index, term) in same_types {
        ct.substitutions[*index] = term.clone();
    }

    // Fold concrete resolutions from the highest index down so earlier
    // indices stay valid while the substitution list is respliced.
    let mut folds: SmallVec<[&(usize, Symbol); 1]> = concrete_types.iter().collect();
    folds.sort_by(|a, b| b.0.cmp(&a.0));
    for (index, symbol) in folds {
        if let Some(inner) = symbol.concrete_type() {
            ct = ct.fold_param(*index, inner);
        }
    }

    lhs.with_concrete_type(ct)
}
