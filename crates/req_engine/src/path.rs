//! Rewrite paths: append-only proof logs of elementary term transformations.
//!
//! Replaying a path against its start term deterministically yields an end
//! term equivalent under the rule set; inverting a path (reversing step
//! order and flipping each step's direction) proves the converse
//! equivalence. Replay itself lives in [`crate::evaluator`].

use crate::rule::RuleId;
use crate::type_difference::DifferenceId;

/// One elementary proof step.
///
/// `Decompose` and `Shift` are bookkeeping for the two-stack machine that
/// processes substitutions one at a time; `Rule`, `PrefixSubstitutions` and
/// `DecomposeConcrete` are the steps that actually transform terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteStep {
    /// Fan the focused symbol's `count` substitution terms out as separate
    /// reasoning targets; inverse folds them back into the symbol.
    Decompose { count: usize, inverse: bool },
    /// Move the focused term to the secondary register; inverse brings one
    /// back.
    Shift { inverse: bool },
    /// Apply a rule LHS ⇒ RHS at `offset` within the focused term; inverse
    /// applies it RHS ⇒ LHS.
    Rule {
        offset: usize,
        rule: RuleId,
        inverse: bool,
    },
    /// Prepend the focused term's leading `length` symbols to every
    /// substitution of its trailing symbol; inverse strips them.
    PrefixSubstitutions { length: usize, inverse: bool },
    /// Apply a recorded type difference as one composite step.
    DecomposeConcrete {
        difference: DifferenceId,
        inverse: bool,
    },
}

impl RewriteStep {
    /// The same step in the opposite direction.
    pub fn inverted(self) -> RewriteStep {
        match self {
            RewriteStep::Decompose { count, inverse } => RewriteStep::Decompose {
                count,
                inverse: !inverse,
            },
            RewriteStep::Shift { inverse } => RewriteStep::Shift { inverse: !inverse },
            RewriteStep::Rule {
                offset,
                rule,
                inverse,
            } => RewriteStep::Rule {
                offset,
                rule,
                inverse: !inverse,
            },
            RewriteStep::PrefixSubstitutions { length, inverse } => {
                RewriteStep::PrefixSubstitutions {
                    length,
                    inverse: !inverse,
                }
            }
            RewriteStep::DecomposeConcrete { difference, inverse } => {
                RewriteStep::DecomposeConcrete {
                    difference,
                    inverse: !inverse,
                }
            }
        }
    }

    /// True for the pure bookkeeping kinds that never change any term.
    pub fn is_bookkeeping(&self) -> bool {
        matches!(
            self,
            RewriteStep::Decompose { .. } | RewriteStep::Shift { .. }
        )
    }
}

/// An ordered sequence of rewrite steps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewritePath {
    steps: Vec<RewriteStep>,
}

impl RewritePath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: RewriteStep) {
        self.steps.push(step);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    #[inline]
    pub fn steps(&self) -> &[RewriteStep] {
        &self.steps
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RewriteStep> {
        self.steps.iter()
    }

    /// Roll the log back to a previously saved length.
    ///
    /// This is the no-op rollback of the simplification passes, not error
    /// recovery: speculative Decompose/Shift scaffolding is appended
    /// optimistically and discarded when nothing changed.
    pub fn truncate(&mut self, len: usize) {
        debug_assert!(len <= self.steps.len());
        self.steps.truncate(len);
    }

    /// Invert in place: reverse step order and flip each step's direction.
    pub fn invert(&mut self) {
        self.steps.reverse();
        for step in &mut self.steps {
            *step = step.inverted();
        }
    }

    /// A freshly inverted copy.
    pub fn inverted(&self) -> RewritePath {
        let mut path = self.clone();
        path.invert();
        path
    }
}

impl<'a> IntoIterator for &'a RewritePath {
    type Item = &'a RewriteStep;
    type IntoIter = std::slice::Iter<'a, RewriteStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
