//! Proof replay: a two-stack abstract machine over rewrite paths.
//!
//! The machine is only about path checking, not evaluation: its one piece of
//! runtime state is which sub-term is the proof's current focus. The primary
//! stack holds the focused term on top; the secondary stack parks
//! substitutions that are waiting their turn while a sibling is processed.

use req_term::{MutableTerm, Symbol, Term};

use crate::error::ReplayError;
use crate::path::{RewritePath, RewriteStep};
use crate::system::RewriteSystem;

#[derive(Debug, Clone)]
pub struct PathEvaluator {
    primary: Vec<MutableTerm>,
    secondary: Vec<MutableTerm>,
}

impl PathEvaluator {
    /// Start replay with `term` as the focus.
    pub fn new(term: MutableTerm) -> Self {
        PathEvaluator {
            primary: vec![term],
            secondary: Vec::new(),
        }
    }

    /// The currently focused term.
    pub fn current(&self) -> Result<&MutableTerm, ReplayError> {
        self.primary.last().ok_or(ReplayError::PrimaryStackUnderflow)
    }

    /// Apply every step of `path` in order.
    pub fn apply_path(
        &mut self,
        path: &RewritePath,
        system: &RewriteSystem,
    ) -> Result<(), ReplayError> {
        for step in path {
            self.apply(*step, system)?;
        }
        Ok(())
    }

    /// Finish replay, requiring both stacks to have collapsed back to a
    /// single term.
    pub fn into_term(mut self) -> Result<Term, ReplayError> {
        if self.primary.len() != 1 || !self.secondary.is_empty() {
            return Err(ReplayError::UnbalancedStacks);
        }
        let term = self.primary.pop().ok_or(ReplayError::PrimaryStackUnderflow)?;
        Ok(Term::from(term))
    }

    pub fn apply(&mut self, step: RewriteStep, system: &RewriteSystem) -> Result<(), ReplayError> {
        match step {
            RewriteStep::Decompose { count, inverse } => self.apply_decompose(count, inverse),
            RewriteStep::Shift { inverse } => self.apply_shift(inverse),
            RewriteStep::Rule {
                offset,
                rule,
                inverse,
            } => self.apply_rule(offset, rule, inverse, system),
            RewriteStep::PrefixSubstitutions { length, inverse } => {
                self.apply_prefix_substitutions(length, inverse)
            }
            RewriteStep::DecomposeConcrete { difference, inverse } => {
                self.apply_decompose_concrete(difference, inverse, system)
            }
        }
    }

    fn top_mut(&mut self) -> Result<&mut MutableTerm, ReplayError> {
        self.primary
            .last_mut()
            .ok_or(ReplayError::PrimaryStackUnderflow)
    }

    /// The trailing symbol of the focused term, which must carry
    /// substitutions.
    fn focused_symbol(term: &MutableTerm) -> Result<&Symbol, ReplayError> {
        let symbol = term.back().ok_or(ReplayError::PrimaryStackUnderflow)?;
        if !symbol.has_substitutions() {
            return Err(ReplayError::MissingSubstitutions(symbol.clone()));
        }
        Ok(symbol)
    }

    fn apply_decompose(&mut self, count: usize, inverse: bool) -> Result<(), ReplayError> {
        if !inverse {
            // Fan the substitutions out above the parent term; the first
            // substitution is processed first, so it must end up on top
            // after the scaffolding Shifts move the rest aside.
            let top = self.current()?;
            let symbol = Self::focused_symbol(top)?;
            let substitutions = symbol.substitutions();
            if substitutions.len() != count {
                return Err(ReplayError::DecomposeArityMismatch {
                    expected: substitutions.len(),
                    found: count,
                });
            }
            let fanned: Vec<MutableTerm> =
                substitutions.iter().map(MutableTerm::from).collect();
            self.primary.extend(fanned);
            Ok(())
        } else {
            // Fold the top `count` terms back in as the parent symbol's
            // substitutions.
            if self.primary.len() < count + 1 {
                return Err(ReplayError::PrimaryStackUnderflow);
            }
            let mut substitutions = Vec::with_capacity(count);
            for _ in 0..count {
                let term = self
                    .primary
                    .pop()
                    .ok_or(ReplayError::PrimaryStackUnderflow)?;
                substitutions.push(Term::from(term));
            }
            substitutions.reverse();

            let top = self.top_mut()?;
            let symbol = Self::focused_symbol(top)?;
            if symbol.substitutions().len() != count {
                return Err(ReplayError::DecomposeArityMismatch {
                    expected: symbol.substitutions().len(),
                    found: count,
                });
            }
            let rebuilt = symbol.with_substitutions(substitutions);
            top.replace_back(rebuilt);
            Ok(())
        }
    }

    fn apply_shift(&mut self, inverse: bool) -> Result<(), ReplayError> {
        if !inverse {
            let term = self
                .primary
                .pop()
                .ok_or(ReplayError::PrimaryStackUnderflow)?;
            self.secondary.push(term);
        } else {
            let term = self
                .secondary
                .pop()
                .ok_or(ReplayError::SecondaryStackUnderflow)?;
            self.primary.push(term);
        }
        Ok(())
    }

    fn apply_rule(
        &mut self,
        offset: usize,
        rule_id: usize,
        inverse: bool,
        system: &RewriteSystem,
    ) -> Result<(), ReplayError> {
        let rule = system
            .get_rule(rule_id)
            .ok_or(ReplayError::UnknownRule(rule_id))?;
        let (from, to) = if inverse {
            (rule.rhs(), rule.lhs())
        } else {
            (rule.lhs(), rule.rhs())
        };

        let top = self.top_mut()?;
        let matches = top
            .as_slice()
            .get(offset..)
            .is_some_and(|tail| tail.starts_with(from.symbols()));
        if !matches {
            return Err(ReplayError::RuleMismatch {
                rule: rule_id,
                offset,
            });
        }
        top.splice(offset, from.len(), to.symbols());
        Ok(())
    }

    fn apply_prefix_substitutions(
        &mut self,
        length: usize,
        inverse: bool,
    ) -> Result<(), ReplayError> {
        let top = self.top_mut()?;
        if top.len() < length + 1 {
            return Err(ReplayError::PrefixMismatch);
        }
        let prefix = top.as_slice()[..length].to_vec();
        let symbol = Self::focused_symbol(top)?;
        let rebuilt = if !inverse {
            symbol.prepend_prefix_to_substitutions(&prefix)
        } else {
            symbol
                .strip_prefix_from_substitutions(&prefix)
                .ok_or(ReplayError::PrefixMismatch)?
        };
        top.replace_back(rebuilt);
        Ok(())
    }

    fn apply_decompose_concrete(
        &mut self,
        difference_id: usize,
        inverse: bool,
        system: &RewriteSystem,
    ) -> Result<(), ReplayError> {
        let difference = system
            .get_type_difference(difference_id)
            .ok_or(ReplayError::UnknownDifference(difference_id))?;
        let arity = difference.arity();

        if !inverse {
            // Replace the simplified symbol with the original one and fan
            // out the expanded substitutions.
            let top = self.top_mut()?;
            let symbol = Self::focused_symbol(top)?;
            if symbol != difference.rhs() {
                return Err(ReplayError::DifferenceMismatch);
            }
            top.replace_back(difference.lhs().clone());
            for index in 0..arity {
                self.primary
                    .push(MutableTerm::from(difference.expanded_substitution(index)));
            }
            Ok(())
        } else {
            // Pop the expanded substitutions, check them against the
            // record, and install the simplified symbol.
            if self.primary.len() < arity + 1 {
                return Err(ReplayError::PrimaryStackUnderflow);
            }
            for index in (0..arity).rev() {
                let term = self
                    .primary
                    .pop()
                    .ok_or(ReplayError::PrimaryStackUnderflow)?;
                if Term::from(term) != difference.expanded_substitution(index) {
                    return Err(ReplayError::DifferenceMismatch);
                }
            }
            let top = self.top_mut()?;
            let symbol = Self::focused_symbol(top)?;
            if symbol != difference.lhs() {
                return Err(ReplayError::DifferenceMismatch);
            }
            top.replace_back(difference.rhs().clone());
            Ok(())
        }
    }
}

/// Replay `path` from `start`, returning the end term.
pub fn replay(
    system: &RewriteSystem,
    start: &Term,
    path: &RewritePath,
) -> Result<Term, ReplayError> {
    let mut evaluator = PathEvaluator::new(MutableTerm::from(start));
    evaluator.apply_path(path, system)?;
    evaluator.into_term()
}
