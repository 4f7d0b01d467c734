//! The rewrite system: the append-only rule and type-difference arenas,
//! the term simplifier, and the structural substitution passes.
//!
//! Rule and difference ids are indices into growable arenas and are never
//! invalidated: sweeps capture their bound up front, so rules appended
//! during a sweep are simply picked up by the next invocation.

use tracing::{debug, trace};

use req_term::{MutableTerm, Symbol, Term};
use rustc_hash::FxHashMap;

use crate::path::{RewritePath, RewriteStep};
use crate::rule::{Rule, RuleId};
use crate::type_difference::{DifferenceId, TypeDifference};

#[derive(Debug, Default)]
pub struct RewriteSystem {
    rules: Vec<Rule>,
    /// (lhs, rhs) → id, for add_rule deduplication.
    rule_index: FxHashMap<(Term, Term), RuleId>,
    differences: Vec<TypeDifference>,
}

impl RewriteSystem {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// # Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id]
    }

    pub fn get_rule(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(id)
    }

    pub(crate) fn rule_mut(&mut self, id: RuleId) -> &mut Rule {
        &mut self.rules[id]
    }

    /// # Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    pub fn type_difference(&self, id: DifferenceId) -> &TypeDifference {
        &self.differences[id]
    }

    pub fn get_type_difference(&self, id: DifferenceId) -> Option<&TypeDifference> {
        self.differences.get(id)
    }

    pub fn type_differences(&self) -> &[TypeDifference] {
        &self.differences
    }

    /// Register a rule lhs ⇒ rhs with an optional proof path.
    ///
    /// Returns `None` for a trivial identity (lhs equals rhs) and the
    /// existing id when the pair is already registered; either way nothing
    /// is appended.
    pub fn add_rule(
        &mut self,
        lhs: Term,
        rhs: Term,
        path: Option<RewritePath>,
    ) -> Option<RuleId> {
        if lhs == rhs {
            trace!("dropping trivial identity rule");
            return None;
        }
        let key = (lhs, rhs);
        if let Some(&id) = self.rule_index.get(&key) {
            return Some(id);
        }
        let (lhs, rhs) = key;
        let id = self.rules.len();
        self.rules.push(Rule::new(lhs.clone(), rhs.clone(), path));
        self.rule_index.insert((lhs, rhs), id);
        Some(id)
    }

    /// Record a type difference, deduplicating identical records.
    pub fn record_type_difference(&mut self, difference: TypeDifference) -> DifferenceId {
        if let Some(id) = self.differences.iter().position(|d| *d == difference) {
            return id;
        }
        let id = self.differences.len();
        self.differences.push(difference);
        id
    }

    /// Normalize `term` in place by repeatedly applying the leftmost
    /// matching rule, recording a `Rule` step per application when a path
    /// is supplied. Returns whether anything changed.
    ///
    /// Idempotent: simplifying an already-normal term reports no change and
    /// appends nothing. Termination is a property of the rule set, which
    /// the completion driver maintains; it is not re-verified here.
    pub fn simplify(&self, term: &mut MutableTerm, mut path: Option<&mut RewritePath>) -> bool {
        let mut changed = false;
        'restart: loop {
            for offset in 0..term.len() {
                let tail = &term.as_slice()[offset..];
                for (rule_id, rule) in self.rules.iter().enumerate() {
                    if !tail.starts_with(rule.lhs().symbols()) {
                        continue;
                    }
                    trace!(rule_id, offset, "applying rule");
                    term.splice(offset, rule.lhs().len(), rule.rhs().symbols());
                    if let Some(p) = path.as_deref_mut() {
                        p.push(RewriteStep::Rule {
                            offset,
                            rule: rule_id,
                            inverse: false,
                        });
                    }
                    changed = true;
                    continue 'restart;
                }
            }
            return changed;
        }
    }

    /// Structurally simplify the substitution terms of `symbol`, which must
    /// carry substitutions. Returns the replacement symbol if anything
    /// changed, extending `path` with exactly the proof steps needed.
    ///
    /// The Decompose/Shift scaffolding is emitted unconditionally and rolled
    /// back by truncation on a no-op, which keeps the loop uniform; a
    /// rolled-back segment never contains anything but Shift and Decompose
    /// steps.
    pub fn simplify_substitutions(
        &self,
        symbol: &Symbol,
        mut path: Option<&mut RewritePath>,
    ) -> Option<Symbol> {
        debug_assert!(symbol.has_substitutions());

        // Fast path if the type is fully concrete.
        let substitutions = symbol.substitutions();
        if substitutions.is_empty() {
            return None;
        }

        let old_len = path.as_deref().map_or(0, RewritePath::len);

        if let Some(p) = path.as_deref_mut() {
            // The focused term fans out into one reasoning target per
            // substitution; all but the first wait on the secondary
            // register.
            p.push(RewriteStep::Decompose {
                count: substitutions.len(),
                inverse: false,
            });
            for _ in 1..substitutions.len() {
                p.push(RewriteStep::Shift { inverse: false });
            }
        }

        let mut new_substitutions = Vec::with_capacity(substitutions.len());
        let mut any_changed = false;
        for (index, substitution) in substitutions.iter().enumerate() {
            // Bring the next substitution back into focus.
            if index != 0 {
                if let Some(p) = path.as_deref_mut() {
                    p.push(RewriteStep::Shift { inverse: true });
                }
            }

            let mut term = MutableTerm::from(substitution);
            any_changed |= self.simplify(&mut term, path.as_deref_mut());
            new_substitutions.push(Term::from(term));
        }

        if let Some(p) = path.as_deref_mut() {
            // Collect the simplified substitutions back into one symbol.
            p.push(RewriteStep::Decompose {
                count: substitutions.len(),
                inverse: true,
            });
        }

        if !any_changed {
            if let Some(p) = path {
                debug_assert!(
                    p.steps()[old_len..].iter().all(RewriteStep::is_bookkeeping),
                    "no-op rollback would discard a term-changing step"
                );
                p.truncate(old_len);
            }
            return None;
        }

        Some(symbol.with_substitutions(new_substitutions))
    }

    /// Re-derive, for every rule whose trailing LHS symbol carries
    /// unsimplified substitutions, an equivalent rule with a canonical LHS.
    ///
    /// A single sweep over the rules as they stood at entry; rules appended
    /// during the sweep are picked up by the next invocation, so the
    /// completion driver calls this repeatedly until no rule changes.
    pub fn simplify_lhs_substitutions(&mut self) {
        let end = self.rules.len();
        for rule_id in 0..end {
            let rule = &self.rules[rule_id];
            if rule.is_substitution_simplified() {
                continue;
            }

            let lhs = rule.lhs().clone();
            let symbol = lhs.back();
            if !symbol.has_substitutions() {
                continue;
            }

            let mut path = RewritePath::new();

            // The proof starts by asserting original-LHS ≡ original-RHS via
            // this very rule, read backward.
            path.push(RewriteStep::Rule {
                offset: 0,
                rule: rule_id,
                inverse: true,
            });

            let Some(new_symbol) = self.simplify_substitutions(symbol, Some(&mut path)) else {
                continue;
            };

            // We are going to register a replacement, so this rule is done.
            self.rules[rule_id].mark_substitution_simplified();

            let mut new_lhs = MutableTerm::from_slice(&lhs.symbols()[..lhs.len() - 1]);
            new_lhs.push(new_symbol);

            // Flip the proof around so it reads new-LHS ⇒ old-RHS.
            path.invert();

            let rhs = self.rules[rule_id].rhs().clone();
            let new_id = self.add_rule(Term::from(new_lhs), rhs, Some(path));
            debug!(rule_id, ?new_id, "replaced rule with substitution-simplified LHS");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::replay;
    use req_term::{ConcreteType, TypeShape};

    fn generic_param(index: u32) -> Symbol {
        Symbol::GenericParam { depth: 0, index }
    }

    fn array_of(sub: Term) -> Symbol {
        Symbol::Concrete(ConcreteType::new(
            TypeShape::Nominal(0, vec![TypeShape::Param(0)]),
            vec![sub],
        ))
    }

    fn pair_of(a: Term, b: Term) -> Symbol {
        Symbol::Concrete(ConcreteType::new(
            TypeShape::Nominal(1, vec![TypeShape::Param(0), TypeShape::Param(1)]),
            vec![a, b],
        ))
    }

    #[test]
    fn test_add_rule_identity_and_dedup() {
        let mut system = RewriteSystem::new();
        let u = Term::from_symbol(generic_param(1));
        let v = Term::from_symbol(generic_param(2));

        assert_eq!(system.add_rule(u.clone(), u.clone(), None), None);
        let id = system.add_rule(u.clone(), v.clone(), None).unwrap();
        assert_eq!(system.add_rule(u, v, None), Some(id));
        assert_eq!(system.rules().len(), 1);
    }

    #[test]
    fn test_simplify_is_idempotent() {
        let mut system = RewriteSystem::new();
        let u = Term::from_symbol(generic_param(1));
        let v = Term::from_symbol(generic_param(2));
        system.add_rule(u.clone(), v.clone(), None);

        let mut term = MutableTerm::from(&u);
        assert!(system.simplify(&mut term, None));
        assert_eq!(term.as_slice(), v.symbols());
        assert!(!system.simplify(&mut term, None));
    }

    #[test]
    fn test_simplify_records_replayable_path() {
        let mut system = RewriteSystem::new();
        let u = Term::from_symbol(generic_param(1));
        let v = Term::from_symbol(generic_param(2));
        let w = Term::from_symbol(generic_param(3));
        system.add_rule(u.clone(), v.clone(), None);
        system.add_rule(v.clone(), w.clone(), None);

        let mut path = RewritePath::new();
        let mut term = MutableTerm::from(&u);
        assert!(system.simplify(&mut term, Some(&mut path)));
        assert_eq!(term.as_slice(), w.symbols());

        assert_eq!(replay(&system, &u, &path).unwrap(), w);
        assert_eq!(replay(&system, &w, &path.inverted()).unwrap(), u);
    }

    #[test]
    fn test_simplify_substitutions_canonical_is_noop() {
        let mut system = RewriteSystem::new();
        let u = Term::from_symbol(generic_param(1));
        let v = Term::from_symbol(generic_param(2));
        system.add_rule(u, v.clone(), None);

        // Substitution already canonical: report no change, leave the
        // supplied path untouched.
        let symbol = array_of(v);
        let mut path = RewritePath::new();
        path.push(RewriteStep::Shift { inverse: false });
        let before = path.len();

        assert_eq!(system.simplify_substitutions(&symbol, Some(&mut path)), None);
        assert_eq!(path.len(), before);
    }

    #[test]
    fn test_simplify_substitutions_proof_validity() {
        let mut system = RewriteSystem::new();
        let u = Term::from_symbol(generic_param(1));
        let v = Term::from_symbol(generic_param(2));
        let x = Term::from_symbol(generic_param(4));
        system.add_rule(u.clone(), v.clone(), None);

        let symbol = pair_of(u.clone(), x.clone());
        let mut path = RewritePath::new();
        let new_symbol = system
            .simplify_substitutions(&symbol, Some(&mut path))
            .unwrap();
        assert_eq!(new_symbol, pair_of(v, x));

        // Replaying the path against T.σ yields T.σ'; the inverse path
        // restores the original.
        let start = Term::from_slice(&[generic_param(0), symbol]);
        let expected = Term::from_slice(&[generic_param(0), new_symbol]);
        assert_eq!(replay(&system, &start, &path).unwrap(), expected);
        assert_eq!(replay(&system, &expected, &path.inverted()).unwrap(), start);
    }

    #[test]
    fn test_fully_concrete_fast_path() {
        let system = RewriteSystem::new();
        let symbol = Symbol::Concrete(ConcreteType::nominal(0));
        let mut path = RewritePath::new();
        assert_eq!(system.simplify_substitutions(&symbol, Some(&mut path)), None);
        assert!(path.is_empty());
    }

    #[test]
    fn test_lhs_sweep_replaces_rule() {
        let mut system = RewriteSystem::new();
        let t = Term::from_symbol(generic_param(0));
        let u = Term::from_symbol(generic_param(1));
        let v = Term::from_symbol(generic_param(2));
        system.add_rule(u.clone(), v.clone(), None);

        let old_lhs = Term::from_slice(&[generic_param(0), array_of(u.clone())]);
        let rule_id = system.add_rule(old_lhs.clone(), t.clone(), None).unwrap();

        system.simplify_lhs_substitutions();

        assert!(system.rule(rule_id).is_substitution_simplified());
        assert_eq!(system.rules().len(), 3);

        let new_rule = system.rule(2);
        let new_lhs = Term::from_slice(&[generic_param(0), array_of(v.clone())]);
        assert_eq!(new_rule.lhs(), &new_lhs);
        assert_eq!(new_rule.rhs(), &t);

        // The recorded proof takes the new LHS all the way to the RHS.
        let path = new_rule.path().unwrap();
        assert_eq!(replay(&system, &new_lhs, path).unwrap(), t);
        assert_eq!(replay(&system, &t, &path.inverted()).unwrap(), new_lhs);
    }

    #[test]
    fn test_sweep_bound_excludes_appended_rules() {
        let mut system = RewriteSystem::new();
        let t = Term::from_symbol(generic_param(0));
        let u = Term::from_symbol(generic_param(1));
        let v = Term::from_symbol(generic_param(2));
        let w = Term::from_symbol(generic_param(3));
        system.add_rule(u.clone(), v.clone(), None);
        let rule_id = system
            .add_rule(
                Term::from_slice(&[generic_param(0), array_of(u.clone())]),
                t.clone(),
                None,
            )
            .unwrap();

        system.simplify_lhs_substitutions();
        assert_eq!(system.rules().len(), 3);
        assert!(system.rule(rule_id).is_substitution_simplified());
        // The appended replacement was not examined in the same sweep.
        assert!(!system.rule(2).is_substitution_simplified());

        // After V ⇒ W appears, the next invocation picks the replacement up.
        system.add_rule(v, w.clone(), None);
        system.simplify_lhs_substitutions();
        assert_eq!(system.rules().len(), 5);
        assert!(system.rule(2).is_substitution_simplified());
        assert_eq!(
            system.rule(4).lhs(),
            &Term::from_slice(&[generic_param(0), array_of(w)])
        );

        // Fixed point: a further sweep changes nothing.
        system.simplify_lhs_substitutions();
        assert_eq!(system.rules().len(), 5);
    }
}
