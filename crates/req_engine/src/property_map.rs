//! The property map: term → aggregated derived properties, and the
//! property-aware substitution simplification passes built on it.
//!
//! The map is keyed by canonical representative terms, which can be shorter
//! than a specific occurrence: a lookup matches the longest *suffix* of the
//! query that is a key, and returns the length of the unmatched prefix so
//! the caller can re-anchor whatever it finds onto the longer context.
//!
//! Population is driven by the enclosing completion loop; this layer only
//! consumes the concrete-type entries.

use smallvec::SmallVec;
use tracing::debug;

use req_term::{MutableTerm, Symbol, Term};
use rustc_hash::FxHashMap;

use crate::path::{RewritePath, RewriteStep};
use crate::rule::RuleId;
use crate::system::RewriteSystem;
use crate::type_difference::{DifferenceId, TypeDifference};

/// Aggregated properties discovered for one representative term.
#[derive(Debug, Clone)]
pub struct PropertyBag {
    key: Term,
    concrete_type: Option<Symbol>,
    concrete_type_rule: Option<RuleId>,
}

impl PropertyBag {
    fn new(key: Term) -> Self {
        PropertyBag {
            key,
            concrete_type: None,
            concrete_type_rule: None,
        }
    }

    #[inline]
    pub fn key(&self) -> &Term {
        &self.key
    }

    /// The concrete-type symbol bound to this term, if one was discovered.
    pub fn concrete_type(&self) -> Option<&Symbol> {
        self.concrete_type.as_ref()
    }

    /// The rule that established the concrete-type binding.
    pub fn concrete_type_rule(&self) -> Option<RuleId> {
        self.concrete_type_rule
    }
}

#[derive(Debug, Clone, Default)]
pub struct PropertyMap {
    entries: Vec<PropertyBag>,
    /// Exact key → entry index; suffix matching probes this per suffix.
    index: FxHashMap<Term, usize>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[PropertyBag] {
        &self.entries
    }

    /// Record a concrete-type binding for `key`, established by `rule`.
    pub fn record_concrete_type(&mut self, key: Term, concrete_type: Symbol, rule: RuleId) {
        debug_assert!(concrete_type.has_substitutions());
        let index = match self.index.get(&key) {
            Some(&index) => index,
            None => {
                let index = self.entries.len();
                self.entries.push(PropertyBag::new(key.clone()));
                self.index.insert(key, index);
                index
            }
        };
        let bag = &mut self.entries[index];
        bag.concrete_type = Some(concrete_type);
        bag.concrete_type_rule = Some(rule);
    }

    /// Look up the longest suffix of `symbols` that is a key.
    ///
    /// Returns the bag and the length of the unmatched prefix.
    pub fn lookup(&self, symbols: &[Symbol]) -> Option<(&PropertyBag, usize)> {
        for start in 0..symbols.len() {
            if let Some(&index) = self.index.get(&symbols[start..]) {
                return Some((&self.entries[index], start));
            }
        }
        None
    }

    /// Property-aware counterpart of
    /// [`RewriteSystem::simplify_substitutions`]: additionally resolves
    /// substitution terms to concrete types discovered in the map.
    ///
    /// `base_term` is what the enclosing rule is about (its RHS); `symbol`
    /// is the substitution-bearing symbol under simplification. On success
    /// the recorded [`TypeDifference`]'s id is returned and `path` proves
    /// base-term-with-original-symbol ≡ base-term-with-simplified-symbol's
    /// concrete expansion.
    ///
    /// A substitution that changes structurally skips the map lookup for
    /// this invocation; the completion driver iterates to fixed point, so
    /// a concrete binding for the simplified spelling is picked up by a
    /// later sweep.
    pub fn concretely_simplify_substitutions(
        &self,
        system: &mut RewriteSystem,
        base_term: &Term,
        symbol: &Symbol,
        mut path: Option<&mut RewritePath>,
    ) -> Option<DifferenceId> {
        debug_assert!(symbol.has_substitutions());

        // Fast path if the type is fully concrete.
        let substitutions = symbol.substitutions();
        if substitutions.is_empty() {
            return None;
        }

        let old_len = path.as_deref().map_or(0, RewritePath::len);

        if let Some(p) = path.as_deref_mut() {
            p.push(RewriteStep::Decompose {
                count: substitutions.len(),
                inverse: false,
            });
            for _ in 1..substitutions.len() {
                p.push(RewriteStep::Shift { inverse: false });
            }
        }

        let mut same_types: SmallVec<[(usize, Term); 1]> = SmallVec::new();
        let mut concrete_types: SmallVec<[(usize, Symbol); 1]> = SmallVec::new();

        for (index, substitution) in substitutions.iter().enumerate() {
            if index != 0 {
                if let Some(p) = path.as_deref_mut() {
                    p.push(RewriteStep::Shift { inverse: true });
                }
            }

            let mut term = MutableTerm::from(substitution);
            if system.simplify(&mut term, path.as_deref_mut()) {
                // Re-spelled, same type.
                same_types.push((index, Term::from(term)));
                continue;
            }

            let Some((bag, prefix_len)) = self.lookup(term.as_slice()) else {
                continue;
            };
            let (Some(concrete), Some(rule)) = (bag.concrete_type(), bag.concrete_type_rule())
            else {
                continue;
            };

            // The entry may be keyed on a suffix of the substitution term;
            // re-anchor the binding onto the full occurrence.
            let prefix = &substitution.symbols()[..prefix_len];
            let concrete_symbol = concrete.prepend_prefix_to_substitutions(prefix);
            concrete_types.push((index, concrete_symbol));

            // If U.V is the substitution term and V is the key, the proof
            // applies U.(V ⇒ V.[concrete: C]) and then, when U is
            // non-empty, prepends U to C's own substitutions.
            if let Some(p) = path.as_deref_mut() {
                p.push(RewriteStep::Rule {
                    offset: prefix_len,
                    rule,
                    inverse: true,
                });
                if prefix_len > 0 {
                    p.push(RewriteStep::PrefixSubstitutions {
                        length: prefix_len,
                        inverse: false,
                    });
                }
            }
        }

        if same_types.is_empty() && concrete_types.is_empty() {
            if let Some(p) = path {
                debug_assert!(
                    p.steps()[old_len..].iter().all(RewriteStep::is_bookkeeping),
                    "no-op rollback would discard a term-changing step"
                );
                p.truncate(old_len);
            }
            return None;
        }

        let difference =
            TypeDifference::build(base_term.clone(), symbol.clone(), same_types, concrete_types);
        // Recording a difference always represents genuine progress.
        debug_assert_ne!(difference.lhs(), difference.rhs());
        let difference_id = system.record_type_difference(difference);

        if let Some(p) = path {
            p.push(RewriteStep::DecomposeConcrete {
                difference: difference_id,
                inverse: true,
            });
        }

        Some(difference_id)
    }

    /// Property-aware counterpart of
    /// [`RewriteSystem::simplify_lhs_substitutions`]: for every unsimplified
    /// property rule whose symbol carries substitutions, fold discovered
    /// concrete types in and register a rule that eliminates one layer of
    /// nontrivial nested substitution.
    ///
    /// Single sweep over the rules as of entry; the completion driver
    /// interleaves re-invocations with structural sweeps and property-map
    /// rebuilds until fixed point.
    pub fn concretely_simplify_lhs_substitutions(&self, system: &mut RewriteSystem) {
        let end = system.rules().len();
        for rule_id in 0..end {
            let rule = system.rule(rule_id);
            if rule.is_lhs_simplified()
                || rule.is_rhs_simplified()
                || rule.is_substitution_simplified()
            {
                continue;
            }

            let Some(symbol) = rule.property_symbol() else {
                continue;
            };
            if !symbol.has_substitutions() {
                continue;
            }
            let symbol = symbol.clone();
            let base_term = rule.rhs().clone();

            let mut path = RewritePath::new();
            let Some(difference_id) = self.concretely_simplify_substitutions(
                system,
                &base_term,
                &symbol,
                Some(&mut path),
            ) else {
                continue;
            };

            system.rule_mut(rule_id).mark_substitution_simplified();

            let difference = system.type_difference(difference_id);
            debug_assert_eq!(difference.lhs(), &symbol);
            let new_symbol = difference.rhs().clone();

            // The path so far takes T.σ to T.σ'. We want a proof from
            // T.σ' to T, so invert it and chain the original rule
            // T.σ ⇒ T on the end.
            path.invert();
            path.push(RewriteStep::Rule {
                offset: 0,
                rule: rule_id,
                inverse: false,
            });

            let mut new_lhs = MutableTerm::from(&base_term);
            new_lhs.push(new_symbol);
            let new_id = system.add_rule(Term::from(new_lhs), base_term, Some(path));
            debug!(rule_id, difference_id, ?new_id, "folded concrete types into rule");
        }
    }
}
