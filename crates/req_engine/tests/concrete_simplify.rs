//! End-to-end scenarios for the substitution simplification passes,
//! exercising rule replacement and proof replay through the public API.

use req_engine::{replay, PropertyMap, RewriteSystem};
use req_term::{ConcreteType, NameTable, Symbol, Term, TypeShape};

fn generic_param(index: u32) -> Symbol {
    Symbol::GenericParam { depth: 0, index }
}

/// `T.[concrete: Array<U>] => T` where `U` simplifies to `V` via an
/// unrelated rule: the structural pass marks the original rule and
/// registers `T.[concrete: Array<V>] => T` with a replayable proof.
#[test]
fn test_structural_pass_end_to_end() {
    let mut names = NameTable::new();
    let array = names.intern("Array");

    let mut system = RewriteSystem::new();
    let t = Term::from_symbol(generic_param(0));
    let u = Term::from_symbol(generic_param(1));
    let v = Term::from_symbol(generic_param(2));
    system.add_rule(u.clone(), v.clone(), None);

    let array_of = |sub: Term| {
        Symbol::Concrete(ConcreteType::new(
            TypeShape::Nominal(array, vec![TypeShape::Param(0)]),
            vec![sub],
        ))
    };
    let old_lhs = Term::from_slice(&[generic_param(0), array_of(u.clone())]);
    let rule_id = system.add_rule(old_lhs.clone(), t.clone(), None).unwrap();

    system.simplify_lhs_substitutions();

    assert!(system.rule(rule_id).is_substitution_simplified());

    let new_lhs = Term::from_slice(&[generic_param(0), array_of(v)]);
    let new_rule = system
        .rules()
        .iter()
        .find(|r| r.lhs() == &new_lhs)
        .expect("replacement rule registered");
    assert_eq!(new_rule.rhs(), &t);

    // The proof takes the canonical LHS to the shared RHS, and inverts
    // back to the original spelling.
    let path = new_rule.path().unwrap();
    assert_eq!(replay(&system, &new_lhs, path).unwrap(), t);
    assert_eq!(replay(&system, &t, &path.inverted()).unwrap(), new_lhs);
}

/// `T.[concrete: Pair<U, Int>] => T` with the property map holding
/// `U => [concrete: String]` via rule R: the property-aware pass records a
/// type difference resolving substitution 0 through R with an empty prefix,
/// and registers `T.[concrete: Pair<String, Int>] => T`.
#[test]
fn test_concrete_resolution_end_to_end() {
    let mut names = NameTable::new();
    let pair = names.intern("Pair");
    let int = names.intern("Int");
    let string = names.intern("String");

    let mut system = RewriteSystem::new();
    let t = Term::from_symbol(generic_param(0));
    let u = Term::from_symbol(generic_param(1));

    // U.[concrete: String] => U, the property rule behind the map entry.
    let string_symbol = Symbol::Concrete(ConcreteType::nominal(string));
    let concrete_rule = system
        .add_rule(
            Term::from_slice(&[generic_param(1), string_symbol.clone()]),
            u.clone(),
            None,
        )
        .unwrap();

    let mut map = PropertyMap::new();
    map.record_concrete_type(u.clone(), string_symbol, concrete_rule);

    // T.[concrete: Pair<U, Int>] => T.
    let pair_symbol = Symbol::Concrete(ConcreteType::new(
        TypeShape::Nominal(pair, vec![TypeShape::Param(0), TypeShape::Nominal(int, vec![])]),
        vec![u.clone()],
    ));
    let old_lhs = Term::from_slice(&[generic_param(0), pair_symbol.clone()]);
    let rule_id = system.add_rule(old_lhs.clone(), t.clone(), None).unwrap();

    map.concretely_simplify_lhs_substitutions(&mut system);

    assert!(system.rule(rule_id).is_substitution_simplified());

    // One difference: substitution 0 resolved concretely, empty prefix.
    assert_eq!(system.type_differences().len(), 1);
    let difference = system.type_difference(0);
    assert_eq!(difference.lhs(), &pair_symbol);
    assert!(difference.same_types().is_empty());
    assert_eq!(difference.concrete_types().len(), 1);
    let (index, resolved) = &difference.concrete_types()[0];
    assert_eq!(*index, 0);
    assert!(resolved.substitutions().is_empty(), "empty prefix: no re-anchoring");

    // The synthesized rule folds String into the pair.
    let folded = Symbol::Concrete(ConcreteType::new(
        TypeShape::Nominal(
            pair,
            vec![
                TypeShape::Nominal(string, vec![]),
                TypeShape::Nominal(int, vec![]),
            ],
        ),
        vec![],
    ));
    let new_lhs = Term::from_slice(&[generic_param(0), folded]);
    let new_rule = system
        .rules()
        .iter()
        .find(|r| r.lhs() == &new_lhs)
        .expect("replacement rule registered");
    assert_eq!(new_rule.rhs(), &t);

    let path = new_rule.path().unwrap();
    assert_eq!(replay(&system, &new_lhs, path).unwrap(), t);
    assert_eq!(replay(&system, &t, &path.inverted()).unwrap(), new_lhs);
}

/// Interleaving the two passes converges: once every rule is canonical,
/// further sweeps neither append rules nor record differences.
#[test]
fn test_repeated_sweeps_reach_fixed_point() {
    let mut system = RewriteSystem::new();
    let t = Term::from_symbol(generic_param(0));
    let u = Term::from_symbol(generic_param(1));
    let v = Term::from_symbol(generic_param(2));
    system.add_rule(u.clone(), v.clone(), None);

    let box_of = |sub: Term| {
        Symbol::Concrete(ConcreteType::new(
            TypeShape::Nominal(0, vec![TypeShape::Param(0)]),
            vec![sub],
        ))
    };
    system.add_rule(
        Term::from_slice(&[generic_param(0), box_of(u.clone())]),
        t.clone(),
        None,
    );

    let map = PropertyMap::new();
    loop {
        let rules_before = system.rules().len();
        let differences_before = system.type_differences().len();
        system.simplify_lhs_substitutions();
        map.concretely_simplify_lhs_substitutions(&mut system);
        if system.rules().len() == rules_before
            && system.type_differences().len() == differences_before
        {
            break;
        }
    }

    // Every substitution-bearing LHS is now canonical.
    for rule in system.rules() {
        if rule.is_substitution_simplified() {
            continue;
        }
        let symbol = rule.lhs().back();
        if !symbol.has_substitutions() {
            continue;
        }
        assert_eq!(system.simplify_substitutions(symbol, None), None);
    }
}
