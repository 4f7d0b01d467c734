//! Symbols: the atomic units of requirement terms.
//!
//! Most symbol kinds are substitution-free. Three kinds — superclass bounds,
//! concrete types and concrete conformances — carry an ordered list of
//! substitution terms, one per generic parameter position of the underlying
//! type. Symbols are immutable values; "changing" one means building a new
//! one.

use crate::name::NameId;
use crate::term::Term;

/// The structure of a concrete type, with `Param(i)` marking the position
/// bound by the i-th substitution term.
///
/// `Pair<τ_0, Int>` is `Nominal(Pair, [Param(0), Nominal(Int, [])])` with one
/// substitution term for `τ_0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeShape {
    /// Reference to a substitution term by position.
    Param(usize),
    /// A nominal type applied to zero or more argument shapes.
    Nominal(NameId, Vec<TypeShape>),
}

impl TypeShape {
    /// Rewrite every `Param(i)` through `f`, leaving nominal structure alone.
    pub fn map_params(&self, f: &mut impl FnMut(usize) -> TypeShape) -> TypeShape {
        match self {
            TypeShape::Param(i) => f(*i),
            TypeShape::Nominal(name, args) => TypeShape::Nominal(
                *name,
                args.iter().map(|arg| arg.map_params(f)).collect(),
            ),
        }
    }

    /// True if the shape contains no parameters.
    pub fn is_fully_concrete(&self) -> bool {
        match self {
            TypeShape::Param(_) => false,
            TypeShape::Nominal(_, args) => args.iter().all(TypeShape::is_fully_concrete),
        }
    }
}

/// A concrete type: a shape plus the ordered substitution terms its
/// parameters are bound to. Insertion order equals generic-parameter-position
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConcreteType {
    pub shape: TypeShape,
    pub substitutions: Vec<Term>,
}

impl ConcreteType {
    pub fn new(shape: TypeShape, substitutions: Vec<Term>) -> Self {
        ConcreteType {
            shape,
            substitutions,
        }
    }

    /// A nominal type with no parameters, e.g. `Int`.
    pub fn nominal(name: NameId) -> Self {
        ConcreteType {
            shape: TypeShape::Nominal(name, Vec::new()),
            substitutions: Vec::new(),
        }
    }

    /// Fold another concrete type into parameter position `index`.
    ///
    /// The substitution at `index` is removed and replaced by `other`'s
    /// substitutions; `Param` references are renumbered so they keep pointing
    /// at the same bindings. `Pair<τ_0, Int>` with `τ_0` folded to a fully
    /// concrete `String` becomes `Pair<String, Int>` with one substitution
    /// fewer.
    pub fn fold_param(&self, index: usize, other: &ConcreteType) -> ConcreteType {
        debug_assert!(index < self.substitutions.len());

        let spliced = other.substitutions.len();
        let shape = self.shape.map_params(&mut |i| {
            if i < index {
                TypeShape::Param(i)
            } else if i == index {
                // Inline the folded shape, shifting its params to the
                // position their substitutions were spliced into.
                other.shape.map_params(&mut |k| TypeShape::Param(index + k))
            } else {
                TypeShape::Param(i - 1 + spliced)
            }
        });

        let mut substitutions = Vec::with_capacity(self.substitutions.len() - 1 + spliced);
        substitutions.extend_from_slice(&self.substitutions[..index]);
        substitutions.extend_from_slice(&other.substitutions);
        substitutions.extend_from_slice(&self.substitutions[index + 1..]);

        ConcreteType {
            shape,
            substitutions,
        }
    }
}

/// An atomic requirement symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// A root generic parameter, e.g. `τ_0_1`.
    GenericParam { depth: u32, index: u32 },
    /// An unresolved associated type name.
    Name(NameId),
    /// A protocol, e.g. `[P]`.
    Protocol(NameId),
    /// An associated type resolved to its protocol, e.g. `[P:A]`.
    AssocType { protocol: NameId, name: NameId },
    /// A layout constraint, e.g. `[layout: AnyObject]`.
    Layout(NameId),
    /// A superclass bound. Carries substitutions.
    Superclass(ConcreteType),
    /// A concrete type binding. Carries substitutions.
    Concrete(ConcreteType),
    /// A concrete conformance of a concrete type to a protocol.
    /// Carries substitutions.
    ConcreteConformance { ty: ConcreteType, protocol: NameId },
}

impl Symbol {
    /// True for the three substitution-bearing kinds, regardless of whether
    /// the substitution list is currently empty.
    pub fn has_substitutions(&self) -> bool {
        matches!(
            self,
            Symbol::Superclass(_) | Symbol::Concrete(_) | Symbol::ConcreteConformance { .. }
        )
    }

    /// True for symbols that state a property of the term they decorate:
    /// conformance, layout, superclass or concrete type.
    pub fn is_property(&self) -> bool {
        matches!(
            self,
            Symbol::Protocol(_)
                | Symbol::Layout(_)
                | Symbol::Superclass(_)
                | Symbol::Concrete(_)
                | Symbol::ConcreteConformance { .. }
        )
    }

    /// The concrete type payload of a substitution-bearing symbol.
    pub fn concrete_type(&self) -> Option<&ConcreteType> {
        match self {
            Symbol::Superclass(ct)
            | Symbol::Concrete(ct)
            | Symbol::ConcreteConformance { ty: ct, .. } => Some(ct),
            _ => None,
        }
    }

    /// The ordered substitution terms, empty for substitution-free kinds.
    pub fn substitutions(&self) -> &[Term] {
        match self.concrete_type() {
            Some(ct) => &ct.substitutions,
            None => &[],
        }
    }

    /// Rebuild this symbol with a different substitution list.
    ///
    /// # Panics
    /// Debug-asserts that the symbol carries substitutions and that the
    /// arity is unchanged.
    pub fn with_substitutions(&self, substitutions: Vec<Term>) -> Symbol {
        debug_assert!(self.has_substitutions());
        debug_assert_eq!(substitutions.len(), self.substitutions().len());
        self.map_concrete_type(|ct| ConcreteType {
            shape: ct.shape.clone(),
            substitutions,
        })
    }

    /// Rebuild this symbol with a different concrete type payload, keeping
    /// the kind (superclass / concrete / concrete conformance).
    pub fn with_concrete_type(&self, ct: ConcreteType) -> Symbol {
        debug_assert!(self.has_substitutions());
        self.map_concrete_type(|_| ct)
    }

    fn map_concrete_type(&self, f: impl FnOnce(&ConcreteType) -> ConcreteType) -> Symbol {
        match self {
            Symbol::Superclass(ct) => Symbol::Superclass(f(ct)),
            Symbol::Concrete(ct) => Symbol::Concrete(f(ct)),
            Symbol::ConcreteConformance { ty, protocol } => Symbol::ConcreteConformance {
                ty: f(ty),
                protocol: *protocol,
            },
            other => other.clone(),
        }
    }

    /// Prepend `prefix` to every substitution term.
    ///
    /// Used to re-anchor a concrete binding discovered for a shorter term
    /// onto the longer context it is being used in: if the property map
    /// resolved `V` to `[concrete: Box<X>]` and the occurrence is `U.V`,
    /// the binding becomes `[concrete: Box<U.X>]`.
    pub fn prepend_prefix_to_substitutions(&self, prefix: &[Symbol]) -> Symbol {
        debug_assert!(self.has_substitutions());
        if prefix.is_empty() {
            return self.clone();
        }
        let substitutions = self
            .substitutions()
            .iter()
            .map(|t| t.with_prefix(prefix))
            .collect();
        self.with_substitutions(substitutions)
    }

    /// Remove a shared `length`-symbol prefix from every substitution term.
    ///
    /// Inverse of [`Symbol::prepend_prefix_to_substitutions`]. Returns `None`
    /// if some substitution does not start with `prefix` or would become
    /// empty.
    pub fn strip_prefix_from_substitutions(&self, prefix: &[Symbol]) -> Option<Symbol> {
        debug_assert!(self.has_substitutions());
        if prefix.is_empty() {
            return Some(self.clone());
        }
        let mut substitutions = Vec::with_capacity(self.substitutions().len());
        for t in self.substitutions() {
            substitutions.push(t.strip_prefix(prefix)?);
        }
        Some(self.with_substitutions(substitutions))
    }
}
