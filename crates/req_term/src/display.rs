//! Display formatting for symbols and terms.
//!
//! Symbols reference names by id, so they cannot implement `Display` on
//! their own; these wrappers borrow the [`NameTable`] alongside the value:
//! - `DisplayTerm`: dotted requirement path, e.g. `τ_0_0.[P:A].[concrete: Array<τ_0_0.B>]`
//! - `DisplaySymbol`: one symbol

use std::fmt;

use crate::name::NameTable;
use crate::symbol::{ConcreteType, Symbol, TypeShape};
use crate::term::Term;

pub struct DisplayTerm<'a> {
    pub names: &'a NameTable,
    pub term: &'a Term,
}

impl fmt::Display for DisplayTerm<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, symbol) in self.term.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(
                f,
                "{}",
                DisplaySymbol {
                    names: self.names,
                    symbol
                }
            )?;
        }
        Ok(())
    }
}

pub struct DisplaySymbol<'a> {
    pub names: &'a NameTable,
    pub symbol: &'a Symbol,
}

impl fmt::Display for DisplaySymbol<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.names;
        match self.symbol {
            Symbol::GenericParam { depth, index } => write!(f, "τ_{}_{}", depth, index),
            Symbol::Name(name) => write!(f, "{}", names.resolve(*name)),
            Symbol::Protocol(proto) => write!(f, "[{}]", names.resolve(*proto)),
            Symbol::AssocType { protocol, name } => {
                write!(f, "[{}:{}]", names.resolve(*protocol), names.resolve(*name))
            }
            Symbol::Layout(layout) => write!(f, "[layout: {}]", names.resolve(*layout)),
            Symbol::Superclass(ct) => {
                write!(f, "[superclass: {}]", DisplayConcreteType { names, ct })
            }
            Symbol::Concrete(ct) => {
                write!(f, "[concrete: {}]", DisplayConcreteType { names, ct })
            }
            Symbol::ConcreteConformance { ty, protocol } => write!(
                f,
                "[concrete: {} : {}]",
                DisplayConcreteType { names, ct: ty },
                names.resolve(*protocol)
            ),
        }
    }
}

struct DisplayConcreteType<'a> {
    names: &'a NameTable,
    ct: &'a ConcreteType,
}

impl fmt::Display for DisplayConcreteType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_shape(f, self.names, &self.ct.shape, &self.ct.substitutions)
    }
}

fn write_shape(
    f: &mut fmt::Formatter<'_>,
    names: &NameTable,
    shape: &TypeShape,
    substitutions: &[Term],
) -> fmt::Result {
    match shape {
        TypeShape::Param(i) => match substitutions.get(*i) {
            Some(term) => write!(f, "{}", DisplayTerm { names, term }),
            // Unbound parameter: shown positionally.
            None => write!(f, "τ_{}", i),
        },
        TypeShape::Nominal(name, args) => {
            write!(f, "{}", names.resolve(*name))?;
            if !args.is_empty() {
                write!(f, "<")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_shape(f, names, arg, substitutions)?;
                }
                write!(f, ">")?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{ConcreteType, Symbol, TypeShape};
    use crate::term::Term;

    #[test]
    fn test_display_term() {
        let mut names = NameTable::new();
        let p = names.intern("P");
        let a = names.intern("A");
        let term = Term::from_slice(&[
            Symbol::GenericParam { depth: 0, index: 0 },
            Symbol::AssocType { protocol: p, name: a },
        ]);
        assert_eq!(
            format!(
                "{}",
                DisplayTerm {
                    names: &names,
                    term: &term
                }
            ),
            "τ_0_0.[P:A]"
        );
    }

    #[test]
    fn test_display_concrete_symbol() {
        let mut names = NameTable::new();
        let pair = names.intern("Pair");
        let int = names.intern("Int");
        let symbol = Symbol::Concrete(ConcreteType::new(
            TypeShape::Nominal(
                pair,
                vec![TypeShape::Param(0), TypeShape::Nominal(int, vec![])],
            ),
            vec![Term::from_symbol(Symbol::GenericParam { depth: 0, index: 1 })],
        ));
        assert_eq!(
            format!(
                "{}",
                DisplaySymbol {
                    names: &names,
                    symbol: &symbol
                }
            ),
            "[concrete: Pair<τ_0_1, Int>]"
        );
    }
}
