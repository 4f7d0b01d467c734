//! Term language for the requirement rewrite engine.
//!
//! Symbols are atomic requirement units; terms are non-empty symbol
//! sequences denoting requirement paths. Three symbol kinds carry nested
//! substitution terms, which is what the engine's substitution
//! simplification passes operate on.

pub mod display;
pub mod name;
pub mod symbol;
pub mod term;

pub use display::{DisplaySymbol, DisplayTerm};
pub use name::{NameId, NameTable};
pub use symbol::{ConcreteType, Symbol, TypeShape};
pub use term::{MutableTerm, Term};
