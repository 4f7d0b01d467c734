//! Substitution simplification for a requirement rewrite system.
//!
//! Every generic-requirement-derived fact is a directed rewrite rule over
//! symbolic terms. This crate keeps the substitution-bearing symbols of
//! those rules in canonical form, producing a machine-checkable rewrite
//! path for every transformation so downstream consumers can replay or
//! invert it without re-deriving anything:
//!
//! - [`RewriteSystem::simplify_lhs_substitutions`] rewrites each rule's
//!   trailing substitutions to the system's normal form.
//! - [`PropertyMap::concretely_simplify_lhs_substitutions`] additionally
//!   folds in concrete types discovered by the property map, recording the
//!   transformation as a reusable [`TypeDifference`].
//!
//! Both are single-sweep, re-invokable passes; the enclosing completion
//! driver runs them to fixed point.

pub mod error;
pub mod evaluator;
pub mod path;
pub mod property_map;
pub mod rule;
pub mod system;
pub mod type_difference;

pub use error::ReplayError;
pub use evaluator::{replay, PathEvaluator};
pub use path::{RewritePath, RewriteStep};
pub use property_map::{PropertyBag, PropertyMap};
pub use rule::{Rule, RuleId};
pub use system::RewriteSystem;
pub use type_difference::{DifferenceId, TypeDifference};
