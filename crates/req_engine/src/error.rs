use thiserror::Error;

use req_term::Symbol;

/// Failure replaying a rewrite path against a start term.
///
/// Paths built by the engine itself replay cleanly against their own start
/// terms; these errors surface when a downstream consumer checks a proof
/// against the wrong term or a hand-built path is malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error("primary stack is empty")]
    PrimaryStackUnderflow,
    #[error("secondary stack is empty")]
    SecondaryStackUnderflow,
    #[error("unknown rule id {0}")]
    UnknownRule(usize),
    #[error("unknown type difference id {0}")]
    UnknownDifference(usize),
    #[error("rule {rule} does not match the focused term at offset {offset}")]
    RuleMismatch { rule: usize, offset: usize },
    #[error("step requires a trailing substitution-bearing symbol, found {0:?}")]
    MissingSubstitutions(Symbol),
    #[error("decompose arity mismatch: symbol has {expected} substitutions, step carries {found}")]
    DecomposeArityMismatch { expected: usize, found: usize },
    #[error("substitution does not begin with the focused term's prefix")]
    PrefixMismatch,
    #[error("popped term does not match the recorded type difference")]
    DifferenceMismatch,
    #[error("replay finished with more than one term on the stacks")]
    UnbalancedStacks,
}
