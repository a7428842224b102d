//! Error types for symcollab

use crate::logic::interner::{ConstantId, FunctionId, SortId};
use crate::logic::{Term, Variable};
use thiserror::Error;

/// Every way a unification, matching or normalisation step can fail.
///
/// All variants are ordinary values: composite procedures treat any of them
/// as "this branch has no unifier" and propagate it outward.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnificationError {
    #[error("sort mismatch: expected {expected}, found {found}")]
    SortMismatch { expected: SortId, found: SortId },

    #[error("occurs check failed: {0} occurs in {1}")]
    OccursCheck(Variable, Term),

    #[error("function clash: F{} vs F{}", .0.as_u32(), .1.as_u32())]
    FunctionClash(FunctionId, FunctionId),

    #[error("arity mismatch: {0} vs {1}")]
    ArityMismatch(usize, usize),

    #[error("constant clash: C{} vs C{}", .0.as_u32(), .1.as_u32())]
    ConstantClash(ConstantId, ConstantId),

    #[error("function/constant clash: F{} vs C{}", .0.as_u32(), .1.as_u32())]
    FunctionConstantClash(FunctionId, ConstantId),

    #[error("{0} is already bound to a different term")]
    ConflictingBinding(Variable),

    #[error("unsatisfiable constraints: {0}")]
    UnsatisfiableConstraints(String),

    #[error("no normal form within {0} rewrite passes")]
    BoundExceeded(usize),

    #[error("search limit reached: {0}")]
    SearchLimit(String),

    #[error("unsupported problem: {0}")]
    Unsupported(String),

    #[error("rewrite rule right-hand side uses unbound variable {0}")]
    UnboundRuleVariable(Variable),
}

pub type Result<T> = std::result::Result<T, UnificationError>;
