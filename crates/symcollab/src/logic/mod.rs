//! Term algebra, substitutions and unification
//!
//! This module provides the fundamental types for equational reasoning:
//! sorted terms over symbols with algebraic theories, equations,
//! substitutions, and the unification procedures built on them.

pub mod core;
pub mod dag;
pub mod fresh;
pub mod interner;
pub mod unification;

// Re-export commonly used types
pub use core::equation::{Equation, EquationDisplay, ProblemDisplay, UnificationProblem};
pub use core::term::{Constant, FunctionSymbol, SymbolTheory, Term, TermDisplay, Variable};
pub use dag::{DagNode, NodeId, TermDag};
pub use fresh::FreshSupply;
pub use interner::{ConstantId, FunctionId, Interner, SortId, VariableId};
pub use unification::{
    match_term, unify, unify_ac, unify_constrained, unify_eac, unify_equations, unify_problem,
    Constraints, EacSignature, Substitution, Theory, UnificationResult,
};
