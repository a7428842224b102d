//! symcollab: equational unification and term rewriting
//!
//! This library provides sorted terms over symbols with algebraic theories
//! (free, associative, commutative, AC, idempotent), syntactic and
//! AC unification, a transformation procedure for exponentiation over an AC
//! symbol, and a rewrite engine for computing normal forms. It is the
//! reasoning core used to check security properties of block-cipher modes
//! of operation.

pub mod config;
pub mod error;
pub mod logic;
pub mod rewrite;
pub mod theories;

pub use config::EngineConfig;
pub use error::{Result, UnificationError};

// Re-export commonly used types from logic
pub use logic::{
    Constant, Equation, FreshSupply, FunctionSymbol, Interner, SortId, SymbolTheory, Term,
    TermDag, UnificationProblem, Variable,
};

pub use logic::{
    match_term, unify, unify_ac, unify_constrained, unify_eac, unify_equations, unify_problem,
    Constraints, EacSignature, Substitution, Theory, UnificationResult,
};

pub use rewrite::{normalize, RewriteRule, RewriteSystem};
pub use theories::{idempotence_rule, Boolean, Field};
