//! Unification, matching, and substitution modulo symbol theories

pub mod ac;
pub mod constrained;
pub mod diophantine;
pub mod eac;
mod matching;
pub mod mgu;
pub mod solve;
pub mod substitution;


pub use ac::unify_ac;
pub use constrained::{unify_constrained, Constraints};
pub use diophantine::HomogeneousSystem;
pub use eac::{unify_eac, EacSignature};
pub use matching::match_term;
pub use mgu::{unify, unify_equations, UnificationResult};
pub use solve::{unify_problem, Theory};
pub use substitution::{Substitution, SubstitutionDisplay};
