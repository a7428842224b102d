//! Dispatch a unification problem to the procedure for its theory

use super::ac::unify_ac;
use super::constrained::{check_constraints, Constraints};
use super::eac::{unify_eac, EacSignature};
use super::mgu::unify_equations;
use super::substitution::Substitution;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::logic::{Interner, UnificationProblem};
use tracing::debug;

/// The equational theory a problem is solved in
#[derive(Debug, Clone)]
pub enum Theory {
    /// Free function symbols
    Syntactic,
    /// Free symbols, with allowed instantiations for some variables
    Constrained(Constraints),
    /// One associative-commutative symbol plus free symbols
    AssociativeCommutative,
    /// Exponentiation distributing over an AC combiner
    ExpAc(EacSignature),
}

impl Theory {
    pub fn name(&self) -> &'static str {
        match self {
            Theory::Syntactic => "syntactic",
            Theory::Constrained(_) => "constrained",
            Theory::AssociativeCommutative => "ac",
            Theory::ExpAc(_) => "exp-ac",
        }
    }
}

/// Solve `problem` modulo `theory`.
///
/// Syntactic and constrained problems have at most one most general
/// unifier; AC and E-AC problems can have several. An empty result never
/// signals failure: failures are errors.
pub fn unify_problem(
    problem: &UnificationProblem,
    theory: &Theory,
    interner: &mut Interner,
    config: &EngineConfig,
) -> Result<Vec<Substitution>> {
    debug!(
        theory = theory.name(),
        equations = problem.len(),
        "solving unification problem"
    );
    match theory {
        Theory::Syntactic => Ok(vec![unify_equations(problem.iter())?]),
        Theory::Constrained(constraints) => {
            let sigma = unify_equations(problem.iter())?;
            check_constraints(&sigma, constraints)?;
            Ok(vec![sigma])
        }
        Theory::AssociativeCommutative => unify_ac(problem, interner, config),
        Theory::ExpAc(signature) => unify_eac(problem, signature, interner, config),
    }
}
