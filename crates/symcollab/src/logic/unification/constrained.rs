//! Syntactic unification under membership constraints

use super::mgu::{unify, UnificationResult};
use super::substitution::Substitution;
use crate::error::{Result, UnificationError};
use crate::logic::{Term, Variable};
use std::collections::{HashMap, HashSet};

/// Allowed instantiations per variable. Variables without an entry are
/// unconstrained.
pub type Constraints = HashMap<Variable, HashSet<Term>>;

/// Syntactic unification whose unifier must respect `constraints`.
///
/// The MGU is computed as usual; it is rejected if a constrained variable is
/// bound to a non-variable term outside its allowed set. Variable-to-variable
/// bindings always pass, since the other variable may still be instantiated
/// to an allowed term.
pub fn unify_constrained(left: &Term, right: &Term, constraints: &Constraints) -> UnificationResult {
    let sigma = unify(left, right)?;
    check_constraints(&sigma, constraints)?;
    Ok(sigma)
}

pub(crate) fn check_constraints(sigma: &Substitution, constraints: &Constraints) -> Result<()> {
    for (var, term) in sigma.iter() {
        if term.is_variable() {
            continue;
        }
        if let Some(allowed) = constraints.get(var) {
            if !allowed.contains(term) {
                return Err(UnificationError::UnsatisfiableConstraints(format!(
                    "{} ↦ {} is not an allowed instantiation",
                    var, term
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{Interner, SymbolTheory};

    #[test]
    fn test_constraint_accepts_allowed_term() {
        let mut interner = Interner::new();
        let f = interner.function("f", 2, SymbolTheory::Free);
        let g = interner.function("g", 1, SymbolTheory::Free);
        let x = interner.variable("x");
        let a = Term::Constant(interner.constant("a"));
        let ga = Term::app(g, vec![a.clone()]);

        let constraints = Constraints::from([(x, HashSet::from([ga.clone()]))]);
        let left = Term::app(f, vec![x.into(), a.clone()]);
        let right = Term::app(f, vec![ga.clone(), a.clone()]);

        let sigma = unify_constrained(&left, &right, &constraints).unwrap();
        assert_eq!(sigma.get(&x), Some(&ga));
    }

    #[test]
    fn test_constraint_rejects_other_term() {
        let mut interner = Interner::new();
        let g = interner.function("g", 1, SymbolTheory::Free);
        let x = interner.variable("x");
        let a = Term::Constant(interner.constant("a"));
        let b = Term::Constant(interner.constant("b"));

        let constraints = Constraints::from([(x, HashSet::from([Term::app(g, vec![a])]))]);
        let result = unify_constrained(&x.into(), &Term::app(g, vec![b]), &constraints);
        assert!(matches!(
            result,
            Err(UnificationError::UnsatisfiableConstraints(_))
        ));
    }

    #[test]
    fn test_unconstrained_and_variable_bindings_pass() {
        let mut interner = Interner::new();
        let x = interner.variable("x");
        let y = interner.variable("y");
        let a = Term::Constant(interner.constant("a"));

        let constraints = Constraints::from([(x, HashSet::new())]);
        assert!(unify_constrained(&x.into(), &y.into(), &constraints).is_ok());
        assert!(unify_constrained(&y.into(), &a, &constraints).is_ok());
    }

    #[test]
    fn test_occurs_check_still_applies() {
        let mut interner = Interner::new();
        let g = interner.function("g", 2, SymbolTheory::Free);
        let x = interner.variable("x");
        let a = Term::Constant(interner.constant("a"));

        let result = unify_constrained(
            &x.into(),
            &Term::app(g, vec![x.into(), a]),
            &Constraints::new(),
        );
        assert!(matches!(result, Err(UnificationError::OccursCheck(_, _))));
    }
}
