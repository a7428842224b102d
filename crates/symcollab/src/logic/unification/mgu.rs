//! Most General Unifier (MGU) computation over the free theory

use super::substitution::Substitution;
use crate::error::UnificationError;
use crate::logic::{Equation, Term, Variable};

/// Result of a unification attempt
pub type UnificationResult = Result<Substitution, UnificationError>;

/// Unify two terms, returning a most general unifier (MGU) if one exists.
///
/// Applications are decomposed argument-wise regardless of the symbol's
/// theory, so for non-free symbols the result is a unifier but not
/// necessarily a most general one.
pub fn unify(term1: &Term, term2: &Term) -> UnificationResult {
    let mut subst = Substitution::new();
    unify_with_subst(term1, term2, &mut subst)?;
    Ok(subst)
}

/// Unify every equation of a set simultaneously
pub fn unify_equations<'a>(equations: impl IntoIterator<Item = &'a Equation>) -> UnificationResult {
    let mut subst = Substitution::new();
    for eq in equations {
        unify_with_subst(&eq.lhs, &eq.rhs, &mut subst)?;
    }
    Ok(subst)
}

/// Unify two terms with an existing substitution
pub(crate) fn unify_with_subst(
    term1: &Term,
    term2: &Term,
    subst: &mut Substitution,
) -> Result<(), UnificationError> {
    let t1 = term1.apply_substitution(subst);
    let t2 = term2.apply_substitution(subst);

    match (&t1, &t2) {
        // Same term - nothing to do
        _ if t1 == t2 => Ok(()),

        (Term::Variable(v), t) | (t, Term::Variable(v)) => {
            if v.sort != t.sort() {
                return Err(UnificationError::SortMismatch {
                    expected: v.sort,
                    found: t.sort(),
                });
            }
            if occurs_check(v, t) {
                Err(UnificationError::OccursCheck(*v, t.clone()))
            } else {
                subst.insert_normalized(*v, t.clone());
                Ok(())
            }
        }

        (Term::Constant(c1), Term::Constant(c2)) => {
            Err(UnificationError::ConstantClash(c1.id, c2.id))
        }

        (Term::Function(f1, args1), Term::Function(f2, args2)) => {
            if f1.id != f2.id {
                return Err(UnificationError::FunctionClash(f1.id, f2.id));
            }
            if args1.len() != args2.len() {
                return Err(UnificationError::ArityMismatch(args1.len(), args2.len()));
            }
            for (arg1, arg2) in args1.iter().zip(args2.iter()) {
                unify_with_subst(arg1, arg2, subst)?;
            }
            Ok(())
        }

        (Term::Function(f, _), Term::Constant(c)) | (Term::Constant(c), Term::Function(f, _)) => {
            Err(UnificationError::FunctionConstantClash(f.id, c.id))
        }
    }
}

/// Check if variable occurs in term (occurs check)
pub(crate) fn occurs_check(var: &Variable, term: &Term) -> bool {
    match term {
        Term::Variable(_) => false,
        _ => term.contains_variable(var),
    }
}
