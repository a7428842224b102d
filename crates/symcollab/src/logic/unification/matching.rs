//! One-way matching for rewriting

use super::substitution::Substitution;
use crate::logic::{Term, Variable};
use std::collections::HashMap;

type Bindings = HashMap<Variable, Term>;

/// One-way match: find σ such that `pattern σ = term`.
///
/// Only pattern variables are instantiated; variables of `term` are treated
/// as constants. Binary commutative symbols are matched in both argument
/// orders, every other symbol argument-wise.
pub fn match_term(pattern: &Term, term: &Term) -> Option<Substitution> {
    let mut bindings = Bindings::new();
    if !match_with_bindings(pattern, term, &mut bindings) {
        return None;
    }
    let mut subst = Substitution::with_capacity(bindings.len());
    for (var, bound) in bindings {
        subst.add(var, bound).ok()?;
    }
    Some(subst)
}

fn match_with_bindings(pattern: &Term, term: &Term, bindings: &mut Bindings) -> bool {
    match (pattern, term) {
        (Term::Variable(v), t) => {
            if v.sort != t.sort() {
                return false;
            }
            match bindings.get(v) {
                Some(bound) => bound == t,
                None => {
                    bindings.insert(*v, t.clone());
                    true
                }
            }
        }
        (Term::Constant(c1), Term::Constant(c2)) => c1 == c2,
        (Term::Function(f1, args1), Term::Function(f2, args2)) => {
            if f1 != f2 || args1.len() != args2.len() {
                return false;
            }
            if f1.theory.is_commutative() && !f1.theory.is_associative() && args1.len() == 2 {
                let mut attempt = bindings.clone();
                if match_all(args1, args2, &mut attempt) {
                    *bindings = attempt;
                    return true;
                }
                let swapped = [args2[1].clone(), args2[0].clone()];
                return match_all(args1, &swapped, bindings);
            }
            match_all(args1, args2, bindings)
        }
        // A constant or application never matches a variable of the term
        _ => false,
    }
}

fn match_all(patterns: &[Term], terms: &[Term], bindings: &mut Bindings) -> bool {
    patterns
        .iter()
        .zip(terms)
        .all(|(p, t)| match_with_bindings(p, t, bindings))
}
