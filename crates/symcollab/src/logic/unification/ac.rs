//! AC unification for a single associative-commutative symbol
//!
//! Each equation over the AC symbol `f` becomes one row of a homogeneous
//! linear Diophantine system: the row counts how often every argument
//! (a variable, or a ground term treated as a constant) occurs on the left
//! minus on the right. The minimal solutions of the joint system are the
//! basis vectors; every subset of the basis that covers each variable and
//! uses each constant exactly once yields one unifier, in which a variable
//! is bound to the `f`-combination of the basis terms it is weighted with.
//! The returned set is complete.
//!
//! Equations that do not mention `f` at the root are solved syntactically
//! first and their unifier is composed with every AC unifier.

use super::diophantine::HomogeneousSystem;
use super::mgu::unify_equations;
use super::substitution::Substitution;
use crate::config::EngineConfig;
use crate::error::{Result, UnificationError};
use crate::logic::{Equation, FreshSupply, FunctionSymbol, Interner, Term, UnificationProblem};
use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::debug;

/// Subsets of the basis are enumerated as `u64` masks
const MAX_ENUMERABLE_BASIS: usize = 63;

/// All AC unifiers of a problem over at most one AC symbol.
///
/// A problem without any AC symbol is solved syntactically and yields a
/// single unifier. Fresh variables are named with `config.fresh_prefix`.
pub fn unify_ac(
    problem: &UnificationProblem,
    interner: &mut Interner,
    config: &EngineConfig,
) -> Result<Vec<Substitution>> {
    let mut fresh = FreshSupply::new(config.fresh_prefix.clone());
    unify_ac_with(problem.iter(), interner, &mut fresh, config)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Atom {
    Variable,
    Constant,
}

pub(crate) fn unify_ac_with<'a>(
    equations: impl IntoIterator<Item = &'a Equation>,
    interner: &mut Interner,
    fresh: &mut FreshSupply,
    config: &EngineConfig,
) -> Result<Vec<Substitution>> {
    let equations: Vec<&Equation> = equations.into_iter().filter(|e| !e.is_trivial()).collect();

    let symbol = match ac_symbol(&equations)? {
        Some(symbol) => symbol,
        None => return Ok(vec![unify_equations(equations)?]),
    };

    let (rooted, others): (Vec<&Equation>, Vec<&Equation>) = equations
        .into_iter()
        .partition(|e| e.lhs.is_rooted_at(symbol.id) || e.rhs.is_rooted_at(symbol.id));

    if others.iter().any(|e| mentions_symbol(&e.lhs, &symbol) || mentions_symbol(&e.rhs, &symbol)) {
        return Err(UnificationError::Unsupported(
            "AC symbol below a non-AC symbol".to_string(),
        ));
    }
    let base = unify_equations(others)?;

    let rooted: Vec<Equation> = rooted
        .into_iter()
        .map(|e| e.apply_substitution(&base))
        .filter(|e| !e.is_trivial())
        .collect();
    if rooted.is_empty() {
        return Ok(vec![base]);
    }
    for eq in &rooted {
        check_rooted_equation(eq, &symbol)?;
    }

    // Columns of the Diophantine system
    let mut atoms: IndexMap<Term, Atom> = IndexMap::new();
    let mut counts: Vec<IndexMap<Term, i64>> = Vec::with_capacity(rooted.len());
    for eq in &rooted {
        let mut row = IndexMap::new();
        for (side, sign) in [(&eq.lhs, 1i64), (&eq.rhs, -1i64)] {
            for arg in multiset(side, &symbol) {
                let kind = classify(arg, &symbol)?;
                atoms.entry(arg.clone()).or_insert(kind);
                *row.entry(arg.clone()).or_insert(0) += sign;
            }
        }
        counts.push(row);
    }

    // Atoms that balance out in every row take no part in the solution
    let active: Vec<(&Term, Atom)> = atoms
        .iter()
        .filter(|(atom, _)| counts.iter().any(|row| row.get(*atom).is_some_and(|&c| c != 0)))
        .map(|(atom, kind)| (atom, *kind))
        .collect();

    let mut system = HomogeneousSystem::new(active.len());
    for row in &counts {
        system.add_row(
            active
                .iter()
                .map(|(atom, _)| row.get(*atom).copied().unwrap_or(0))
                .collect(),
        )?;
    }

    let basis: Vec<Vec<u32>> = system
        .minimal_solutions(config.ac_max_frontier)?
        .into_iter()
        .filter(|v| usable(v, &active))
        .collect();
    debug!(
        equations = rooted.len(),
        columns = active.len(),
        basis = basis.len(),
        "AC basis computed"
    );
    let limit = config.ac_max_basis.min(MAX_ENUMERABLE_BASIS);
    if basis.len() > limit {
        return Err(UnificationError::SearchLimit(format!(
            "{} basis vectors exceed the limit of {}",
            basis.len(),
            limit
        )));
    }

    // One term per basis vector: its constant, or a fresh variable
    let basis_terms: Vec<Term> = basis
        .iter()
        .map(|v| {
            active
                .iter()
                .zip(v)
                .find(|((_, kind), &n)| *kind == Atom::Constant && n > 0)
                .map(|((atom, _), _)| Term::clone(atom))
                .unwrap_or_else(|| Term::Variable(fresh.fresh(interner, symbol.domain)))
        })
        .collect();

    let candidate = |mask: u64| -> Option<Substitution> {
        let theta = assemble(mask, &basis, &basis_terms, &active, &symbol)?;
        let unifier = base.compose(&theta);
        rooted
            .iter()
            .all(|e| e.lhs.apply_substitution(&theta) == e.rhs.apply_substitution(&theta))
            .then_some(unifier)
    };

    let subsets = 1u64..(1u64 << basis.len());
    let unifiers: Vec<Substitution> = if config.ac_parallel {
        subsets.into_par_iter().filter_map(candidate).collect()
    } else {
        subsets.filter_map(candidate).collect()
    };
    debug!(unifiers = unifiers.len(), "AC unifiers enumerated");

    if unifiers.is_empty() {
        return Err(UnificationError::UnsatisfiableConstraints(
            "no combination of Diophantine solutions covers every variable".to_string(),
        ));
    }
    Ok(unifiers)
}

/// The unique AC symbol of the problem, if any
fn ac_symbol(equations: &[&Equation]) -> Result<Option<FunctionSymbol>> {
    let mut found: Option<FunctionSymbol> = None;
    let mut stack: Vec<&Term> = equations.iter().flat_map(|e| [&e.lhs, &e.rhs]).collect();
    while let Some(term) = stack.pop() {
        if let Term::Function(f, args) = term {
            if f.theory.is_associative() && f.theory.is_commutative() {
                match found {
                    Some(g) if g.id != f.id => {
                        return Err(UnificationError::Unsupported(
                            "more than one AC symbol".to_string(),
                        ))
                    }
                    _ => found = Some(*f),
                }
            }
            stack.extend(args);
        }
    }
    Ok(found)
}

fn mentions_symbol(term: &Term, symbol: &FunctionSymbol) -> bool {
    term.is_rooted_at(symbol.id) || term.args().iter().any(|a| mentions_symbol(a, symbol))
}

/// An `f`-application never equals a constant or another symbol's
/// application, and a variable never equals an `f`-term containing it.
fn check_rooted_equation(eq: &Equation, symbol: &FunctionSymbol) -> Result<()> {
    let (other, rooted) = if eq.lhs.is_rooted_at(symbol.id) {
        (&eq.rhs, &eq.lhs)
    } else {
        (&eq.lhs, &eq.rhs)
    };
    match other {
        Term::Variable(v) if rooted.contains_variable(v) => {
            Err(UnificationError::OccursCheck(*v, rooted.clone()))
        }
        Term::Constant(c) => Err(UnificationError::FunctionConstantClash(symbol.id, c.id)),
        Term::Function(g, _) if g.id != symbol.id => {
            Err(UnificationError::FunctionClash(symbol.id, g.id))
        }
        _ => Ok(()),
    }
}

fn multiset<'t>(side: &'t Term, symbol: &FunctionSymbol) -> &'t [Term] {
    if side.is_rooted_at(symbol.id) {
        side.args()
    } else {
        std::slice::from_ref(side)
    }
}

fn classify(arg: &Term, symbol: &FunctionSymbol) -> Result<Atom> {
    if arg.sort() != symbol.domain {
        return Err(UnificationError::SortMismatch {
            expected: symbol.domain,
            found: arg.sort(),
        });
    }
    match arg {
        Term::Variable(_) => Ok(Atom::Variable),
        t if t.is_ground() => Ok(Atom::Constant),
        _ => Err(UnificationError::Unsupported(
            "non-ground alien subterm under an AC symbol".to_string(),
        )),
    }
}

/// A basis vector may use a constant at most once, and at most one constant
fn usable(v: &[u32], active: &[(&Term, Atom)]) -> bool {
    let constants: Vec<u32> = active
        .iter()
        .zip(v)
        .filter(|((_, kind), _)| *kind == Atom::Constant)
        .map(|(_, &n)| n)
        .filter(|&n| n > 0)
        .collect();
    constants.len() <= 1 && constants.iter().all(|&n| n == 1)
}

fn assemble(
    mask: u64,
    basis: &[Vec<u32>],
    basis_terms: &[Term],
    active: &[(&Term, Atom)],
    symbol: &FunctionSymbol,
) -> Option<Substitution> {
    let chosen: Vec<usize> = (0..basis.len()).filter(|j| mask & (1 << j) != 0).collect();
    let mut theta = Substitution::with_capacity(active.len());

    for (column, (atom, kind)) in active.iter().enumerate() {
        let total: u32 = chosen.iter().map(|&j| basis[j][column]).sum();
        match kind {
            Atom::Constant if total != 1 => return None,
            Atom::Constant => {}
            Atom::Variable if total == 0 => return None,
            Atom::Variable => {
                let mut args = Vec::with_capacity(total as usize);
                for &j in &chosen {
                    for _ in 0..basis[j][column] {
                        args.push(basis_terms[j].clone());
                    }
                }
                let term = if args.len() == 1 {
                    args.swap_remove(0)
                } else {
                    Term::app(*symbol, args)
                };
                let var = atom.as_variable()?;
                theta.add(*var, term).ok()?;
            }
        }
    }
    Some(theta)
}
