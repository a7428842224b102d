//! Equations and unification problems

use super::term::{Term, Variable};
use crate::logic::interner::Interner;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A directed pair `lhs =? rhs`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Equation {
    pub lhs: Term,
    pub rhs: Term,
}

impl Equation {
    pub fn new(lhs: impl Into<Term>, rhs: impl Into<Term>) -> Self {
        Equation {
            lhs: lhs.into(),
            rhs: rhs.into(),
        }
    }

    /// Both sides are equal modulo the symbol theories
    pub fn is_trivial(&self) -> bool {
        self.lhs == self.rhs
    }

    pub fn swapped(&self) -> Equation {
        Equation {
            lhs: self.rhs.clone(),
            rhs: self.lhs.clone(),
        }
    }

    pub fn mentions(&self, var: &Variable) -> bool {
        self.lhs.contains_variable(var) || self.rhs.contains_variable(var)
    }

    pub fn collect_variables(&self, vars: &mut HashSet<Variable>) {
        self.lhs.collect_variables(vars);
        self.rhs.collect_variables(vars);
    }

    pub fn display<'a>(&'a self, interner: &'a Interner) -> EquationDisplay<'a> {
        EquationDisplay {
            equation: self,
            interner,
        }
    }
}

pub struct EquationDisplay<'a> {
    equation: &'a Equation,
    interner: &'a Interner,
}

impl<'a> fmt::Display for EquationDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} =? {}",
            self.equation.lhs.display(self.interner),
            self.equation.rhs.display(self.interner)
        )
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} =? {}", self.lhs, self.rhs)
    }
}

/// A set of equations, deduplicated modulo the symbol theories.
///
/// Iteration follows insertion order so that every procedure consuming a
/// problem is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnificationProblem {
    equations: IndexSet<Equation>,
}

impl UnificationProblem {
    pub fn new() -> Self {
        UnificationProblem {
            equations: IndexSet::new(),
        }
    }

    /// Returns false if an equal equation was already present
    pub fn insert(&mut self, equation: Equation) -> bool {
        self.equations.insert(equation)
    }

    pub fn push(&mut self, lhs: impl Into<Term>, rhs: impl Into<Term>) -> bool {
        self.insert(Equation::new(lhs, rhs))
    }

    pub fn remove(&mut self, equation: &Equation) -> bool {
        self.equations.shift_remove(equation)
    }

    pub fn contains(&self, equation: &Equation) -> bool {
        self.equations.contains(equation)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Equation> {
        self.equations.iter()
    }

    pub fn len(&self) -> usize {
        self.equations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equations.is_empty()
    }

    /// Distinct variables in order of first occurrence
    pub fn variables(&self) -> IndexSet<Variable> {
        self.equations
            .iter()
            .flat_map(|e| e.lhs.variables().into_iter().chain(e.rhs.variables()))
            .collect()
    }

    pub fn display<'a>(&'a self, interner: &'a Interner) -> ProblemDisplay<'a> {
        ProblemDisplay {
            problem: self,
            interner,
        }
    }
}

impl FromIterator<Equation> for UnificationProblem {
    fn from_iter<I: IntoIterator<Item = Equation>>(iter: I) -> Self {
        UnificationProblem {
            equations: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for UnificationProblem {
    type Item = Equation;
    type IntoIter = indexmap::set::IntoIter<Equation>;

    fn into_iter(self) -> Self::IntoIter {
        self.equations.into_iter()
    }
}

impl<'a> IntoIterator for &'a UnificationProblem {
    type Item = &'a Equation;
    type IntoIter = indexmap::set::Iter<'a, Equation>;

    fn into_iter(self) -> Self::IntoIter {
        self.equations.iter()
    }
}

pub struct ProblemDisplay<'a> {
    problem: &'a UnificationProblem,
    interner: &'a Interner,
}

impl<'a> fmt::Display for ProblemDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, eq) in self.problem.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, " {}", eq.display(self.interner))?;
        }
        if self.problem.is_empty() {
            write!(f, "}}")
        } else {
            write!(f, " }}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::SymbolTheory;

    #[test]
    fn test_problem_deduplicates_modulo_theory() {
        let mut interner = Interner::new();
        let f = interner.function("f", 2, SymbolTheory::Commutative);
        let x = Term::Variable(interner.variable("x"));
        let a = Term::Constant(interner.constant("a"));
        let b = Term::Constant(interner.constant("b"));

        let mut problem = UnificationProblem::new();
        assert!(problem.push(x.clone(), Term::app(f, vec![a.clone(), b.clone()])));
        assert!(!problem.push(x.clone(), Term::app(f, vec![b.clone(), a.clone()])));
        assert_eq!(problem.len(), 1);
        assert_eq!(
            problem.display(&interner).to_string(),
            "{ x =? f(a, b) }"
        );
    }

    #[test]
    fn test_problem_variables_in_first_occurrence_order() {
        let mut interner = Interner::new();
        let g = interner.function("g", 2, SymbolTheory::Free);
        let x = interner.variable("x");
        let y = interner.variable("y");

        let mut problem = UnificationProblem::new();
        problem.push(
            Term::app(g, vec![y.into(), x.into()]),
            Term::app(g, vec![x.into(), y.into()]),
        );
        let vars: Vec<_> = problem.variables().into_iter().collect();
        assert_eq!(vars, vec![y, x]);
    }
}
