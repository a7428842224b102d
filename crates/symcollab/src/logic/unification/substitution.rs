//! Variable substitutions

use crate::error::{Result, UnificationError};
use crate::logic::core::equation::{Equation, UnificationProblem};
use crate::logic::core::term::{Term, Variable};
use crate::logic::interner::Interner;
use indexmap::IndexMap;
use std::fmt;

/// A substitution mapping variables to terms.
///
/// Bindings are facts: [`Substitution::add`] refuses to rebind a variable to a
/// different term and refuses bindings that change the sort. Identity
/// bindings `x ↦ x` are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
    map: IndexMap<Variable, Term>,
}

impl Substitution {
    /// Create a new empty substitution
    pub fn new() -> Self {
        Substitution {
            map: IndexMap::new(),
        }
    }

    pub fn with_capacity(var_count: usize) -> Self {
        Substitution {
            map: IndexMap::with_capacity(var_count),
        }
    }

    /// Substitution with a single binding (sort-checked)
    pub fn singleton(var: Variable, term: Term) -> Result<Self> {
        let mut subst = Substitution::new();
        subst.add(var, term)?;
        Ok(subst)
    }

    /// Add a binding.
    ///
    /// Fails with `SortMismatch` if the sorts differ and with
    /// `ConflictingBinding` if `var` is already bound to a different term.
    pub fn add(&mut self, var: Variable, term: Term) -> Result<()> {
        check_sort(&var, &term)?;
        if let Some(existing) = self.map.get(&var) {
            if *existing != term {
                return Err(UnificationError::ConflictingBinding(var));
            }
            return Ok(());
        }
        if term != Term::Variable(var) {
            self.map.insert(var, term);
        }
        Ok(())
    }

    /// Overwrite the binding of `var` (sort-checked)
    pub fn replace(&mut self, var: Variable, term: Term) -> Result<()> {
        check_sort(&var, &term)?;
        self.map.shift_remove(&var);
        if term != Term::Variable(var) {
            self.map.insert(var, term);
        }
        Ok(())
    }

    pub fn remove(&mut self, var: &Variable) -> Option<Term> {
        self.map.shift_remove(var)
    }

    /// Add a binding and keep the substitution idempotent: existing bindings
    /// are applied to `term` and the new binding is applied to every
    /// existing range term. Callers have done the occurs and sort checks.
    pub(crate) fn insert_normalized(&mut self, var: Variable, term: Term) {
        let term = term.apply_substitution(self);
        let single = Substitution {
            map: IndexMap::from([(var, term.clone())]),
        };
        for existing in self.map.values_mut() {
            *existing = existing.apply_substitution(&single);
        }
        if term != Term::Variable(var) {
            self.map.insert(var, term);
        }
    }

    /// Composition `self * other`: first `self`, then `other`.
    ///
    /// `other` is applied to every range term of `self`, identity bindings
    /// are dropped, then the bindings of `other` for variables outside the
    /// domain of `self` are added.
    pub fn compose(&self, other: &Substitution) -> Substitution {
        let mut result = Substitution::with_capacity(self.map.len() + other.map.len());

        for (&var, term) in &self.map {
            let term = term.apply_substitution(other);
            if term != Term::Variable(var) {
                result.map.insert(var, term);
            }
        }

        for (&var, term) in &other.map {
            if !self.map.contains_key(&var) {
                result.map.insert(var, term.clone());
            }
        }

        result
    }

    /// Keep only the bindings of the given variables
    pub fn restrict<'a>(&self, vars: impl IntoIterator<Item = &'a Variable>) -> Substitution {
        let mut result = Substitution::new();
        for var in vars {
            if let Some(term) = self.map.get(var) {
                result.map.insert(*var, term.clone());
            }
        }
        result
    }

    /// No domain variable occurs in any range term
    pub fn is_idempotent(&self) -> bool {
        self.map
            .values()
            .all(|t| self.map.keys().all(|v| !t.contains_variable(v)))
    }

    /// Solved-form view: one equation `x =? t` per binding
    pub fn to_equations(&self) -> UnificationProblem {
        self.map
            .iter()
            .map(|(var, term)| Equation::new(*var, term.clone()))
            .collect()
    }

    pub fn get(&self, var: &Variable) -> Option<&Term> {
        self.map.get(var)
    }

    pub fn contains(&self, var: &Variable) -> bool {
        self.map.contains_key(var)
    }

    /// Bound variables. Not index-aligned with [`Substitution::range`] as a
    /// contract; use [`Substitution::iter`] for pairs.
    pub fn domain(&self) -> Vec<Variable> {
        self.map.keys().copied().collect()
    }

    pub fn range(&self) -> Vec<Term> {
        self.map.values().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Term)> {
        self.map.iter()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn display<'a>(&'a self, interner: &'a Interner) -> SubstitutionDisplay<'a> {
        SubstitutionDisplay {
            subst: self,
            interner,
        }
    }
}

fn check_sort(var: &Variable, term: &Term) -> Result<()> {
    if var.sort != term.sort() {
        return Err(UnificationError::SortMismatch {
            expected: var.sort,
            found: term.sort(),
        });
    }
    Ok(())
}

impl Term {
    /// Apply a substitution to this term. Applications are rebuilt through
    /// the canonicalising constructor, so flattening and idempotent
    /// collapse hold for the result.
    pub fn apply_substitution(&self, subst: &Substitution) -> Term {
        if subst.is_empty() {
            return self.clone();
        }
        match self {
            Term::Variable(v) => subst.map.get(v).cloned().unwrap_or_else(|| self.clone()),
            Term::Constant(_) => self.clone(),
            Term::Function(f, args) => {
                let new_args = args
                    .iter()
                    .map(|arg| arg.apply_substitution(subst))
                    .collect();
                Term::app(*f, new_args)
            }
        }
    }
}

impl Equation {
    pub fn apply_substitution(&self, subst: &Substitution) -> Equation {
        Equation {
            lhs: self.lhs.apply_substitution(subst),
            rhs: self.rhs.apply_substitution(subst),
        }
    }
}

/// Renders `{}`, `{ x ↦ a }`, or one binding per line sorted by name
pub struct SubstitutionDisplay<'a> {
    subst: &'a Substitution,
    interner: &'a Interner,
}

impl<'a> fmt::Display for SubstitutionDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bindings: Vec<(&str, &Term)> = self
            .subst
            .iter()
            .map(|(v, t)| (v.name(self.interner), t))
            .collect();
        bindings.sort_by(|a, b| a.0.cmp(b.0));

        match bindings.as_slice() {
            [] => write!(f, "{{}}"),
            [(name, term)] => write!(f, "{{ {} ↦ {} }}", name, term.display(self.interner)),
            _ => {
                writeln!(f, "{{")?;
                for (i, (name, term)) in bindings.iter().enumerate() {
                    write!(f, "  {} ↦ {}", name, term.display(self.interner))?;
                    if i + 1 < bindings.len() {
                        writeln!(f, ",")?;
                    } else {
                        writeln!(f)?;
                    }
                }
                write!(f, "}}")
            }
        }
    }
}
