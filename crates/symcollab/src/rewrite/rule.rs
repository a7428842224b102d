//! Rewrite rules

use crate::error::{Result, UnificationError};
use crate::logic::{match_term, Interner, Term};
use std::collections::HashSet;
use std::fmt;

/// A directed rule `lhs → rhs`. Every variable of `rhs` occurs in `lhs`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RewriteRule {
    lhs: Term,
    rhs: Term,
}

impl RewriteRule {
    /// Fails with `UnboundRuleVariable` when `rhs` has a variable that `lhs`
    /// lacks, and with `SortMismatch` when the sides have different sorts.
    pub fn new(lhs: Term, rhs: Term) -> Result<Self> {
        if lhs.sort() != rhs.sort() {
            return Err(UnificationError::SortMismatch {
                expected: lhs.sort(),
                found: rhs.sort(),
            });
        }
        let mut bound = HashSet::new();
        lhs.collect_variables(&mut bound);
        if let Some(var) = rhs.variables().into_iter().find(|v| !bound.contains(v)) {
            return Err(UnificationError::UnboundRuleVariable(var));
        }
        Ok(RewriteRule { lhs, rhs })
    }

    pub fn lhs(&self) -> &Term {
        &self.lhs
    }

    pub fn rhs(&self) -> &Term {
        &self.rhs
    }

    /// Rewrite once at the outermost-leftmost position where `lhs` matches.
    ///
    /// Returns `None` when no position matches.
    pub fn apply(&self, term: &Term) -> Option<Term> {
        term.positions().into_iter().find_map(|path| {
            let sigma = match_term(&self.lhs, term.subterm_at(&path)?)?;
            term.replace_at(&path, self.rhs.apply_substitution(&sigma))
        })
    }

    pub fn display<'a>(&'a self, interner: &'a Interner) -> RuleDisplay<'a> {
        RuleDisplay {
            rule: self,
            interner,
        }
    }
}

pub struct RuleDisplay<'a> {
    rule: &'a RewriteRule,
    interner: &'a Interner,
}

impl<'a> fmt::Display for RuleDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} → {}",
            self.rule.lhs.display(self.interner),
            self.rule.rhs.display(self.interner)
        )
    }
}
