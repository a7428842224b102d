//! Rewrite systems and normal forms

use super::rule::RewriteRule;
use crate::error::{Result, UnificationError};
use crate::logic::{Interner, Term};
use std::fmt;
use tracing::trace;

/// An ordered collection of rules without duplicates. Rules are tried in
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteSystem {
    rules: Vec<RewriteRule>,
}

impl RewriteSystem {
    pub fn new() -> Self {
        RewriteSystem { rules: Vec::new() }
    }

    /// Add a rule; returns false if it was already present
    pub fn push(&mut self, rule: RewriteRule) -> bool {
        if self.rules.contains(&rule) {
            return false;
        }
        self.rules.push(rule);
        true
    }

    /// Add every rule of another system
    pub fn extend(&mut self, other: &RewriteSystem) {
        for rule in &other.rules {
            self.push(rule.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RewriteRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn display<'a>(&'a self, interner: &'a Interner) -> SystemDisplay<'a> {
        SystemDisplay {
            system: self,
            interner,
        }
    }
}

impl FromIterator<RewriteRule> for RewriteSystem {
    fn from_iter<I: IntoIterator<Item = RewriteRule>>(iter: I) -> Self {
        let mut system = RewriteSystem::new();
        for rule in iter {
            system.push(rule);
        }
        system
    }
}

impl<'a> IntoIterator for &'a RewriteSystem {
    type Item = &'a RewriteRule;
    type IntoIter = std::slice::Iter<'a, RewriteRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// Normal form of `term` under `system`.
///
/// Each pass applies the first rule that rewrites the term and starts over;
/// the pass in which no rule applies returns the term. With `Some(bound)`,
/// pass number `k` (counting from 0) only runs if `k <= bound`, otherwise
/// the result is `BoundExceeded`. Without a bound a non-terminating system
/// loops forever.
pub fn normalize(term: &Term, system: &RewriteSystem, bound: Option<usize>) -> Result<Term> {
    let mut current = term.clone();
    let mut pass = 0usize;
    loop {
        if let Some(limit) = bound {
            if pass > limit {
                return Err(UnificationError::BoundExceeded(limit));
            }
        }
        match system.iter().find_map(|rule| rule.apply(&current)) {
            Some(next) => {
                trace!(pass, size = next.size(), "rewrite step");
                current = next;
            }
            None => return Ok(current),
        }
        pass += 1;
    }
}

pub struct SystemDisplay<'a> {
    system: &'a RewriteSystem,
    interner: &'a Interner,
}

impl<'a> fmt::Display for SystemDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.system.rules.as_slice() {
            [] => write!(f, "{{}}"),
            [rule] => write!(f, "{{ {} }}", rule.display(self.interner)),
            rules => {
                writeln!(f, "{{")?;
                for (i, rule) in rules.iter().enumerate() {
                    write!(f, "  {}", rule.display(self.interner))?;
                    if i + 1 < rules.len() {
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
