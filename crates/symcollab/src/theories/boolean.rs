//! Booleans as a rewrite theory
//!
//! Constants `true` and `false` of sort `bool` with negation, conjunction and
//! disjunction defined by rules on their first argument.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::logic::{Constant, FunctionSymbol, Interner, SortId, SymbolTheory, Term};
use crate::rewrite::{normalize, RewriteRule, RewriteSystem};

pub const BOOL_SORT_NAME: &str = "bool";

#[derive(Debug, Clone)]
pub struct Boolean {
    pub sort: SortId,
    pub true_: Constant,
    pub false_: Constant,
    pub neg: FunctionSymbol,
    pub andb: FunctionSymbol,
    pub orb: FunctionSymbol,
    rules: RewriteSystem,
}

impl Boolean {
    /// Declare the boolean signature in `interner` and build its rules
    pub fn new(interner: &mut Interner) -> Result<Self> {
        let sort = interner.intern_sort(BOOL_SORT_NAME);
        let true_ = interner.sorted_constant("true", sort);
        let false_ = interner.sorted_constant("false", sort);
        let neg = interner.sorted_function("neg", 1, SymbolTheory::Free, sort, sort);
        let andb = interner.sorted_function("andb", 2, SymbolTheory::Free, sort, sort);
        let orb = interner.sorted_function("orb", 2, SymbolTheory::Free, sort, sort);

        let n: Term = interner.sorted_variable("n", sort).into();
        let (t, f): (Term, Term) = (true_.into(), false_.into());

        let rules = [
            // neg(true) → false, neg(false) → true
            RewriteRule::new(Term::function(neg, vec![t.clone()])?, f.clone())?,
            RewriteRule::new(Term::function(neg, vec![f.clone()])?, t.clone())?,
            // andb(true, n) → n, andb(false, n) → false
            RewriteRule::new(Term::function(andb, vec![t.clone(), n.clone()])?, n.clone())?,
            RewriteRule::new(Term::function(andb, vec![f.clone(), n.clone()])?, f.clone())?,
            // orb(true, n) → true, orb(false, n) → n
            RewriteRule::new(Term::function(orb, vec![t.clone(), n.clone()])?, t.clone())?,
            RewriteRule::new(Term::function(orb, vec![f.clone(), n.clone()])?, n)?,
        ]
        .into_iter()
        .collect();

        Ok(Boolean {
            sort,
            true_,
            false_,
            neg,
            andb,
            orb,
            rules,
        })
    }

    pub fn rules(&self) -> &RewriteSystem {
        &self.rules
    }

    pub fn from_bool(&self, value: bool) -> Term {
        Term::Constant(if value { self.true_ } else { self.false_ })
    }

    /// The value of a normalised boolean; `None` for anything else
    pub fn to_bool(&self, term: &Term) -> Option<bool> {
        match term {
            Term::Constant(c) if *c == self.true_ => Some(true),
            Term::Constant(c) if *c == self.false_ => Some(false),
            _ => None,
        }
    }

    pub fn not(&self, t: Term) -> Result<Term> {
        Term::function(self.neg, vec![t])
    }

    pub fn and(&self, a: Term, b: Term) -> Result<Term> {
        Term::function(self.andb, vec![a, b])
    }

    pub fn or(&self, a: Term, b: Term) -> Result<Term> {
        Term::function(self.orb, vec![a, b])
    }

    /// Normal form under the boolean rules, bounded by `config.rewrite_bound`
    pub fn normal(&self, term: &Term, config: &EngineConfig) -> Result<Term> {
        normalize(term, &self.rules, config.rewrite_bound)
    }
}
