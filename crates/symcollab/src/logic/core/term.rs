//! Terms over a sorted signature with algebraic symbol theories
//!
//! A [`Term`] is kept in canonical shape by its constructors: applications of
//! associative (and AC) symbols are flattened and idempotent applications to
//! two equal arguments collapse. Equality and hashing are theory-aware:
//! arguments of commutative and AC symbols are compared as multisets.

use crate::error::{Result, UnificationError};
use crate::logic::interner::{ConstantId, FunctionId, Interner, SortId, VariableId};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Algebraic properties attached to a function symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolTheory {
    Free,
    Associative,
    Commutative,
    AssociativeCommutative,
    Idempotent,
}

impl SymbolTheory {
    pub fn is_associative(self) -> bool {
        matches!(
            self,
            SymbolTheory::Associative | SymbolTheory::AssociativeCommutative
        )
    }

    pub fn is_commutative(self) -> bool {
        matches!(
            self,
            SymbolTheory::Commutative | SymbolTheory::AssociativeCommutative
        )
    }
}

/// A sorted variable. Two variables are equal iff name and sort match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variable {
    pub id: VariableId,
    pub sort: SortId,
}

impl Variable {
    pub fn new(id: VariableId, sort: SortId) -> Self {
        Variable { id, sort }
    }

    /// Get the name of this variable from the interner
    pub fn name<'a>(&self, interner: &'a Interner) -> &'a str {
        interner.resolve_variable(self.id)
    }
}

/// A sorted constant symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Constant {
    pub id: ConstantId,
    pub sort: SortId,
}

impl Constant {
    pub fn new(id: ConstantId, sort: SortId) -> Self {
        Constant { id, sort }
    }

    pub fn name<'a>(&self, interner: &'a Interner) -> &'a str {
        interner.resolve_constant(self.id)
    }
}

/// A function symbol: name, arity, theory tag and its sorts.
///
/// All arguments share the `domain` sort; applications have sort `range`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionSymbol {
    pub id: FunctionId,
    pub arity: u8,
    pub theory: SymbolTheory,
    pub domain: SortId,
    pub range: SortId,
}

impl FunctionSymbol {
    pub fn name<'a>(&self, interner: &'a Interner) -> &'a str {
        interner.resolve_function(self.id)
    }
}

/// A term: variable, constant or function application
///
/// Build applications through [`Term::function`] or [`Term::app`] so the
/// canonical shape holds. Flattened associative applications may carry more
/// arguments than the symbol's arity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Term {
    Variable(Variable),
    Constant(Constant),
    Function(FunctionSymbol, Vec<Term>),
}

impl From<Variable> for Term {
    fn from(v: Variable) -> Self {
        Term::Variable(v)
    }
}

impl From<Constant> for Term {
    fn from(c: Constant) -> Self {
        Term::Constant(c)
    }
}

impl Term {
    /// Checked application: arity and argument sorts must fit the symbol.
    pub fn function(symbol: FunctionSymbol, args: Vec<Term>) -> Result<Term> {
        if args.len() != symbol.arity as usize {
            return Err(UnificationError::ArityMismatch(
                symbol.arity as usize,
                args.len(),
            ));
        }
        if let Some(bad) = args.iter().find(|a| a.sort() != symbol.domain) {
            return Err(UnificationError::SortMismatch {
                expected: symbol.domain,
                found: bad.sort(),
            });
        }
        Ok(Term::app(symbol, args))
    }

    /// Canonicalising application without sort or arity checks.
    ///
    /// Used when rebuilding terms whose arguments are already known to be
    /// well-sorted (substitution, rewriting, fresh-variable introduction).
    pub fn app(symbol: FunctionSymbol, args: Vec<Term>) -> Term {
        let mut args = if symbol.theory.is_associative() {
            let mut flat = Vec::with_capacity(args.len());
            for arg in args {
                match arg {
                    Term::Function(inner, inner_args) if inner == symbol => {
                        flat.extend(inner_args)
                    }
                    other => flat.push(other),
                }
            }
            flat
        } else {
            args
        };
        if symbol.theory == SymbolTheory::Idempotent && args.len() == 2 && args[0] == args[1] {
            return args.swap_remove(0);
        }
        Term::Function(symbol, args)
    }

    pub fn sort(&self) -> SortId {
        match self {
            Term::Variable(v) => v.sort,
            Term::Constant(c) => c.sort,
            Term::Function(f, _) => f.range,
        }
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Term::Variable(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_))
    }

    /// Root symbol of an application
    pub fn head(&self) -> Option<&FunctionSymbol> {
        match self {
            Term::Function(f, _) => Some(f),
            _ => None,
        }
    }

    /// Is this an application of `symbol`?
    pub fn is_rooted_at(&self, symbol: FunctionId) -> bool {
        self.head().is_some_and(|f| f.id == symbol)
    }

    pub fn args(&self) -> &[Term] {
        match self {
            Term::Function(_, args) => args,
            _ => &[],
        }
    }

    /// Variable occurrences, left to right, depth first, with repetition.
    pub fn variables(&self) -> Vec<Variable> {
        let mut out = Vec::new();
        self.push_variables(&mut out);
        out
    }

    fn push_variables(&self, out: &mut Vec<Variable>) {
        match self {
            Term::Variable(v) => out.push(*v),
            Term::Constant(_) => {}
            Term::Function(_, args) => {
                for arg in args {
                    arg.push_variables(out);
                }
            }
        }
    }

    pub fn collect_variables(&self, vars: &mut HashSet<Variable>) {
        match self {
            Term::Variable(v) => {
                vars.insert(*v);
            }
            Term::Constant(_) => {}
            Term::Function(_, args) => {
                for arg in args {
                    arg.collect_variables(vars);
                }
            }
        }
    }

    pub fn contains_variable(&self, var: &Variable) -> bool {
        match self {
            Term::Variable(v) => v == var,
            Term::Constant(_) => false,
            Term::Function(_, args) => args.iter().any(|arg| arg.contains_variable(var)),
        }
    }

    pub fn is_ground(&self) -> bool {
        match self {
            Term::Variable(_) => false,
            Term::Constant(_) => true,
            Term::Function(_, args) => args.iter().all(Term::is_ground),
        }
    }

    /// Number of nodes in the term tree
    pub fn size(&self) -> usize {
        1 + self.args().iter().map(Term::size).sum::<usize>()
    }

    /// All positions in pre-order (outermost first, then left to right).
    pub fn positions(&self) -> Vec<Vec<usize>> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        self.push_positions(&mut path, &mut out);
        out
    }

    fn push_positions(&self, path: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        out.push(path.clone());
        for (i, arg) in self.args().iter().enumerate() {
            path.push(i);
            arg.push_positions(path, out);
            path.pop();
        }
    }

    pub fn subterm_at(&self, path: &[usize]) -> Option<&Term> {
        match path.split_first() {
            None => Some(self),
            Some((&i, rest)) => self.args().get(i)?.subterm_at(rest),
        }
    }

    /// Replace the subterm at `path`, re-canonicalising every ancestor.
    pub fn replace_at(&self, path: &[usize], replacement: Term) -> Option<Term> {
        match path.split_first() {
            None => Some(replacement),
            Some((&i, rest)) => match self {
                Term::Function(f, args) => {
                    let child = args.get(i)?.replace_at(rest, replacement)?;
                    let mut new_args = args.clone();
                    new_args[i] = child;
                    Some(Term::app(*f, new_args))
                }
                _ => None,
            },
        }
    }

    /// Format this term with an interner for name resolution
    pub fn display<'a>(&'a self, interner: &'a Interner) -> TermDisplay<'a> {
        TermDisplay {
            term: self,
            interner,
        }
    }
}

/// Arguments of an associative application with nested same-symbol
/// applications spliced in. Constructors already flatten, this only matters
/// for terms built by hand or deserialised.
fn flat_args<'a>(symbol: &FunctionSymbol, args: &'a [Term], out: &mut Vec<&'a Term>) {
    for arg in args {
        match arg {
            Term::Function(inner, inner_args) if inner == symbol => {
                flat_args(symbol, inner_args, out)
            }
            other => out.push(other),
        }
    }
}

fn compared_args<'a>(symbol: &FunctionSymbol, args: &'a [Term]) -> Vec<&'a Term> {
    if symbol.theory.is_associative() {
        let mut out = Vec::with_capacity(args.len());
        flat_args(symbol, args, &mut out);
        out
    } else {
        args.iter().collect()
    }
}

fn multiset_eq(xs: &[&Term], ys: &[&Term]) -> bool {
    if xs.len() != ys.len() {
        return false;
    }
    let mut used = vec![false; ys.len()];
    xs.iter().all(|x| {
        match ys
            .iter()
            .enumerate()
            .position(|(j, y)| !used[j] && *x == *y)
        {
            Some(j) => {
                used[j] = true;
                true
            }
            None => false,
        }
    })
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Term::Variable(a), Term::Variable(b)) => a == b,
            (Term::Constant(a), Term::Constant(b)) => a == b,
            (Term::Function(f, xs), Term::Function(g, ys)) => {
                if f != g {
                    return false;
                }
                if !f.theory.is_associative() && !f.theory.is_commutative() {
                    return xs == ys;
                }
                let xs = compared_args(f, xs);
                let ys = compared_args(g, ys);
                if f.theory.is_commutative() {
                    multiset_eq(&xs, &ys)
                } else {
                    xs == ys
                }
            }
            _ => false,
        }
    }
}

impl Eq for Term {}

impl Hash for Term {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Term::Variable(v) => {
                0u8.hash(state);
                v.hash(state);
            }
            Term::Constant(c) => {
                1u8.hash(state);
                c.hash(state);
            }
            Term::Function(f, args) => {
                2u8.hash(state);
                f.hash(state);
                let args = compared_args(f, args);
                if f.theory.is_commutative() {
                    // Order-independent: hash the sorted argument hashes
                    let mut hashes: Vec<u64> = args
                        .iter()
                        .map(|arg| {
                            let mut h = DefaultHasher::new();
                            arg.hash(&mut h);
                            h.finish()
                        })
                        .collect();
                    hashes.sort_unstable();
                    hashes.hash(state);
                } else {
                    args.len().hash(state);
                    for arg in args {
                        arg.hash(state);
                    }
                }
            }
        }
    }
}

/// Display wrapper for Term that includes an interner for name resolution
pub struct TermDisplay<'a> {
    term: &'a Term,
    interner: &'a Interner,
}

impl<'a> fmt::Display for TermDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.term {
            Term::Variable(v) => write!(f, "{}", self.interner.resolve_variable(v.id)),
            Term::Constant(c) => write!(f, "{}", self.interner.resolve_constant(c.id)),
            Term::Function(func, args) => {
                write!(f, "{}", self.interner.resolve_function(func.id))?;
                write!(f, "(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg.display(self.interner))?;
                }
                write!(f, ")")
            }
        }
    }
}

// Display implementations that show IDs (for debugging without interner)

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}", self.id.as_u32())
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.id.as_u32())
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(v) => write!(f, "{}", v),
            Term::Constant(c) => write!(f, "{}", c),
            Term::Function(func, args) => {
                write!(f, "F{}(", func.id.as_u32())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestContext {
        interner: Interner,
    }

    impl TestContext {
        fn new() -> Self {
            TestContext {
                interner: Interner::new(),
            }
        }

        fn var(&mut self, name: &str) -> Term {
            Term::Variable(self.interner.variable(name))
        }

        fn const_(&mut self, name: &str) -> Term {
            Term::Constant(self.interner.constant(name))
        }

        fn sym(&mut self, name: &str, theory: SymbolTheory) -> FunctionSymbol {
            self.interner.function(name, 2, theory)
        }
    }

    #[test]
    fn test_ac_equality_is_flatten_invariant() {
        let mut ctx = TestContext::new();
        let f = ctx.sym("f", SymbolTheory::AssociativeCommutative);
        let (a, b, c) = (ctx.const_("a"), ctx.const_("b"), ctx.const_("c"));

        let left = Term::app(f, vec![Term::app(f, vec![a.clone(), b.clone()]), c.clone()]);
        let right = Term::app(f, vec![a.clone(), Term::app(f, vec![b.clone(), c.clone()])]);
        let reversed = Term::app(f, vec![c.clone(), b.clone(), a.clone()]);

        assert_eq!(left.args().len(), 3);
        assert_eq!(left, right);
        assert_eq!(left, reversed);
        assert_ne!(
            Term::app(f, vec![a.clone(), b.clone()]),
            Term::app(f, vec![a.clone(), a.clone()])
        );
    }

    #[test]
    fn test_associative_keeps_order() {
        let mut ctx = TestContext::new();
        let g = ctx.sym("g", SymbolTheory::Associative);
        let (a, b, c) = (ctx.const_("a"), ctx.const_("b"), ctx.const_("c"));

        let left = Term::app(g, vec![Term::app(g, vec![a.clone(), b.clone()]), c.clone()]);
        let right = Term::app(g, vec![a.clone(), Term::app(g, vec![b.clone(), c.clone()])]);
        assert_eq!(left, right);
        assert_ne!(left, Term::app(g, vec![c, b, a]));
    }

    #[test]
    fn test_commutative_is_not_flattened() {
        let mut ctx = TestContext::new();
        let h = ctx.sym("h", SymbolTheory::Commutative);
        let (a, b) = (ctx.const_("a"), ctx.const_("b"));

        let nested = Term::app(h, vec![Term::app(h, vec![a.clone(), b.clone()]), a.clone()]);
        assert_eq!(nested.args().len(), 2);
        assert_eq!(
            Term::app(h, vec![a.clone(), b.clone()]),
            Term::app(h, vec![b, a])
        );
    }

    #[test]
    fn test_idempotent_collapses_at_construction() {
        let mut ctx = TestContext::new();
        let i = ctx.sym("i", SymbolTheory::Idempotent);
        let x = ctx.var("x");
        let y = ctx.var("y");

        assert_eq!(Term::app(i, vec![x.clone(), x.clone()]), x);
        assert_eq!(Term::app(i, vec![x.clone(), y.clone()]).args().len(), 2);
    }

    #[test]
    fn test_hash_respects_theory_equality() {
        let mut ctx = TestContext::new();
        let f = ctx.sym("f", SymbolTheory::AssociativeCommutative);
        let (a, b, c) = (ctx.const_("a"), ctx.const_("b"), ctx.const_("c"));

        let mut set = HashSet::new();
        set.insert(Term::app(f, vec![a.clone(), Term::app(f, vec![b.clone(), c.clone()])]));
        assert!(set.contains(&Term::app(f, vec![c, a, b])));
    }

    #[test]
    fn test_hand_built_nested_term_compares_flat() {
        let mut ctx = TestContext::new();
        let f = ctx.sym("f", SymbolTheory::AssociativeCommutative);
        let (a, b, c) = (ctx.const_("a"), ctx.const_("b"), ctx.const_("c"));

        let nested = Term::Function(f, vec![Term::Function(f, vec![a.clone(), b.clone()]), c.clone()]);
        assert_eq!(nested, Term::app(f, vec![b, c, a]));
    }

    #[test]
    fn test_checked_constructor() {
        let mut ctx = TestContext::new();
        let bool_sort = ctx.interner.intern_sort("bool");
        let neg = ctx
            .interner
            .sorted_function("neg", 1, SymbolTheory::Free, bool_sort, bool_sort);
        let a = ctx.const_("a");
        let t = Term::Constant(ctx.interner.sorted_constant("true", bool_sort));

        assert!(matches!(
            Term::function(neg, vec![a]),
            Err(UnificationError::SortMismatch { .. })
        ));
        assert!(matches!(
            Term::function(neg, vec![t.clone(), t.clone()]),
            Err(UnificationError::ArityMismatch(1, 2))
        ));
        let ok = Term::function(neg, vec![t]).unwrap();
        assert_eq!(ok.sort(), bool_sort);
    }

    #[test]
    fn test_variables_in_order_with_repetition() {
        let mut ctx = TestContext::new();
        let g = ctx.sym("g", SymbolTheory::Free);
        let x = ctx.var("x");
        let y = ctx.var("y");
        let t = Term::app(g, vec![x.clone(), Term::app(g, vec![y.clone(), x.clone()])]);

        let names: Vec<_> = t
            .variables()
            .iter()
            .map(|v| v.name(&ctx.interner).to_string())
            .collect();
        assert_eq!(names, vec!["x", "y", "x"]);
    }

    #[test]
    fn test_positions_and_replace() {
        let mut ctx = TestContext::new();
        let g = ctx.sym("g", SymbolTheory::Free);
        let (a, b) = (ctx.const_("a"), ctx.const_("b"));
        let t = Term::app(g, vec![a.clone(), Term::app(g, vec![a.clone(), b.clone()])]);

        assert_eq!(t.positions(), vec![vec![], vec![0], vec![1], vec![1, 0], vec![1, 1]]);
        assert_eq!(t.subterm_at(&[1, 1]), Some(&b));
        assert_eq!(t.subterm_at(&[2]), None);

        let replaced = t.replace_at(&[1, 0], b.clone()).unwrap();
        assert_eq!(replaced.display(&ctx.interner).to_string(), "g(a, g(b, b))");
    }

    #[test]
    fn test_display() {
        let mut ctx = TestContext::new();
        let f = ctx.sym("f", SymbolTheory::Free);
        let x = ctx.var("x");
        let a = ctx.const_("a");
        let t = Term::app(f, vec![x, a]);
        assert_eq!(t.display(&ctx.interner).to_string(), "f(x, a)");
        assert_eq!(t.to_string(), "F0(V0, C0)");
    }
}
