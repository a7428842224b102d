//! Unification modulo exponentiation over an AC combiner (E-AC)
//!
//! The theory has three binary symbols: `exp`, an AC combiner `f` and a
//! second symbol `g`, with
//!
//! ```text
//! exp(exp(x, y), z) = exp(x, f(y, z))
//! exp(g(x, y), z)   = g(exp(x, z), exp(y, z))
//! ```
//!
//! Equations are first purified into flat form `x =? t`, where `x` is a
//! variable and the arguments of `t` are variables or constants. A rule
//! system then rewrites the equation set, in four phases each run to a
//! fixpoint, until every variable has at most one definition besides its
//! `f`-equations:
//!
//! - (a) `x = y`: eliminate `x` everywhere and record `x ↦ y`
//! - (b) `x = exp(s, t1), x = exp(s, t2)`: the exponents are equal
//! - (c) `x = exp(s1, t), x = exp(s2, t)`: the bases are equal
//! - (d) `x = g(u1, v1), x = g(u2, v2)`: pairwise equal arguments
//! - (e) `x = exp(s, t), x = g(u, v)`: push `exp` into `g`
//! - (i) `x = exp(y, t1), y = exp(s, t2)`: compose the exponents
//! - (f), (f'), (g), (h): alternatives for two `exp` definitions that
//!   differ in both base and exponent; every alternative is explored
//!
//! Two definitions of one variable by free symbols are decomposed, and
//! definitions that can never meet (distinct constants, different heads
//! other than `exp` against `g`) fail. A cycle through the definitions is an
//! occurs-check failure.
//!
//! What remains is a pure AC problem over `f` plus definitional equations.
//! Each AC unifier is closed by syntactic unification of the definitions,
//! and the results are restricted to the variables of the input problem.

use super::ac::unify_ac_with;
use super::mgu::unify_equations;
use super::substitution::Substitution;
use crate::config::EngineConfig;
use crate::error::{Result, UnificationError};
use crate::logic::{
    Equation, FreshSupply, FunctionId, FunctionSymbol, Interner, SortId, Term,
    UnificationProblem, Variable,
};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// The three symbols of the E-AC theory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EacSignature {
    pub exp: FunctionSymbol,
    pub g: FunctionSymbol,
    /// The AC combiner of exponents
    pub f: FunctionSymbol,
}

impl EacSignature {
    pub fn new(exp: FunctionSymbol, g: FunctionSymbol, f: FunctionSymbol) -> Result<Self> {
        for symbol in [exp, g, f] {
            if symbol.arity != 2 {
                return Err(UnificationError::ArityMismatch(2, symbol.arity as usize));
            }
        }
        Ok(EacSignature { exp, g, f })
    }

    fn is_reserved(&self, id: FunctionId) -> bool {
        id == self.exp.id || id == self.g.id || id == self.f.id
    }
}

/// All E-AC unifiers of `problem`, restricted to its variables.
///
/// A problem that holds identically yields the single empty substitution.
pub fn unify_eac(
    problem: &UnificationProblem,
    signature: &EacSignature,
    interner: &mut Interner,
    config: &EngineConfig,
) -> Result<Vec<Substitution>> {
    let mut engine = Engine {
        signature: *signature,
        interner,
        fresh: FreshSupply::new(config.fresh_prefix.clone()),
        config,
        original: problem.variables(),
        steps: 0,
    };
    let state = engine.purify(problem)?;
    debug!(equations = state.equations.len(), "purified E-AC problem");
    let unifiers = engine.run(state)?;
    debug!(unifiers = unifiers.len(), steps = engine.steps, "E-AC unification finished");
    Ok(unifiers)
}

/// Equation set in flat form plus the variable eliminations done so far
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct State {
    equations: IndexSet<Equation>,
    solved: Substitution,
}

impl State {
    fn with(&self, remove: &[&Equation], add: impl IntoIterator<Item = Equation>) -> State {
        let mut equations = self.equations.clone();
        for eq in remove {
            equations.shift_remove(*eq);
        }
        equations.extend(add.into_iter().filter(|e| !e.is_trivial()));
        State {
            equations,
            solved: self.solved.clone(),
        }
    }

    /// Ordered pairs of distinct equations defining the same variable
    fn pairs(&self) -> Vec<(&Equation, &Equation)> {
        let eqs: Vec<&Equation> = self.equations.iter().collect();
        let mut out = Vec::new();
        for (i, e1) in eqs.iter().enumerate() {
            for e2 in &eqs[i + 1..] {
                if e1.lhs == e2.lhs {
                    out.push((*e1, *e2));
                }
            }
        }
        out
    }

    fn definitions_of<'s>(&'s self, var: &'s Variable) -> impl Iterator<Item = &'s Equation> {
        self.equations
            .iter()
            .filter(move |e| e.lhs.as_variable() == Some(var))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Eliminate,
    SameBase,
    SameExponent,
    MergeG,
    Decompose,
    Distribute,
    Compose,
}

const MERGE: &[Rule] = &[
    Rule::SameBase,
    Rule::SameExponent,
    Rule::MergeG,
    Rule::Decompose,
];

const MERGE_DISTRIBUTE: &[Rule] = &[
    Rule::SameBase,
    Rule::SameExponent,
    Rule::MergeG,
    Rule::Decompose,
    Rule::Distribute,
];

impl Rule {
    fn name(self) -> &'static str {
        match self {
            Rule::Eliminate => "a",
            Rule::SameBase => "b",
            Rule::SameExponent => "c",
            Rule::MergeG => "d",
            Rule::Decompose => "decompose",
            Rule::Distribute => "e",
            Rule::Compose => "i",
        }
    }
}

struct Engine<'a> {
    signature: EacSignature,
    interner: &'a mut Interner,
    fresh: FreshSupply,
    config: &'a EngineConfig,
    original: IndexSet<Variable>,
    steps: usize,
}

impl<'a> Engine<'a> {
    fn fresh_var(&mut self, sort: SortId) -> Variable {
        self.fresh.fresh(self.interner, sort)
    }

    fn tick(&mut self) -> Result<()> {
        self.steps += 1;
        if self.steps > self.config.eac_max_steps {
            return Err(UnificationError::SearchLimit(format!(
                "E-AC exceeded {} rule applications",
                self.config.eac_max_steps
            )));
        }
        Ok(())
    }

    // Purification

    fn purify(&mut self, problem: &UnificationProblem) -> Result<State> {
        let mut equations = IndexSet::new();
        for eq in problem.iter().filter(|e| !e.is_trivial()) {
            if eq.lhs.sort() != eq.rhs.sort() {
                return Err(UnificationError::SortMismatch {
                    expected: eq.lhs.sort(),
                    found: eq.rhs.sort(),
                });
            }
            match (&eq.lhs, &eq.rhs) {
                (Term::Variable(x), t) | (t, Term::Variable(x)) => {
                    let flat = self.flatten(t, &mut equations);
                    equations.insert(Equation::new(*x, flat));
                }
                (s, t) => {
                    let v = self.fresh_var(s.sort());
                    let left = self.flatten(s, &mut equations);
                    let right = self.flatten(t, &mut equations);
                    equations.insert(Equation::new(v, left));
                    equations.insert(Equation::new(v, right));
                }
            }
        }
        equations.retain(|e: &Equation| !e.is_trivial());
        Ok(State {
            equations,
            solved: Substitution::new(),
        })
    }

    /// Name every nested application by a fresh variable
    fn flatten(&mut self, term: &Term, out: &mut IndexSet<Equation>) -> Term {
        let Term::Function(symbol, args) = term else {
            return term.clone();
        };
        let mut flat_args = Vec::with_capacity(args.len());
        for arg in args {
            if let Term::Function(..) = arg {
                let inner = self.flatten(arg, out);
                let v = self.fresh_var(arg.sort());
                out.insert(Equation::new(v, inner));
                flat_args.push(Term::Variable(v));
            } else {
                flat_args.push(arg.clone());
            }
        }
        Term::app(*symbol, flat_args)
    }

    // Phases

    fn run(&mut self, state: State) -> Result<Vec<Substitution>> {
        // Phase 1
        let state = self.exhaust(state, &[Rule::Compose])?;
        let state = self.exhaust(state, &[Rule::Eliminate])?;
        debug!(phase = 1, equations = state.equations.len(), "E-AC phase complete");

        // Phase 2
        let state = self.exhaust(state, MERGE)?;
        let state = self.exhaust(state, &[Rule::Eliminate])?;
        debug!(phase = 2, equations = state.equations.len(), "E-AC phase complete");

        // Phase 3
        let state = self.exhaust(state, MERGE)?;
        let state = self.exhaust(state, &[Rule::Eliminate])?;
        let state = self.exhaust(state, &[Rule::Compose])?;
        let state = self.exhaust(state, &[Rule::Distribute])?;
        let state = self.exhaust(state, MERGE)?;
        let state = self.exhaust(state, &[Rule::Eliminate])?;
        debug!(phase = 3, equations = state.equations.len(), "E-AC phase complete");

        self.branch(state)
    }

    /// Apply the first applicable rule until none applies
    fn exhaust(&mut self, mut state: State, rules: &[Rule]) -> Result<State> {
        self.validate(&state)?;
        'saturate: loop {
            for &rule in rules {
                if let Some(next) = self.apply(rule, &state)? {
                    self.tick()?;
                    trace!(rule = rule.name(), step = self.steps, "E-AC rule applied");
                    self.validate(&next)?;
                    state = next;
                    continue 'saturate;
                }
            }
            return Ok(state);
        }
    }

    /// Phase 4: saturate, then branch on a pair of `exp` definitions that
    /// differ in base and exponent.
    fn branch(&mut self, state: State) -> Result<Vec<Substitution>> {
        let state = self.settle(state)?;
        let Some(alternatives) = self.alternatives(&state) else {
            let state = self.exhaust(state, &[Rule::Eliminate])?;
            return self.finalize(state);
        };

        let mut unifiers: Vec<Substitution> = Vec::new();
        let mut first_error = None;
        for (label, alternative) in alternatives {
            self.tick()?;
            trace!(rule = label, step = self.steps, "E-AC branch");
            match alternative.and_then(|alt| self.branch(alt)) {
                Ok(found) => {
                    for unifier in found {
                        if !unifiers.contains(&unifier) {
                            unifiers.push(unifier);
                        }
                    }
                }
                Err(e @ UnificationError::SearchLimit(_)) => return Err(e),
                Err(e) => {
                    trace!(rule = label, error = %e, "E-AC branch failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        if unifiers.is_empty() {
            return Err(first_error.unwrap_or_else(|| {
                UnificationError::UnsatisfiableConstraints("no E-AC branch succeeded".to_string())
            }));
        }
        Ok(unifiers)
    }

    fn settle(&mut self, mut state: State) -> Result<State> {
        loop {
            let before = state.clone();
            state = self.exhaust(state, &[Rule::Compose])?;
            state = self.exhaust(state, MERGE_DISTRIBUTE)?;
            state = self.exhaust(state, &[Rule::Eliminate])?;
            if state == before {
                return Ok(state);
            }
        }
    }

    fn apply(&mut self, rule: Rule, state: &State) -> Result<Option<State>> {
        match rule {
            Rule::Eliminate => eliminate(state),
            Rule::SameBase => self.same_base(state),
            Rule::SameExponent => self.same_exponent(state),
            Rule::MergeG => self.merge_g(state),
            Rule::Decompose => self.decompose(state),
            Rule::Distribute => self.distribute(state),
            Rule::Compose => self.compose_exponents(state),
        }
    }

    // Rules

    fn exp_parts<'t>(&self, term: &'t Term) -> Option<(&'t Term, &'t Term)> {
        match term {
            Term::Function(h, args) if h.id == self.signature.exp.id && args.len() == 2 => {
                Some((&args[0], &args[1]))
            }
            _ => None,
        }
    }

    fn g_parts<'t>(&self, term: &'t Term) -> Option<(&'t Term, &'t Term)> {
        match term {
            Term::Function(h, args) if h.id == self.signature.g.id && args.len() == 2 => {
                Some((&args[0], &args[1]))
            }
            _ => None,
        }
    }

    fn exp(&self, base: Term, exponent: Term) -> Term {
        Term::app(self.signature.exp, vec![base, exponent])
    }

    fn combine(&self, left: Term, right: Term) -> Term {
        Term::app(self.signature.f, vec![left, right])
    }

    fn same_base(&mut self, state: &State) -> Result<Option<State>> {
        for (e1, e2) in state.pairs() {
            if let (Some((s1, t1)), Some((s2, t2))) = (self.exp_parts(&e1.rhs), self.exp_parts(&e2.rhs)) {
                if s1 == s2 {
                    return Ok(Some(state.with(&[e2], orient(t1, t2)?)));
                }
            }
        }
        Ok(None)
    }

    fn same_exponent(&mut self, state: &State) -> Result<Option<State>> {
        for (e1, e2) in state.pairs() {
            if let (Some((s1, t1)), Some((s2, t2))) = (self.exp_parts(&e1.rhs), self.exp_parts(&e2.rhs)) {
                if t1 == t2 {
                    return Ok(Some(state.with(&[e2], orient(s1, s2)?)));
                }
            }
        }
        Ok(None)
    }

    fn merge_g(&mut self, state: &State) -> Result<Option<State>> {
        for (e1, e2) in state.pairs() {
            if let (Some((u1, v1)), Some((u2, v2))) = (self.g_parts(&e1.rhs), self.g_parts(&e2.rhs)) {
                let added: Vec<Equation> = orient(u1, u2)?.into_iter().chain(orient(v1, v2)?).collect();
                return Ok(Some(state.with(&[e2], added)));
            }
        }
        Ok(None)
    }

    /// Two definitions by the same free symbol agree argument-wise
    fn decompose(&mut self, state: &State) -> Result<Option<State>> {
        for (e1, e2) in state.pairs() {
            let (Term::Function(h1, args1), Term::Function(h2, args2)) = (&e1.rhs, &e2.rhs) else {
                continue;
            };
            if h1.id != h2.id || self.signature.is_reserved(h1.id) {
                continue;
            }
            if args1.len() != args2.len() {
                return Err(UnificationError::ArityMismatch(args1.len(), args2.len()));
            }
            let mut added = Vec::new();
            for (a, b) in args1.iter().zip(args2) {
                added.extend(orient(a, b)?);
            }
            return Ok(Some(state.with(&[e2], added)));
        }
        Ok(None)
    }

    fn distribute(&mut self, state: &State) -> Result<Option<State>> {
        let found = state.pairs().into_iter().find_map(|(e1, e2)| {
            if self.exp_parts(&e1.rhs).is_some() && self.g_parts(&e2.rhs).is_some() {
                Some((e1.clone(), e2.clone()))
            } else if self.g_parts(&e1.rhs).is_some() && self.exp_parts(&e2.rhs).is_some() {
                Some((e2.clone(), e1.clone()))
            } else {
                None
            }
        });
        let Some((exp_eq, g_eq)) = found else {
            return Ok(None);
        };
        let (Some((s, t)), Some((u, v))) = (self.exp_parts(&exp_eq.rhs), self.g_parts(&g_eq.rhs)) else {
            return Ok(None);
        };

        let v1 = Term::Variable(self.fresh_var(self.signature.g.domain));
        let v2 = Term::Variable(self.fresh_var(self.signature.g.domain));
        let added = vec![
            define(s, Term::app(self.signature.g, vec![v1.clone(), v2.clone()]))?,
            define(u, self.exp(v1, t.clone()))?,
            define(v, self.exp(v2, t.clone()))?,
        ];
        Ok(Some(state.with(&[&g_eq], added)))
    }

    fn compose_exponents(&mut self, state: &State) -> Result<Option<State>> {
        let found = state.equations.iter().find_map(|outer| {
            let (Term::Variable(y), t1) = self.exp_parts(&outer.rhs)? else {
                return None;
            };
            let inner = state
                .definitions_of(y)
                .find(|e| self.exp_parts(&e.rhs).is_some())?;
            Some((outer.clone(), inner.clone(), t1.clone()))
        });
        let Some((outer, inner, t1)) = found else {
            return Ok(None);
        };
        let Some((s, t2)) = self.exp_parts(&inner.rhs) else {
            return Ok(None);
        };
        let (s, t2) = (s.clone(), t2.clone());

        let z = Term::Variable(self.fresh_var(self.signature.f.range));
        let added = vec![
            Equation {
                lhs: outer.lhs.clone(),
                rhs: self.exp(s, z.clone()),
            },
            Equation {
                lhs: z,
                rhs: self.combine(t2, t1),
            },
        ];
        Ok(Some(state.with(&[&outer], added)))
    }

    /// The four ways two `exp` definitions with different bases and
    /// exponents can agree. Alternatives that cannot be put in flat form
    /// carry their error.
    fn alternatives(&mut self, state: &State) -> Option<Vec<(&'static str, Result<State>)>> {
        let (e1, e2, s1, t1, s2, t2) = state.pairs().into_iter().find_map(|(e1, e2)| {
            let (s1, t1) = self.exp_parts(&e1.rhs)?;
            let (s2, t2) = self.exp_parts(&e2.rhs)?;
            (s1 != s2 && t1 != t2).then(|| {
                (
                    e1.clone(),
                    e2.clone(),
                    s1.clone(),
                    t1.clone(),
                    s2.clone(),
                    t2.clone(),
                )
            })
        })?;
        let exp_sort = self.signature.f.range;
        let base_sort = self.signature.exp.domain;

        // (f) s1 = exp(s2, Z), t2 = f(Z, t1)
        let z = Term::Variable(self.fresh_var(exp_sort));
        let rule_f = (|| -> Result<State> {
            Ok(state.with(
                &[&e1],
                vec![
                    define(&s1, self.exp(s2.clone(), z.clone()))?,
                    define(&t2, self.combine(z.clone(), t1.clone()))?,
                ],
            ))
        })();

        // (f') s2 = exp(s1, Z), t1 = f(Z, t2)
        let z = Term::Variable(self.fresh_var(exp_sort));
        let rule_f_prime = (|| -> Result<State> {
            Ok(state.with(
                &[&e2],
                vec![
                    define(&s2, self.exp(s1.clone(), z.clone()))?,
                    define(&t1, self.combine(z.clone(), t2.clone()))?,
                ],
            ))
        })();

        // (g) s1 = s2, t1 = t2
        let rule_g = (|| -> Result<State> {
            let added: Vec<Equation> = orient(&s1, &s2)?.into_iter().chain(orient(&t1, &t2)?).collect();
            Ok(state.with(&[&e2], added))
        })();

        // (h) x = exp(B, L), s1 = exp(B, Y), s2 = exp(B, W), L = f(t1, Y), L = f(t2, W)
        let b = Term::Variable(self.fresh_var(base_sort));
        let l = Term::Variable(self.fresh_var(exp_sort));
        let y = Term::Variable(self.fresh_var(exp_sort));
        let w = Term::Variable(self.fresh_var(exp_sort));
        let rule_h = (|| -> Result<State> {
            Ok(state.with(
                &[&e1, &e2],
                vec![
                    Equation {
                        lhs: e1.lhs.clone(),
                        rhs: self.exp(b.clone(), l.clone()),
                    },
                    define(&s1, self.exp(b.clone(), y.clone()))?,
                    define(&s2, self.exp(b.clone(), w.clone()))?,
                    Equation {
                        lhs: l.clone(),
                        rhs: self.combine(t1.clone(), y.clone()),
                    },
                    Equation {
                        lhs: l.clone(),
                        rhs: self.combine(t2.clone(), w.clone()),
                    },
                ],
            ))
        })();

        Some(vec![
            ("f", rule_f),
            ("f'", rule_f_prime),
            ("g", rule_g),
            ("h", rule_h),
        ])
    }

    // Consistency

    fn validate(&self, state: &State) -> Result<()> {
        if state.equations.len() > self.config.eac_max_equations {
            debug!(
                equations = state.equations.len(),
                fresh = self.fresh.issued(),
                "E-AC equation set too large"
            );
            return Err(UnificationError::SearchLimit(format!(
                "E-AC equation set grew beyond {} equations",
                self.config.eac_max_equations
            )));
        }
        for (e1, e2) in state.pairs() {
            self.check_compatible(&e1.rhs, &e2.rhs)?;
        }
        check_acyclic(state)
    }

    /// Two definitions of one variable that can never be equal
    fn check_compatible(&self, a: &Term, b: &Term) -> Result<()> {
        match (a, b) {
            (Term::Constant(c1), Term::Constant(c2)) if c1 != c2 => {
                Err(UnificationError::ConstantClash(c1.id, c2.id))
            }
            (Term::Function(h, _), Term::Constant(c)) | (Term::Constant(c), Term::Function(h, _)) => {
                Err(UnificationError::FunctionConstantClash(h.id, c.id))
            }
            (Term::Function(h1, _), Term::Function(h2, _)) if h1.id != h2.id => {
                let (exp, g) = (self.signature.exp.id, self.signature.g.id);
                let distributes = (h1.id == exp && h2.id == g) || (h1.id == g && h2.id == exp);
                if distributes {
                    Ok(())
                } else {
                    Err(UnificationError::FunctionClash(h1.id, h2.id))
                }
            }
            _ => Ok(()),
        }
    }

    // Solving the residual problem

    fn finalize(&mut self, state: State) -> Result<Vec<Substitution>> {
        let f = self.signature.f.id;
        let (ac_eqs, definitions): (Vec<&Equation>, Vec<&Equation>) =
            state.equations.iter().partition(|e| e.rhs.is_rooted_at(f));

        // An f-definition whose variable occurs nowhere else in the AC part
        // is already solved
        let (extracted, residual): (Vec<&Equation>, Vec<&Equation>) =
            ac_eqs.iter().copied().partition(|eq| match eq.lhs.as_variable() {
                Some(x) => {
                    !eq.rhs.contains_variable(x)
                        && ac_eqs.iter().all(|other| other == eq || !other.mentions(x))
                }
                None => false,
            });
        debug!(
            residual = residual.len(),
            extracted = extracted.len(),
            definitions = definitions.len(),
            "E-AC residual problem"
        );

        let thetas = if residual.is_empty() {
            vec![Substitution::new()]
        } else {
            unify_ac_with(residual.iter().copied(), self.interner, &mut self.fresh, self.config)?
        };

        let solved = state.solved.to_equations();
        let mut unifiers: Vec<Substitution> = Vec::new();
        let mut first_error = None;
        for theta in thetas {
            let closing: Vec<Equation> = definitions
                .iter()
                .chain(&extracted)
                .copied()
                .chain(solved.iter())
                .map(|e| e.apply_substitution(&theta))
                .collect();
            match unify_equations(&closing) {
                Ok(sigma) => {
                    let unifier = theta.compose(&sigma).restrict(self.original.iter());
                    if !unifiers.contains(&unifier) {
                        unifiers.push(unifier);
                    }
                }
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) if unifiers.is_empty() => Err(e),
            _ => Ok(unifiers),
        }
    }
}

/// (a) Eliminate a variable defined as another variable
fn eliminate(state: &State) -> Result<Option<State>> {
    let Some((x, y, eq)) = state.equations.iter().find_map(|e| match (&e.lhs, &e.rhs) {
        (Term::Variable(x), Term::Variable(y)) => Some((*x, *y, e)),
        _ => None,
    }) else {
        return Ok(None);
    };
    let binding = Substitution::singleton(x, Term::Variable(y))?;
    let equations = state
        .equations
        .iter()
        .filter(|e| *e != eq)
        .map(|e| e.apply_substitution(&binding))
        .filter(|e| !e.is_trivial())
        .collect();
    Ok(Some(State {
        equations,
        solved: state.solved.compose(&binding),
    }))
}

/// The equation `a = b` between two flat arguments, with a variable on the
/// left; `None` when they are already equal.
fn orient(a: &Term, b: &Term) -> Result<Option<Equation>> {
    if a == b {
        return Ok(None);
    }
    match (a, b) {
        (Term::Variable(v), t) | (t, Term::Variable(v)) => Ok(Some(Equation::new(*v, t.clone()))),
        (Term::Constant(c1), Term::Constant(c2)) => {
            Err(UnificationError::ConstantClash(c1.id, c2.id))
        }
        _ => Err(UnificationError::Unsupported(
            "nested application in a flattened equation".to_string(),
        )),
    }
}

/// The definition `lhs = rhs`; a constant can never equal an application
fn define(lhs: &Term, rhs: Term) -> Result<Equation> {
    match (lhs, rhs.head()) {
        (Term::Variable(v), _) => Ok(Equation::new(*v, rhs)),
        (Term::Constant(c), Some(h)) => Err(UnificationError::FunctionConstantClash(h.id, c.id)),
        _ => Err(UnificationError::Unsupported(
            "nested application in a flattened equation".to_string(),
        )),
    }
}

/// Fails if a variable depends on itself through its definitions
fn check_acyclic(state: &State) -> Result<()> {
    let mut edges: HashMap<Variable, Vec<Variable>> = HashMap::new();
    for eq in &state.equations {
        if let (Some(x), false) = (eq.lhs.as_variable(), eq.rhs.is_variable()) {
            edges.entry(*x).or_default().extend(eq.rhs.variables());
        }
    }
    for eq in &state.equations {
        let Some(x) = eq.lhs.as_variable() else {
            continue;
        };
        if eq.rhs.is_variable() {
            continue;
        }
        let mut seen = HashSet::new();
        let mut stack = eq.rhs.variables();
        while let Some(v) = stack.pop() {
            if v == *x {
                return Err(UnificationError::OccursCheck(*x, eq.rhs.clone()));
            }
            if seen.insert(v) {
                if let Some(next) = edges.get(&v) {
                    stack.extend(next.iter().copied());
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::SymbolTheory;

    struct TestContext {
        interner: Interner,
        signature: EacSignature,
        config: EngineConfig,
    }

    impl TestContext {
        fn new() -> Self {
            let mut interner = Interner::new();
            let exp = interner.function("exp", 2, SymbolTheory::Free);
            let g = interner.function("g", 2, SymbolTheory::Free);
            let f = interner.function("f", 2, SymbolTheory::AssociativeCommutative);
            TestContext {
                interner,
                signature: EacSignature::new(exp, g, f).unwrap(),
                config: EngineConfig::default(),
            }
        }

        fn var(&mut self, name: &str) -> Variable {
            self.interner.variable(name)
        }

        fn const_(&mut self, name: &str) -> Term {
            Term::Constant(self.interner.constant(name))
        }

        fn exp(&self, base: impl Into<Term>, exponent: impl Into<Term>) -> Term {
            Term::app(self.signature.exp, vec![base.into(), exponent.into()])
        }

        fn f(&self, a: impl Into<Term>, b: impl Into<Term>) -> Term {
            Term::app(self.signature.f, vec![a.into(), b.into()])
        }

        fn g(&self, a: impl Into<Term>, b: impl Into<Term>) -> Term {
            Term::app(self.signature.g, vec![a.into(), b.into()])
        }

        fn solve(&mut self, problem: &UnificationProblem) -> Result<Vec<Substitution>> {
            let signature = self.signature;
            unify_eac(problem, &signature, &mut self.interner, &self.config)
        }
    }

    #[test]
    fn test_exponent_composition_holds_identically() {
        // exp(exp(x, y), z) =? exp(x, f(y, z))
        let mut ctx = TestContext::new();
        let x = ctx.var("x");
        let y = ctx.var("y");
        let z = ctx.var("z");

        let mut problem = UnificationProblem::new();
        problem.push(ctx.exp(ctx.exp(x, y), z), ctx.exp(x, ctx.f(y, z)));

        let unifiers = ctx.solve(&problem).unwrap();
        assert_eq!(unifiers.len(), 1);
        assert!(unifiers[0].is_empty());
        assert!(unifiers[0].to_equations().is_empty());
    }

    #[test]
    fn test_g_definitions_merge_pairwise() {
        // g(x, a) =? g(b, y)
        let mut ctx = TestContext::new();
        let x = ctx.var("x");
        let y = ctx.var("y");
        let a = ctx.const_("a");
        let b = ctx.const_("b");

        let mut problem = UnificationProblem::new();
        problem.push(ctx.g(x, a.clone()), ctx.g(b.clone(), y));

        let unifiers = ctx.solve(&problem).unwrap();
        let mut expected = Substitution::new();
        expected.add(x, b).unwrap();
        expected.add(y, a).unwrap();
        assert_eq!(unifiers, vec![expected]);
    }

    #[test]
    fn test_ground_exp_forces_the_syntactic_branch() {
        // exp(x, y) =? exp(a, b): only x ↦ a, y ↦ b survives
        let mut ctx = TestContext::new();
        let x = ctx.var("x");
        let y = ctx.var("y");
        let a = ctx.const_("a");
        let b = ctx.const_("b");

        let mut problem = UnificationProblem::new();
        problem.push(ctx.exp(x, y), ctx.exp(a.clone(), b.clone()));

        let unifiers = ctx.solve(&problem).unwrap();
        let mut expected = Substitution::new();
        expected.add(x, a).unwrap();
        expected.add(y, b).unwrap();
        assert_eq!(unifiers, vec![expected]);
    }

    #[test]
    fn test_branching_explores_every_alternative() {
        // exp(x, y) =? exp(u, w)
        let mut ctx = TestContext::new();
        let x = ctx.var("x");
        let y = ctx.var("y");
        let u = ctx.var("u");
        let w = ctx.var("w");

        let mut problem = UnificationProblem::new();
        problem.push(ctx.exp(x, y), ctx.exp(u, w));

        let unifiers = ctx.solve(&problem).unwrap();
        let mut syntactic = Substitution::new();
        syntactic.add(x, u.into()).unwrap();
        syntactic.add(y, w.into()).unwrap();
        assert!(unifiers.contains(&syntactic));
        assert!(unifiers.len() > 1);
        assert!(unifiers
            .iter()
            .any(|s| s.get(&x).is_some_and(|t| t.is_rooted_at(ctx.signature.exp.id))));
    }

    #[test]
    fn test_same_base_equates_exponents() {
        // exp(a, x) =? exp(a, b)
        let mut ctx = TestContext::new();
        let x = ctx.var("x");
        let a = ctx.const_("a");
        let b = ctx.const_("b");

        let mut problem = UnificationProblem::new();
        problem.push(ctx.exp(a.clone(), x), ctx.exp(a, b.clone()));

        let unifiers = ctx.solve(&problem).unwrap();
        assert_eq!(unifiers, vec![Substitution::singleton(x, b).unwrap()]);
    }

    #[test]
    fn test_exp_distributes_into_g() {
        // exp(x, a) =? g(y, z) binds x to a g-term and y, z to exp-terms
        let mut ctx = TestContext::new();
        let x = ctx.var("x");
        let y = ctx.var("y");
        let z = ctx.var("z");
        let a = ctx.const_("a");

        let mut problem = UnificationProblem::new();
        problem.push(ctx.exp(x, a.clone()), ctx.g(y, z));

        let unifiers = ctx.solve(&problem).unwrap();
        assert_eq!(unifiers.len(), 1);
        let sigma = &unifiers[0];
        assert!(sigma.get(&x).is_some_and(|t| t.is_rooted_at(ctx.signature.g.id)));
        assert!(sigma.get(&y).is_some_and(|t| t.is_rooted_at(ctx.signature.exp.id)));
        assert!(sigma.get(&z).is_some_and(|t| t.is_rooted_at(ctx.signature.exp.id)));
    }

    #[test]
    fn test_clashes_and_cycles() {
        let mut ctx = TestContext::new();
        let x = ctx.var("x");
        let y = ctx.var("y");
        let a = ctx.const_("a");
        let b = ctx.const_("b");

        let mut clash = UnificationProblem::new();
        clash.push(ctx.exp(x, y), ctx.f(a.clone(), b.clone()));
        assert!(matches!(
            ctx.solve(&clash),
            Err(UnificationError::FunctionClash(_, _))
        ));

        let mut constants = UnificationProblem::new();
        constants.push(a.clone(), b.clone());
        assert!(matches!(
            ctx.solve(&constants),
            Err(UnificationError::ConstantClash(_, _))
        ));

        let mut cycle = UnificationProblem::new();
        cycle.push(x, ctx.exp(x, y));
        assert!(matches!(
            ctx.solve(&cycle),
            Err(UnificationError::OccursCheck(_, _))
        ));
    }

    #[test]
    fn test_step_budget() {
        let mut ctx = TestContext::new();
        ctx.config.eac_max_steps = 1;
        let x = ctx.var("x");
        let y = ctx.var("y");
        let z = ctx.var("z");

        let mut problem = UnificationProblem::new();
        problem.push(ctx.exp(ctx.exp(x, y), z), ctx.exp(x, ctx.f(y, z)));
        assert!(matches!(
            ctx.solve(&problem),
            Err(UnificationError::SearchLimit(_))
        ));
    }

    /// g(g(x, y), exp(u, y)) =? exp(exp(u, a), exp(b, b)) keeps introducing
    /// fresh variables and never settles
    fn divergent_problem(ctx: &mut TestContext) -> UnificationProblem {
        let x = ctx.var("x");
        let y = ctx.var("y");
        let u = ctx.var("u");
        let a = ctx.const_("a");
        let b = ctx.const_("b");

        let mut problem = UnificationProblem::new();
        problem.push(
            ctx.g(ctx.g(x, y), ctx.exp(u, y)),
            ctx.exp(ctx.exp(u, a), ctx.exp(b.clone(), b)),
        );
        problem
    }

    #[test]
    fn test_divergent_problem_stops_under_default_limits() {
        let mut ctx = TestContext::new();
        let problem = divergent_problem(&mut ctx);
        assert!(matches!(
            ctx.solve(&problem),
            Err(UnificationError::SearchLimit(_))
        ));
    }

    #[test]
    fn test_equation_cap_without_step_budget() {
        let mut ctx = TestContext::new();
        ctx.config.eac_max_steps = usize::MAX;
        ctx.config.eac_max_equations = 12;
        let problem = divergent_problem(&mut ctx);
        match ctx.solve(&problem) {
            Err(UnificationError::SearchLimit(msg)) => assert!(msg.contains("12 equations")),
            other => panic!("expected the equation cap, got {:?}", other),
        }
    }

    #[test]
    fn test_signature_requires_binary_symbols() {
        let mut interner = Interner::new();
        let exp = interner.function("exp", 2, SymbolTheory::Free);
        let g = interner.function("g", 1, SymbolTheory::Free);
        let f = interner.function("f", 2, SymbolTheory::AssociativeCommutative);
        assert!(matches!(
            EacSignature::new(exp, g, f),
            Err(UnificationError::ArityMismatch(2, 1))
        ));
    }
}
