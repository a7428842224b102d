//! Ring and field simplification as a rewrite theory
//!
//! Addition and multiplication are plain binary symbols here; the rules only
//! cover the unit, zero, negation and inverse laws, so normal forms are a
//! simplification and not a decision procedure for field equality.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::logic::{Constant, FunctionSymbol, Interner, SortId, SymbolTheory, Term};
use crate::rewrite::{normalize, RewriteRule, RewriteSystem};

pub const FIELD_SORT_NAME: &str = "field";

#[derive(Debug, Clone)]
pub struct Field {
    pub sort: SortId,
    pub zero: Constant,
    pub one: Constant,
    pub add: FunctionSymbol,
    pub mul: FunctionSymbol,
    pub negate: FunctionSymbol,
    pub inv: FunctionSymbol,
    rules: RewriteSystem,
}

impl Field {
    pub fn new(interner: &mut Interner) -> Result<Self> {
        let sort = interner.intern_sort(FIELD_SORT_NAME);
        let zero = interner.sorted_constant("0", sort);
        let one = interner.sorted_constant("1", sort);
        let add = interner.sorted_function("add", 2, SymbolTheory::Free, sort, sort);
        let mul = interner.sorted_function("mul", 2, SymbolTheory::Free, sort, sort);
        let negate = interner.sorted_function("negate", 1, SymbolTheory::Free, sort, sort);
        let inv = interner.sorted_function("inv", 1, SymbolTheory::Free, sort, sort);

        let x: Term = interner.sorted_variable("x", sort).into();
        let y: Term = interner.sorted_variable("y", sort).into();
        let (z, u): (Term, Term) = (zero.into(), one.into());

        let plus = |a: &Term, b: &Term| Term::function(add, vec![a.clone(), b.clone()]);
        let times = |a: &Term, b: &Term| Term::function(mul, vec![a.clone(), b.clone()]);
        let neg = |a: &Term| Term::function(negate, vec![a.clone()]);
        let recip = |a: &Term| Term::function(inv, vec![a.clone()]);

        let rules = [
            // ring units and zero
            (plus(&x, &z)?, x.clone()),
            (plus(&z, &x)?, x.clone()),
            (times(&x, &z)?, z.clone()),
            (times(&z, &x)?, z.clone()),
            (times(&u, &x)?, x.clone()),
            (times(&x, &u)?, x.clone()),
            // additive inverses
            (plus(&x, &neg(&x)?)?, z.clone()),
            (plus(&neg(&x)?, &x)?, z.clone()),
            (neg(&neg(&x)?)?, x.clone()),
            (neg(&z)?, z.clone()),
            (times(&neg(&u)?, &x)?, neg(&x)?),
            (times(&x, &neg(&u)?)?, neg(&x)?),
            // multiplicative inverses
            (times(&x, &recip(&x)?)?, u.clone()),
            (times(&recip(&x)?, &x)?, u.clone()),
            (recip(&recip(&x)?)?, x.clone()),
            (recip(&times(&x, &y)?)?, times(&recip(&y)?, &recip(&x)?)?),
            (times(&x, &times(&recip(&x)?, &y)?)?, y.clone()),
            (times(&recip(&x)?, &times(&x, &y)?)?, y.clone()),
        ]
        .into_iter()
        .map(|(lhs, rhs)| RewriteRule::new(lhs, rhs))
        .collect::<Result<RewriteSystem>>()?;

        Ok(Field {
            sort,
            zero,
            one,
            add,
            mul,
            negate,
            inv,
            rules,
        })
    }

    pub fn rules(&self) -> &RewriteSystem {
        &self.rules
    }

    pub fn add(&self, a: Term, b: Term) -> Result<Term> {
        Term::function(self.add, vec![a, b])
    }

    pub fn mul(&self, a: Term, b: Term) -> Result<Term> {
        Term::function(self.mul, vec![a, b])
    }

    pub fn neg(&self, a: Term) -> Result<Term> {
        Term::function(self.negate, vec![a])
    }

    pub fn inv(&self, a: Term) -> Result<Term> {
        Term::function(self.inv, vec![a])
    }

    pub fn normal(&self, term: &Term, config: &EngineConfig) -> Result<Term> {
        normalize(term, &self.rules, config.rewrite_bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestContext {
        interner: Interner,
        field: Field,
        a: Term,
        b: Term,
    }

    impl TestContext {
        fn new() -> Self {
            let mut interner = Interner::new();
            let field = Field::new(&mut interner).unwrap();
            let a = interner.sorted_constant("a", field.sort).into();
            let b = interner.sorted_constant("b", field.sort).into();
            TestContext {
                interner,
                field,
                a,
                b,
            }
        }

        fn normal(&self, term: &Term) -> String {
            let config = EngineConfig {
                rewrite_bound: Some(50),
                ..EngineConfig::default()
            };
            let normal = self.field.normal(term, &config).unwrap();
            normal.display(&self.interner).to_string()
        }
    }

    #[test]
    fn test_inverse_cancels() {
        let ctx = TestContext::new();
        let f = &ctx.field;
        let term = f.mul(ctx.a.clone(), f.inv(ctx.a.clone()).unwrap()).unwrap();
        assert_eq!(ctx.normal(&term), "1");

        let twice = f.inv(f.inv(ctx.b.clone()).unwrap()).unwrap();
        assert_eq!(ctx.normal(&twice), "b");
    }

    #[test]
    fn test_units_and_negation() {
        let ctx = TestContext::new();
        let f = &ctx.field;
        let zero: Term = f.zero.into();
        let one: Term = f.one.into();

        // 1 * (a + 0)
        let term = f
            .mul(one.clone(), f.add(ctx.a.clone(), zero.clone()).unwrap())
            .unwrap();
        assert_eq!(ctx.normal(&term), "a");

        // -(-a) + -a
        let a_neg = f.neg(ctx.a.clone()).unwrap();
        let term = f.add(f.neg(a_neg.clone()).unwrap(), a_neg).unwrap();
        assert_eq!(ctx.normal(&term), "0");

        let term = f.mul(f.neg(one).unwrap(), ctx.b.clone()).unwrap();
        assert_eq!(ctx.normal(&term), "negate(b)");
    }

    #[test]
    fn test_inverse_of_product() {
        let ctx = TestContext::new();
        let f = &ctx.field;
        let product = f.mul(ctx.a.clone(), ctx.b.clone()).unwrap();
        let term = f.inv(product).unwrap();
        assert_eq!(ctx.normal(&term), "mul(inv(b), inv(a))");

        // a * (a⁻¹ * b)
        let term = f
            .mul(
                ctx.a.clone(),
                f.mul(f.inv(ctx.a.clone()).unwrap(), ctx.b.clone()).unwrap(),
            )
            .unwrap();
        assert_eq!(ctx.normal(&term), "b");
    }
}
