//! Equational theories given as rewrite systems

pub mod boolean;
pub mod field;

pub use boolean::Boolean;
pub use field::Field;

use crate::error::{Result, UnificationError};
use crate::logic::{FunctionSymbol, Interner, SymbolTheory, Term};
use crate::rewrite::RewriteRule;

/// The rule `f(x, x) → x` for a binary symbol whose idempotence is handled
/// by rewriting instead of at construction.
///
/// Symbols tagged [`SymbolTheory::Idempotent`] already collapse when built,
/// so asking for their rule is `Unsupported`.
pub fn idempotence_rule(symbol: FunctionSymbol, interner: &mut Interner) -> Result<RewriteRule> {
    if symbol.arity != 2 {
        return Err(UnificationError::ArityMismatch(2, symbol.arity as usize));
    }
    if symbol.theory == SymbolTheory::Idempotent {
        return Err(UnificationError::Unsupported(format!(
            "{} is idempotent by construction",
            symbol.name(interner)
        )));
    }
    let x: Term = interner.sorted_variable("x", symbol.domain).into();
    let lhs = Term::function(symbol, vec![x.clone(), x.clone()])?;
    RewriteRule::new(lhs, x)
}
