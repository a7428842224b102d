//! Fresh variable supply
//!
//! Rule systems that introduce variables draw them from a [`FreshSupply`]
//! owned by the caller and threaded through every rule application. Names are
//! `<prefix><n>` with `n` strictly increasing; names the interner already
//! knows are skipped, so a fresh variable never captures a caller's variable.

use super::core::term::Variable;
use super::interner::{Interner, SortId};

#[derive(Debug, Clone)]
pub struct FreshSupply {
    prefix: String,
    next: u32,
}

impl Default for FreshSupply {
    fn default() -> Self {
        FreshSupply::new("v_")
    }
}

impl FreshSupply {
    pub fn new(prefix: impl Into<String>) -> Self {
        FreshSupply {
            prefix: prefix.into(),
            next: 0,
        }
    }

    /// A variable whose name has never been interned before
    pub fn fresh(&mut self, interner: &mut Interner, sort: SortId) -> Variable {
        loop {
            let name = format!("{}{}", self.prefix, self.next);
            self.next += 1;
            if !interner.contains_variable(&name) {
                return interner.sorted_variable(&name, sort);
            }
        }
    }

    /// How many counter values have been consumed so far
    pub fn issued(&self) -> u32 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_skips_existing_names() {
        let mut interner = Interner::new();
        let taken = interner.variable("v_0");
        let mut supply = FreshSupply::default();

        let first = supply.fresh(&mut interner, SortId::DEFAULT);
        let second = supply.fresh(&mut interner, SortId::DEFAULT);

        assert_ne!(first, taken);
        assert_eq!(first.name(&interner), "v_1");
        assert_eq!(second.name(&interner), "v_2");
        assert_eq!(supply.issued(), 3);
    }
}
