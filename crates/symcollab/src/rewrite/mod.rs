//! Term rewriting to normal form

pub mod rule;
pub mod system;


pub use rule::{RewriteRule, RuleDisplay};
pub use system::{normalize, RewriteSystem, SystemDisplay};
