//! Core term-level data structures

pub mod equation;
pub mod term;
