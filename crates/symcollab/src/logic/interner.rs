//! Symbol interning for variables, constants, function symbols and sorts
//!
//! Terms carry small `Copy` IDs instead of names. Names are resolved through
//! an [`Interner`] that callers pass around explicitly; there is no global
//! symbol table.
//!
//! Each symbol kind has its own ID type:
//! - `VariableId` for variables
//! - `ConstantId` for constants
//! - `FunctionId` for function symbols
//! - `SortId` for sorts

use super::core::term::{Constant, FunctionSymbol, SymbolTheory, Variable};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// ID for an interned variable name
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariableId(pub(crate) u32);

/// ID for an interned constant name
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConstantId(pub(crate) u32);

/// ID for an interned function symbol name
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FunctionId(pub(crate) u32);

/// ID for an interned sort name
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SortId(pub(crate) u32);

impl VariableId {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl ConstantId {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl FunctionId {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl SortId {
    /// The sort every symbol gets unless the caller asks for another one
    pub const DEFAULT: SortId = SortId(0);

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

/// Name of the default sort, interned first so that it gets `SortId(0)`
pub const DEFAULT_SORT_NAME: &str = "term";

/// Internal string arena for a single symbol kind
#[derive(Debug, Clone, Default)]
struct StringArena {
    strings: Vec<String>,
    lookup: HashMap<String, u32>,
}

impl StringArena {
    /// Intern a string, returning its ID (get-or-create)
    fn intern(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.lookup.get(name) {
            return id;
        }
        let id = self.strings.len() as u32;
        self.strings.push(name.to_string());
        self.lookup.insert(name.to_string(), id);
        id
    }

    fn resolve(&self, id: u32) -> &str {
        self.strings.get(id as usize).map(String::as_str).unwrap_or("?")
    }

    fn contains(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    fn len(&self) -> usize {
        self.strings.len()
    }
}

/// Symbol interner for a term signature
///
/// Keeps separate arenas for variables, constants, functions and sorts.
/// Function symbols additionally remember the theory, arity and sorts they
/// were declared with so that the same name always yields the same symbol.
#[derive(Debug, Clone)]
pub struct Interner {
    variables: StringArena,
    constants: StringArena,
    functions: StringArena,
    sorts: StringArena,
    declared: HashMap<FunctionId, FunctionSymbol>,
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl Interner {
    pub fn new() -> Self {
        let mut sorts = StringArena::default();
        sorts.intern(DEFAULT_SORT_NAME);
        Interner {
            variables: StringArena::default(),
            constants: StringArena::default(),
            functions: StringArena::default(),
            sorts,
            declared: HashMap::new(),
        }
    }

    // === Sorts ===

    pub fn intern_sort(&mut self, name: &str) -> SortId {
        SortId(self.sorts.intern(name))
    }

    pub fn resolve_sort(&self, id: SortId) -> &str {
        self.sorts.resolve(id.0)
    }

    // === Variables ===

    /// Intern a variable name, returning its ID (get-or-create)
    pub fn intern_variable(&mut self, name: &str) -> VariableId {
        VariableId(self.variables.intern(name))
    }

    pub fn resolve_variable(&self, id: VariableId) -> &str {
        self.variables.resolve(id.0)
    }

    pub fn contains_variable(&self, name: &str) -> bool {
        self.variables.contains(name)
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Variable of the default sort
    pub fn variable(&mut self, name: &str) -> Variable {
        self.sorted_variable(name, SortId::DEFAULT)
    }

    pub fn sorted_variable(&mut self, name: &str, sort: SortId) -> Variable {
        Variable::new(self.intern_variable(name), sort)
    }

    // === Constants ===

    pub fn intern_constant(&mut self, name: &str) -> ConstantId {
        ConstantId(self.constants.intern(name))
    }

    pub fn resolve_constant(&self, id: ConstantId) -> &str {
        self.constants.resolve(id.0)
    }

    pub fn contains_constant(&self, name: &str) -> bool {
        self.constants.contains(name)
    }

    /// Constant of the default sort
    pub fn constant(&mut self, name: &str) -> Constant {
        self.sorted_constant(name, SortId::DEFAULT)
    }

    pub fn sorted_constant(&mut self, name: &str, sort: SortId) -> Constant {
        Constant::new(self.intern_constant(name), sort)
    }

    // === Functions ===

    pub fn intern_function(&mut self, name: &str) -> FunctionId {
        FunctionId(self.functions.intern(name))
    }

    pub fn resolve_function(&self, id: FunctionId) -> &str {
        self.functions.resolve(id.0)
    }

    /// Declare a function symbol over the default sort.
    pub fn function(&mut self, name: &str, arity: u8, theory: SymbolTheory) -> FunctionSymbol {
        self.sorted_function(name, arity, theory, SortId::DEFAULT, SortId::DEFAULT)
    }

    /// Declare a function symbol with explicit domain and range sorts.
    ///
    /// Re-declaring a name returns the first declaration, whatever the
    /// other arguments say.
    pub fn sorted_function(
        &mut self,
        name: &str,
        arity: u8,
        theory: SymbolTheory,
        domain: SortId,
        range: SortId,
    ) -> FunctionSymbol {
        let id = self.intern_function(name);
        *self.declared.entry(id).or_insert(FunctionSymbol {
            id,
            arity,
            theory,
            domain,
            range,
        })
    }

    /// Look up a previously declared function symbol
    pub fn declared_function(&self, id: FunctionId) -> Option<FunctionSymbol> {
        self.declared.get(&id).copied()
    }
}
