//! `Symbol`: immutable descriptor of one relation.
//!
//! A symbol fixes a relation's name, arity, and default value. The default
//! is what an absent tuple reads as; writing the default deletes. Symbols
//! are registered once at model construction and addressed by [`SymbolId`]
//! thereafter.

use crate::tuple::Value;

/// Index of a symbol in its model's symbol table.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct SymbolId(pub u32);

impl SymbolId {
    /// The table index as `usize`.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Immutable descriptor of one relation.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Symbol {
    name: String,
    arity: usize,
    default: Value,
}

impl Symbol {
    /// Construct a symbol.
    #[must_use]
    pub fn new(name: &str, arity: usize, default: Value) -> Self {
        Self {
            name: name.to_string(),
            arity,
            default,
        }
    }

    /// Shorthand for a boolean relation defaulting to `FALSE`.
    #[must_use]
    pub fn relation(name: &str, arity: usize) -> Self {
        Self::new(name, arity, Value::FALSE)
    }

    /// Shorthand for a nullary integer relation defaulting to 0.
    #[must_use]
    pub fn counter(name: &str) -> Self {
        Self::new(name, 0, Value::Int(0))
    }

    /// Relation name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of argument positions.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Value an absent tuple reads as.
    #[must_use]
    pub fn default_value(&self) -> Value {
        self.default
    }
}
